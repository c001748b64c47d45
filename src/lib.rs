//! bizquest - gamification for small-business bookkeeping
//!
//! Everyday business actions (adding clients, sending quotes, signing
//! contracts, recording revenue) earn points. Points derive a level, and
//! one-time badges grant a bonus on top.
//!
//! ## Pieces
//!
//! 1. **Engine**: [`gamification::GamificationEngine`] owns one user's points
//!    and badges and announces level-ups and badge grants.
//! 2. **Store**: [`store::ProgressStore`] persists progress. Writes are
//!    debounced so bursts of actions produce a single write.
//! 3. **Presentation**: [`gamification::PresentationSink`] receives
//!    achievement banners and confetti triggers.

pub mod config;
pub mod gamification;
pub mod store;
