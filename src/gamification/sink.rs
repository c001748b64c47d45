//! Presentation collaborators
//!
//! The engine never renders anything. It hands achievement events and
//! confetti triggers to a [`PresentationSink`] supplied at construction.

use tokio::sync::mpsc;

use super::events::{AchievementEvent, ConfettiTrigger};

/// Receives achievement notifications. Purely observational.
pub trait PresentationSink: Send + Sync {
    fn show_achievement(&self, event: &AchievementEvent);

    fn trigger_confetti(&self, confetti: &ConfettiTrigger);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn show_achievement(&self, _event: &AchievementEvent) {}

    fn trigger_confetti(&self, _confetti: &ConfettiTrigger) {}
}

/// Message on the presentation channel
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationEvent {
    Achievement(AchievementEvent),
    Confetti(ConfettiTrigger),
}

/// Forwards notifications onto a channel so a UI loop can drain them
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<PresentationEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PresentationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PresentationSink for ChannelSink {
    fn show_achievement(&self, event: &AchievementEvent) {
        // Receiver gone means nobody is watching anymore
        let _ = self.tx.send(PresentationEvent::Achievement(event.clone()));
    }

    fn trigger_confetti(&self, confetti: &ConfettiTrigger) {
        let _ = self.tx.send(PresentationEvent::Confetti(*confetti));
    }
}

/// Prints banners to stdout (used by the CLI)
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl PresentationSink for ConsoleSink {
    fn show_achievement(&self, event: &AchievementEvent) {
        println!("  [{}] {} {}", event.kind.as_str(), event.title, event.message);
    }

    fn trigger_confetti(&self, confetti: &ConfettiTrigger) {
        tracing::debug!(
            duration_ms = confetti.duration_ms,
            particles = confetti.particle_count,
            "confetti"
        );
    }
}
