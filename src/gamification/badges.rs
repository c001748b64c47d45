//! Badge catalog and badge set
//!
//! Badge ids are opaque strings. The catalog only supplies display
//! titles for the badges the business app grants itself.

use std::collections::BTreeSet;

/// Well-known badge ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeId {
    FirstClient,
    FirstQuote,
    FirstContract,
    FirstRevenue,
    QuoteConverted,
    TenClients,
    BigDeal,
    ProfitableMonth,
}

impl BadgeId {
    /// Get the string ID for storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstClient => "first-client",
            Self::FirstQuote => "first-quote",
            Self::FirstContract => "first-contract",
            Self::FirstRevenue => "first-revenue",
            Self::QuoteConverted => "quote-converted",
            Self::TenClients => "ten-clients",
            Self::BigDeal => "big-deal",
            Self::ProfitableMonth => "profitable-month",
        }
    }

    /// Parse from storage string
    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|id| id.as_str() == s)
    }

    pub fn all() -> &'static [BadgeId] {
        &[
            Self::FirstClient,
            Self::FirstQuote,
            Self::FirstContract,
            Self::FirstRevenue,
            Self::QuoteConverted,
            Self::TenClients,
            Self::BigDeal,
            Self::ProfitableMonth,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::FirstClient => "First Client",
            Self::FirstQuote => "First Quote",
            Self::FirstContract => "First Contract",
            Self::FirstRevenue => "First Revenue",
            Self::QuoteConverted => "Deal Closer",
            Self::TenClients => "Growing Network",
            Self::BigDeal => "Big Deal",
            Self::ProfitableMonth => "In the Black",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::FirstClient => "Added your first client",
            Self::FirstQuote => "Sent your first quote",
            Self::FirstContract => "Signed your first contract",
            Self::FirstRevenue => "Recorded your first revenue",
            Self::QuoteConverted => "Converted a quote into a contract",
            Self::TenClients => "Reached ten clients",
            Self::BigDeal => "Closed a large contract",
            Self::ProfitableMonth => "Finished a month with more revenue than expenses",
        }
    }
}

/// Display title for any badge id, falling back to the id itself
pub fn badge_title(badge_id: &str) -> String {
    BadgeId::from_str(badge_id)
        .map(|id| id.title().to_string())
        .unwrap_or_else(|| badge_id.to_string())
}

/// Set of earned badge ids. Grows monotonically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeSet {
    ids: BTreeSet<String>,
}

impl BadgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a badge. Returns `false` if it was already earned.
    pub fn insert(&mut self, badge_id: &str) -> bool {
        if self.ids.contains(badge_id) {
            return false;
        }
        self.ids.insert(badge_id.to_string())
    }

    pub fn contains(&self, badge_id: &str) -> bool {
        self.ids.contains(badge_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Sorted ids, as persisted
    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for BadgeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
