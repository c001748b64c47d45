//! Point rewards for business actions

use super::badges::BadgeId;

/// Actions in the business app that award points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusinessAction {
    AddClient,
    AddQuote,
    ConvertQuote,
    SignContract,
    AddRevenue,
    AddExpense,
}

impl BusinessAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddClient => "add-client",
            Self::AddQuote => "add-quote",
            Self::ConvertQuote => "convert-quote",
            Self::SignContract => "sign-contract",
            Self::AddRevenue => "add-revenue",
            Self::AddExpense => "add-expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|a| a.as_str() == s)
    }

    pub fn all() -> &'static [BusinessAction] {
        &[
            Self::AddClient,
            Self::AddQuote,
            Self::ConvertQuote,
            Self::SignContract,
            Self::AddRevenue,
            Self::AddExpense,
        ]
    }

    /// Points awarded for the action
    pub fn points(&self) -> u64 {
        match self {
            Self::AddClient => PointRewards::ADD_CLIENT,
            Self::AddQuote => PointRewards::ADD_QUOTE,
            Self::ConvertQuote => PointRewards::CONVERT_QUOTE,
            Self::SignContract => PointRewards::SIGN_CONTRACT,
            Self::AddRevenue => PointRewards::ADD_REVENUE,
            Self::AddExpense => PointRewards::ADD_EXPENSE,
        }
    }

    /// Badge granted the first time the action happens
    pub fn badge(&self) -> Option<BadgeId> {
        match self {
            Self::AddClient => Some(BadgeId::FirstClient),
            Self::AddQuote => Some(BadgeId::FirstQuote),
            Self::ConvertQuote => Some(BadgeId::QuoteConverted),
            Self::SignContract => Some(BadgeId::FirstContract),
            Self::AddRevenue => Some(BadgeId::FirstRevenue),
            Self::AddExpense => None,
        }
    }
}

/// Point values for business actions
pub struct PointRewards;

impl PointRewards {
    pub const ADD_CLIENT: u64 = 10;
    pub const ADD_QUOTE: u64 = 15;
    pub const CONVERT_QUOTE: u64 = 25;
    pub const SIGN_CONTRACT: u64 = 30;
    pub const ADD_REVENUE: u64 = 20;
    pub const ADD_EXPENSE: u64 = 5;

    /// Bonus for every newly earned badge
    pub const BADGE_BONUS: u64 = 200;
}
