use serde::{Deserialize, Serialize};

/// Which way money moved on the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn is_credit(&self) -> bool {
        matches!(self, Direction::Credit)
    }
}

/// The single underwriting category a transaction is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionCategory {
    TrueRevenue,
    Transfer,
    LoanProceeds,
    FinancingPayment,
    PeerToPeer,
    Other,
}

impl TransactionCategory {
    pub const ALL: [TransactionCategory; 6] = [
        TransactionCategory::TrueRevenue,
        TransactionCategory::Transfer,
        TransactionCategory::LoanProceeds,
        TransactionCategory::FinancingPayment,
        TransactionCategory::PeerToPeer,
        TransactionCategory::Other,
    ];
}

/// Independent metadata tags. A flag never changes a transaction's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionFlag {
    /// Peer-to-peer channel (Zelle, Venmo, ...) that a human should look at.
    PeerToPeerReview,
    NonSufficientFunds,
    Overdraft,
    Wire,
    /// The memo matched an entry in the lender alias table.
    LenderMatch,
}

impl TransactionFlag {
    pub const ALL: [TransactionFlag; 5] = [
        TransactionFlag::PeerToPeerReview,
        TransactionFlag::NonSufficientFunds,
        TransactionFlag::Overdraft,
        TransactionFlag::Wire,
        TransactionFlag::LenderMatch,
    ];

    pub(crate) fn bit(self) -> u8 {
        1 << (self as u8)
    }
}
