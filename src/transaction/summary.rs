//! Totals for a set of transactions.

use crate::amount::Amount;

use super::Transaction;

/// The money in and out over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerSummary {
    pub total_received: Amount,
    pub total_paid: Amount,
    /// Total received minus total paid.
    pub net: Amount,
}

impl LedgerSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let total_received: Amount = transactions
            .iter()
            .map(|transaction| transaction.amount_received)
            .sum();
        let total_paid: Amount = transactions
            .iter()
            .map(|transaction| transaction.amount_paid)
            .sum();

        Self {
            total_received,
            total_paid,
            net: total_received - total_paid,
        }
    }
}
