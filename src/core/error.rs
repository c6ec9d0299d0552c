use std::fmt;

use thiserror::Error;

use crate::core::Amount;

/// Why an amount was refused by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRejection {
    /// Deposits and withdrawals must move a strictly positive amount.
    NotPositive,
    /// A withdrawal may not take the balance below zero.
    ExceedsBalance {
        balance: Amount
    },
    /// Applying the amount would take the balance past what it can hold.
    TooLarge {
        balance: Amount
    }
}

impl fmt::Display for AmountRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmountRejection::NotPositive => write!(f, "must be positive"),
            AmountRejection::ExceedsBalance { balance } => {
                write!(f, "exceeds the current balance of {}", balance)
            },
            AmountRejection::TooLarge { balance } => {
                write!(f, "is too large for the current balance of {}", balance)
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Occurs when a deposit or withdrawal is requested with an amount
    /// the ledger cannot accept. The ledger is left untouched.
    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount {
        amount: Amount,
        reason: AmountRejection
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
