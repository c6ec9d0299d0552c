use std::fmt;

use chrono::NaiveDateTime;
use colored::Colorize;

use crate::core::amount::Amount;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Kind {
    Deposit,
    Withdrawal
}

impl Kind {
    /// Single-character tag used in the ledger file.
    pub fn tag(self) -> char {
        match self {
            Self::Deposit => 'D',
            Self::Withdrawal => 'W'
        }
    }

    pub fn from_tag(tag: char) -> Option<Kind> {
        match tag {
            'D' => Some(Self::Deposit),
            'W' => Some(Self::Withdrawal),
            _ => None
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deposit => "Deposit",
            Self::Withdrawal => "Withdrawal"
        };
        f.pad(name)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum KindFilter {
    Deposit,
    Withdrawal,
    All
}

impl KindFilter {
    pub fn matches(self, kind: Kind) -> bool {
        match self {
            Self::All => true,
            Self::Deposit => kind == Kind::Deposit,
            Self::Withdrawal => kind == Kind::Withdrawal
        }
    }
}

/// A single deposit or withdrawal. The amount is always positive;
/// the kind says which way it moved the balance.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Transaction {
    amount: Amount,
    kind: Kind,
    timestamp: NaiveDateTime
}

impl Transaction {
    /// Callers are expected to have checked that `amount` is positive;
    /// see `Ledger::deposit` and `Ledger::withdraw`.
    pub(crate) fn new(kind: Kind, amount: Amount, timestamp: NaiveDateTime) -> Transaction {
        Transaction { amount, kind, timestamp }
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Effect of this transaction on the balance.
    pub fn signed_amount(&self) -> Amount {
        match self.kind {
            Kind::Deposit => self.amount,
            Kind::Withdrawal => -self.amount
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = format!("{:<12}", self.kind);
        let kind = match self.kind {
            Kind::Deposit => kind.green(),
            Kind::Withdrawal => kind.yellow()
        };
        write!(f, "{}${:<11}{}", kind, self.amount, self.timestamp.format(TIMESTAMP_FORMAT))
    }
}
