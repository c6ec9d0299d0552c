use chrono::NaiveDateTime;
use log::{debug, warn};

use crate::core::amount::Amount;
use crate::core::error::{AmountRejection, LedgerError, LedgerResult};
use crate::core::transaction::{Kind, KindFilter, Transaction};

/// In-memory history of deposits and withdrawals plus the balance
/// derived from it. Knows nothing about files or clocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ledger {
    opening_balance: Amount,
    balance: Amount,
    transactions: Vec<Transaction>
}

impl Ledger {
    pub const DEFAULT_OPENING_BALANCE: Amount = Amount::from_cents(500_00);

    pub fn new(opening_balance: Amount) -> Ledger {
        Ledger { opening_balance, balance: opening_balance, transactions: Vec::new() }
    }

    /// Rebuilds a ledger from persisted history, replaying every record on
    /// top of `opening_balance`. Fails on the first record the balance
    /// cannot absorb.
    pub fn from_history(opening_balance: Amount, transactions: Vec<Transaction>) -> LedgerResult<Ledger> {
        let mut ledger = Ledger::new(opening_balance);
        for transaction in transactions {
            ledger.restore(transaction)?;
        }
        if ledger.balance.is_negative() {
            warn!("replayed history leaves a negative balance of {}", ledger.balance);
        }
        return Ok(ledger);
    }

    /// Appends a persisted record. The overdraft rule only applies to new
    /// withdrawals, so it is not checked here; the range of the balance is.
    pub fn restore(&mut self, transaction: Transaction) -> LedgerResult<()> {
        let balance = Ledger::apply_transaction(self.balance, &transaction)?;
        self.balance = balance;
        self.transactions.push(transaction);
        Ok(())
    }

    pub fn opening_balance(&self) -> Amount {
        self.opening_balance
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn deposit(&mut self, amount: Amount, at: NaiveDateTime) -> LedgerResult<&Transaction> {
        Ledger::check_positive(amount)?;
        self.add_transaction(Transaction::new(Kind::Deposit, amount, at))
    }

    pub fn withdraw(&mut self, amount: Amount, at: NaiveDateTime) -> LedgerResult<&Transaction> {
        Ledger::check_positive(amount)?;
        if amount > self.balance {
            return Err(LedgerError::InvalidAmount {
                amount,
                reason: AmountRejection::ExceedsBalance { balance: self.balance }
            });
        }
        self.add_transaction(Transaction::new(Kind::Withdrawal, amount, at))
    }

    /// Transactions matching `filter`, oldest first.
    pub fn list_by_kind(&self, filter: KindFilter) -> Vec<&Transaction> {
        self.transactions.iter()
            .filter(|t| filter.matches(t.kind()))
            .collect()
    }

    /// Total deposited and total withdrawn over the whole history.
    /// Each total saturates at `Amount::MAX`.
    pub fn totals(&self) -> (Amount, Amount) {
        self.transactions.iter()
            .fold((Amount::ZERO, Amount::ZERO), |(dep, wd), t| match t.kind() {
                Kind::Deposit => (dep.saturating_add(t.amount()), wd),
                Kind::Withdrawal => (dep, wd.saturating_add(t.amount()))
            })
    }

    /// Recomputes the balance from the opening balance and the full history.
    /// On error the balance is left as it was.
    pub fn reconcile(&mut self) -> LedgerResult<Amount> {
        let replayed = Ledger::replay(self.opening_balance, &self.transactions)?;
        if replayed != self.balance {
            debug!("reconciled balance {} (was {})", replayed, self.balance);
        }
        self.balance = replayed;
        return Ok(replayed);
    }

    fn replay(opening_balance: Amount, transactions: &[Transaction]) -> LedgerResult<Amount> {
        let mut balance = opening_balance;
        for transaction in transactions {
            balance = Ledger::apply_transaction(balance, transaction)?;
        }
        return Ok(balance);
    }

    fn apply_transaction(balance: Amount, transaction: &Transaction) -> LedgerResult<Amount> {
        let updated = match transaction.kind() {
            Kind::Deposit => balance.checked_add(transaction.amount()),
            Kind::Withdrawal => balance.checked_sub(transaction.amount())
        };
        updated.ok_or(LedgerError::InvalidAmount {
            amount: transaction.amount(),
            reason: AmountRejection::TooLarge { balance }
        })
    }

    fn check_positive(amount: Amount) -> LedgerResult<()> {
        if amount.is_positive() {
            return Ok(());
        }
        Err(LedgerError::InvalidAmount { amount, reason: AmountRejection::NotPositive })
    }

    fn add_transaction(&mut self, transaction: Transaction) -> LedgerResult<&Transaction> {
        self.balance = Ledger::apply_transaction(self.balance, &transaction)?;
        debug!("recorded {:?} of {}, balance now {}", transaction.kind(), transaction.amount(), self.balance);
        self.transactions.push(transaction);
        // just pushed, so never empty
        Ok(&self.transactions[self.transactions.len() - 1])
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Ledger::new(Ledger::DEFAULT_OPENING_BALANCE)
    }
}
