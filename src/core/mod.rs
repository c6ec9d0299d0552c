pub mod amount;
pub mod clock;
pub mod error;
pub mod transaction;
pub mod ledger;

pub use amount::{Amount, ParseAmountError};
pub use clock::{Clock, FixedClock, LocalClock};
pub use error::{AmountRejection, LedgerError, LedgerResult};
pub use transaction::{Kind, KindFilter, Transaction, TIMESTAMP_FORMAT};
pub use ledger::Ledger;
