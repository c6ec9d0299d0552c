mod core;
pub mod backend;
pub mod config;
pub mod menu;

pub use crate::core::{Amount, AmountRejection, Kind, KindFilter, Ledger, LedgerError, Transaction};
pub use crate::core::{amount, clock, ledger, transaction};
pub use crate::backend::{LedgerStore, TextStore};
pub use crate::menu::Menu;
