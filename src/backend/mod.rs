mod error;
mod interface;
pub mod record;
mod text_store;

pub use error::{BackendError, Result};
pub use interface::LedgerStore;
pub use text_store::{ParsePolicy, TextStore};
