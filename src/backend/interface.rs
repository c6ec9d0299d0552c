use crate::core::Ledger;
use crate::backend::Result;

pub trait LedgerStore {
    fn read(&self) -> Result<Ledger>;
    fn save(&self, ledger: &Ledger) -> Result<()>;
}
