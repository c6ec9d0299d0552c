use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::backend::record::ParseRecordError;

#[derive(Error, Debug)]
pub enum BackendError {
    /// Reading or writing the ledger file failed for a reason other
    /// than the file not existing yet.
    #[error("cannot access ledger file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error
    },
    /// A record could not be parsed while loading in strict mode.
    #[error("{}:{line}: {reason}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        reason: ParseRecordError
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;
