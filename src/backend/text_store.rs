use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;

use crate::backend::interface::LedgerStore;
use crate::backend::record::{format_record, parse_record, ParseRecordError};
use crate::backend::{BackendError, Result};
use crate::core::{Amount, Ledger};

/// What to do with a line of the ledger file that cannot be parsed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Log a warning and carry on without the line.
    #[default]
    Skip,
    /// Refuse to load the file.
    Strict
}

/// Plain text ledger file, one transaction per line.
#[derive(Debug, Clone)]
pub struct TextStore {
    path: PathBuf,
    opening_balance: Amount,
    policy: ParsePolicy
}

impl TextStore {
    pub fn new(path: impl AsRef<Path>, opening_balance: Amount) -> TextStore {
        TextStore {
            path: path.as_ref().to_path_buf(),
            opening_balance,
            policy: ParsePolicy::default()
        }
    }

    pub fn with_policy(mut self, policy: ParsePolicy) -> TextStore {
        self.policy = policy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> BackendError {
        BackendError::Io { path: self.path.clone(), source }
    }

    /// Parses and replays each line on top of the opening balance. Lines
    /// that don't parse, or that the balance cannot absorb, are handled
    /// according to the policy.
    fn replay_lines(&self, content: &str) -> Result<Ledger> {
        let mut ledger = Ledger::new(self.opening_balance);

        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let replayed = parse_record(line)
                .and_then(|transaction| ledger.restore(transaction).map_err(ParseRecordError::from));
            if let Err(reason) = replayed {
                match self.policy {
                    ParsePolicy::Skip => {
                        warn!("{}:{}: skipping malformed record: {}", self.path.display(), idx + 1, reason);
                    },
                    ParsePolicy::Strict => {
                        return Err(BackendError::Malformed {
                            path: self.path.clone(),
                            line: idx + 1,
                            reason
                        });
                    }
                }
            }
        }

        if ledger.balance().is_negative() {
            warn!("replayed history leaves a negative balance of {}", ledger.balance());
        }
        return Ok(ledger);
    }

    /// Sibling file the history is written to before being renamed
    /// over the real one.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("ledger"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_all(&self, temp: &Path, ledger: &Ledger) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(temp)?);
        for transaction in ledger.transactions() {
            writeln!(writer, "{}", format_record(transaction))?;
        }
        let file = writer.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()?;
        fs::rename(temp, &self.path)
    }
}

impl LedgerStore for TextStore {
    fn read(&self) -> Result<Ledger> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("{} does not exist yet, starting a new ledger", self.path.display());
                return Ok(Ledger::new(self.opening_balance));
            },
            Err(err) => return Err(self.io_error(err))
        };

        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(err) => {
                warn!("{} is not a text file ({}), starting a new ledger", self.path.display(), err);
                return Ok(Ledger::new(self.opening_balance));
            }
        };

        let ledger = self.replay_lines(&content)?;
        debug!("loaded {} transactions from {}", ledger.len(), self.path.display());
        return Ok(ledger);
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let temp = self.temp_path();
        if let Err(err) = self.write_all(&temp, ledger) {
            // the real file is untouched; don't leave the partial copy around
            let _ = fs::remove_file(&temp);
            return Err(self.io_error(err));
        }
        info!("saved {} transactions to {}", ledger.len(), self.path.display());
        return Ok(());
    }
}


#[cfg(test)]
mod tests {
    use super::{ParsePolicy, TextStore};
    use crate::backend::{BackendError, LedgerStore};
    use crate::backend::record::ParseRecordError;
    use crate::core::{Amount, AmountRejection, Ledger, LedgerError};

    use std::fs;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    const SAMPLE: &str = "\
D 100.00 2024-03-01 09:30:05
W 40.00 2024-03-02 10:00:00

garbage line
D 12.5 2024-03-03 11:15:00
";

    #[fixture]
    fn dir() -> TempDir {
        TempDir::new().unwrap()
    }

    #[fixture]
    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
            .and_hms_opt(8, 0, 0).unwrap()
    }

    fn store(dir: &TempDir) -> TextStore {
        TextStore::new(dir.path().join("transactions.txt"), Ledger::DEFAULT_OPENING_BALANCE)
    }

    #[rstest]
    fn missing_file_is_empty_ledger(dir: TempDir) {
        let ledger = store(&dir).read().unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.balance(), Amount::from_cents(500_00));
    }

    #[rstest]
    fn empty_file_is_empty_ledger(dir: TempDir) {
        let store = store(&dir);
        fs::write(store.path(), "").unwrap();
        let ledger = store.read().unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.balance(), Amount::from_cents(500_00));
    }

    #[rstest]
    fn binary_file_is_empty_ledger(dir: TempDir) {
        let store = store(&dir);
        fs::write(store.path(), [0xff, 0xfe, 0x00, 0x44]).unwrap();
        let ledger = store.read().unwrap();
        assert!(ledger.is_empty());
    }

    #[rstest]
    fn skips_malformed_lines(dir: TempDir) {
        let store = store(&dir);
        fs::write(store.path(), SAMPLE).unwrap();

        let ledger = store.read().unwrap();
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.balance(), Amount::from_cents(500_00 + 100_00 - 40_00 + 12_50));
    }

    #[rstest]
    fn strict_mode_fails_on_malformed_line(dir: TempDir) {
        let store = store(&dir).with_policy(ParsePolicy::Strict);
        fs::write(store.path(), SAMPLE).unwrap();

        match store.read() {
            Err(BackendError::Malformed { line, reason, .. }) => {
                assert_eq!(line, 4);
                assert_eq!(reason, ParseRecordError::UnknownKind("garbage".into()));
            },
            other => panic!("expected malformed record error, got {:?}", other)
        }
    }

    #[rstest]
    #[case(ParsePolicy::Skip)]
    #[case(ParsePolicy::Strict)]
    fn overflowing_record(dir: TempDir, #[case] policy: ParsePolicy) {
        let store = store(&dir).with_policy(policy);
        fs::write(store.path(), "\
D 1.00 2025-01-01 00:00:00
D 92233720368547758.07 2025-01-01 00:00:00
W 0.50 2025-01-01 00:00:01
").unwrap();

        match (policy, store.read()) {
            (ParsePolicy::Skip, Ok(ledger)) => {
                assert_eq!(ledger.len(), 2);
                assert_eq!(ledger.balance(), Amount::from_cents(500_50));
            },
            (ParsePolicy::Strict, Err(BackendError::Malformed { line, reason, .. })) => {
                assert_eq!(line, 2);
                assert_eq!(reason, ParseRecordError::Unreplayable(LedgerError::InvalidAmount {
                    amount: Amount::MAX,
                    reason: AmountRejection::TooLarge { balance: Amount::from_cents(501_00) }
                }));
            },
            (policy, other) => panic!("unexpected result under {:?}: {:?}", policy, other)
        }
    }

    #[rstest]
    fn directory_is_an_io_error(dir: TempDir) {
        let store = TextStore::new(dir.path(), Amount::ZERO);
        assert!(matches!(store.read(), Err(BackendError::Io { .. })));
    }

    #[rstest]
    fn save_overwrites(dir: TempDir, at: NaiveDateTime) {
        let store = store(&dir);
        fs::write(store.path(), SAMPLE).unwrap();

        let mut ledger = Ledger::new(Amount::from_cents(10_00));
        ledger.deposit(Amount::from_cents(2_50), at).unwrap();
        ledger.withdraw(Amount::from_cents(1_00), at + Duration::seconds(1)).unwrap();
        store.save(&ledger).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "D 2.50 2024-03-01 08:00:00\nW 1.00 2024-03-01 08:00:01\n");
        assert!(!store.temp_path().exists());
    }

    #[rstest]
    fn save_into_missing_directory_fails(dir: TempDir) {
        let store = TextStore::new(dir.path().join("nope").join("ledger.txt"), Amount::ZERO);
        let res = store.save(&Ledger::default());
        assert!(matches!(res, Err(BackendError::Io { .. })));
    }

    #[test]
    fn temp_path_is_sibling() {
        let store = TextStore::new("/var/lib/cashbook/transactions.txt", Amount::ZERO);
        assert_eq!(store.temp_path().to_str().unwrap(), "/var/lib/cashbook/transactions.txt.tmp");
    }
}
