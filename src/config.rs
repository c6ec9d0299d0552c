use std::{fs, path::{Path, PathBuf}};
use serde::Deserialize;
use toml;
use anyhow::{self, Context};

use crate::backend::ParsePolicy;
use crate::core::{Amount, Ledger};

pub const DEFAULT_LEDGER_FILE: &str = "transactions.txt";

fn default_ledger_file() -> PathBuf {
    PathBuf::from(DEFAULT_LEDGER_FILE)
}

fn default_starting_balance() -> String {
    Ledger::DEFAULT_OPENING_BALANCE.to_string()
}

fn default_color() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default = "default_ledger_file")]
    ledger_file: PathBuf,
    #[serde(default = "default_starting_balance")]
    starting_balance: String,
    #[serde(default)]
    on_malformed: ParsePolicy,
    #[serde(default = "default_color")]
    color: bool
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub ledger_file: PathBuf,
    pub starting_balance: Amount,
    pub on_malformed: ParsePolicy,
    pub color: bool
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            ledger_file: default_ledger_file(),
            starting_balance: Ledger::DEFAULT_OPENING_BALANCE,
            on_malformed: ParsePolicy::default(),
            color: default_color()
        }
    }
}

/// Values given on the command line, which win over the config file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub ledger_file: Option<PathBuf>,
    pub starting_balance: Option<Amount>,
    pub strict: bool,
    pub no_color: bool
}

impl AppConfig {
    pub fn apply_overrides(mut self, overrides: &Overrides) -> anyhow::Result<Self> {
        if let Some(file) = &overrides.ledger_file {
            self.ledger_file = file.clone();
        }
        if let Some(balance) = overrides.starting_balance {
            anyhow::ensure!(!balance.is_negative(),
                "starting balance must not be negative, got {}", balance);
            self.starting_balance = balance;
        }
        if overrides.strict {
            self.on_malformed = ParsePolicy::Strict;
        }
        if overrides.no_color {
            self.color = false;
        }
        return Ok(self);
    }

    pub fn read(filepath: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file_content = fs::read_to_string(filepath)
            .with_context(|| "failed to read config file")?;
        return AppConfig::parse(&file_content);
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .with_context(|| "failed to parse config file")?;
        let starting_balance = raw.starting_balance.parse::<Amount>()
            .with_context(|| format!("invalid starting_balance '{}'", raw.starting_balance))?;
        if starting_balance.is_negative() {
            anyhow::bail!("starting_balance must not be negative, got {}", starting_balance);
        }

        return Ok(AppConfig {
            ledger_file: raw.ledger_file,
            starting_balance,
            on_malformed: raw.on_malformed,
            color: raw.color
        });
    }
}
