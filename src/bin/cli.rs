use cashbook::{Amount, Ledger, Menu,
    backend::{LedgerStore, TextStore},
    clock::LocalClock,
    config::{AppConfig, Overrides}};

use std::io;
use std::path::PathBuf;
use anyhow::Context;
use clap::{ArgAction, Parser};
use log::{debug, LevelFilter};

#[derive(Parser, Debug)]
#[clap(version, about)]
struct Cli {
    /// Path to ledger file to operate on
    #[clap(short, long, value_parser)]
    file: Option<PathBuf>,

    /// TOML configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Balance to start from before any recorded transactions
    #[clap(short, long, value_parser, allow_negative_numbers = true)]
    starting_balance: Option<Amount>,

    /// Refuse to load a ledger file containing malformed records
    #[clap(long)]
    strict: bool,

    /// Disable coloured output
    #[clap(long)]
    no_color: bool,

    /// More logging (repeat for more)
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Config file values with command line flags layered on top.
    fn settings(&self) -> anyhow::Result<AppConfig> {
        let config = match &self.config {
            Some(path) => AppConfig::read(path)
                .with_context(|| format!("while loading {}", path.display()))?,
            None => AppConfig::default()
        };

        config.apply_overrides(&Overrides {
            ledger_file: self.file.clone(),
            starting_balance: self.starting_balance,
            strict: self.strict,
            no_color: self.no_color
        })
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let config = args.settings()?;
    debug!("using {:?}", config);
    if !config.color {
        colored::control::set_override(false);
    }

    let store = TextStore::new(&config.ledger_file, config.starting_balance)
        .with_policy(config.on_malformed);
    let ledger: Ledger = store.read()
        .with_context(|| "failed to load ledger")?;

    let stdin = io::stdin();
    let mut menu = Menu::new(ledger, store, LocalClock, stdin.lock(), io::stdout());
    menu.run()?;

    Ok(())
}
