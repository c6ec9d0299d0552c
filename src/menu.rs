//! The interactive main menu: a small state machine reading numbered
//! choices from `input` and dispatching them to the ledger.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use colored::Colorize;
use log::{debug, info};
use thiserror::Error;

use crate::backend::{BackendError, LedgerStore};
use crate::core::{Amount, AmountRejection, Clock, Kind, KindFilter, Ledger, LedgerError};

const BANNER: &str = "========== MAIN MENU ==========";
const RULE: &str = "---------------------------------------------";
const OPTIONS: [&str; 7] = [
    "Balance",
    "Make a Deposit",
    "Make a Withdrawal",
    "Deposit History",
    "Withdrawal History",
    "All Deposits and Withdrawals",
    "Exit",
];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Choice {
    Balance,
    Deposit,
    Withdraw,
    DepositHistory,
    WithdrawalHistory,
    AllHistory,
    Exit
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChoiceError {
    #[error("Please enter a number 1-7.")]
    NotANumber,
    #[error("Choose 1-7 only.")]
    OutOfRange(i64)
}

impl TryFrom<i64> for Choice {
    type Error = ChoiceError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        let choice = match n {
            1 => Choice::Balance,
            2 => Choice::Deposit,
            3 => Choice::Withdraw,
            4 => Choice::DepositHistory,
            5 => Choice::WithdrawalHistory,
            6 => Choice::AllHistory,
            7 => Choice::Exit,
            _ => return Err(ChoiceError::OutOfRange(n))
        };
        Ok(choice)
    }
}

impl FromStr for Choice {
    type Err = ChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: i64 = s.trim().parse().map_err(|_| ChoiceError::NotANumber)?;
        Choice::try_from(n)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MenuState {
    MainMenu,
    Exit
}

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to save ledger: {0}")]
    Save(#[from] BackendError)
}

/// Balances shown when the session ends.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SessionSummary {
    pub starting_balance: Amount,
    pub final_balance: Amount,
    pub transactions: usize
}

pub struct Menu<S, C, R, W> {
    ledger: Ledger,
    store: S,
    clock: C,
    input: R,
    output: W,
    starting_balance: Amount,
    state: MenuState
}

impl<S, C, R, W> Menu<S, C, R, W>
where
    S: LedgerStore,
    C: Clock,
    R: BufRead,
    W: Write
{
    pub fn new(ledger: Ledger, store: S, clock: C, input: R, output: W) -> Self {
        let starting_balance = ledger.balance();
        Menu { ledger, store, clock, input, output, starting_balance, state: MenuState::MainMenu }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Runs the whole session: greeting, menu loop, then saving and the
    /// closing summary. Running out of input counts as choosing Exit.
    pub fn run(&mut self) -> Result<SessionSummary, MenuError> {
        self.greet()?;
        while self.state == MenuState::MainMenu {
            self.show_menu()?;
            match self.read_line()? {
                Some(line) => self.handle_input(&line)?,
                None => {
                    writeln!(self.output)?;
                    self.select(Choice::Exit)?;
                }
            }
        }
        return self.finish();
    }

    fn greet(&mut self) -> io::Result<()> {
        self.prompt("What is your name? ")?;
        match self.read_line()? {
            Some(name) => {
                writeln!(self.output, "\nHello, {} - welcome to your account!\n", name.trim())
            },
            None => {
                self.state = MenuState::Exit;
                writeln!(self.output)
            }
        }
    }

    fn show_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n{}", BANNER.bold())?;
        self.show_balance()?;
        writeln!(self.output)?;
        for (idx, option) in OPTIONS.iter().enumerate() {
            writeln!(self.output, "{}) {}", idx + 1, option)?;
        }
        self.prompt("Select an option: ")
    }

    /// Feeds one line of menu input through the state machine. Bad input
    /// is reported and leaves everything as it was.
    pub fn handle_input(&mut self, line: &str) -> Result<(), MenuError> {
        match line.parse::<Choice>() {
            Ok(choice) => self.select(choice),
            Err(err) => {
                debug!("rejected menu input {:?}: {:?}", line.trim(), err);
                writeln!(self.output, "{}", err.to_string().red())?;
                Ok(())
            }
        }
    }

    pub fn select(&mut self, choice: Choice) -> Result<(), MenuError> {
        debug!("menu choice {:?}", choice);
        match choice {
            Choice::Balance => self.show_balance()?,
            Choice::Deposit => self.transact(Kind::Deposit)?,
            Choice::Withdraw => self.transact(Kind::Withdrawal)?,
            Choice::DepositHistory => self.show_history(KindFilter::Deposit)?,
            Choice::WithdrawalHistory => self.show_history(KindFilter::Withdrawal)?,
            Choice::AllHistory => self.show_history(KindFilter::All)?,
            Choice::Exit => {
                writeln!(self.output, "\nExiting ...")?;
                self.state = MenuState::Exit;
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<SessionSummary, MenuError> {
        self.store.save(&self.ledger)?;

        let summary = SessionSummary {
            starting_balance: self.starting_balance,
            final_balance: self.ledger.balance(),
            transactions: self.ledger.len()
        };
        let (deposited, withdrawn) = self.ledger.totals();
        info!("session ended: {} -> {} (all-time deposits {}, withdrawals {})",
            summary.starting_balance, summary.final_balance, deposited, withdrawn);

        writeln!(self.output, "Starting balance: ${}", summary.starting_balance)?;
        writeln!(self.output, "Final balance:    ${}", summary.final_balance)?;
        self.output.flush()?;
        return Ok(summary);
    }

    fn show_balance(&mut self) -> io::Result<()> {
        writeln!(self.output, "Balance: ${}", self.ledger.balance())
    }

    fn transact(&mut self, kind: Kind) -> io::Result<()> {
        let label = match kind {
            Kind::Deposit => "deposit",
            Kind::Withdrawal => "withdrawal"
        };
        self.prompt(&format!("Enter {} amount: $", label))?;

        let line = self.read_line()?.unwrap_or_default();
        let amount = match line.parse::<Amount>() {
            Ok(amount) => amount,
            Err(err) => {
                return writeln!(self.output, "{}", format!("Invalid! {}.", err).red());
            }
        };

        let at = self.clock.now();
        let result = match kind {
            Kind::Deposit => self.ledger.deposit(amount, at),
            Kind::Withdrawal => self.ledger.withdraw(amount, at)
        };

        let message = match (kind, result) {
            (Kind::Deposit, Ok(t)) => format!("Deposited ${}.", t.amount()).green(),
            (Kind::Withdrawal, Ok(t)) => format!("Withdrew ${}.", t.amount()).green(),
            (_, Err(LedgerError::InvalidAmount { reason: AmountRejection::NotPositive, .. })) => {
                format!("Invalid! {} must be positive.", kind).red()
            },
            (_, Err(LedgerError::InvalidAmount { reason: AmountRejection::ExceedsBalance { balance }, .. })) => {
                format!("Invalid! Must be >0 and <= current balance of ${}.", balance).red()
            },
            (_, Err(LedgerError::InvalidAmount { reason: AmountRejection::TooLarge { balance }, .. })) => {
                format!("Invalid! {} is too large for a balance of ${}.", amount, balance).red()
            }
        };
        writeln!(self.output, "{}", message)
    }

    fn show_history(&mut self, filter: KindFilter) -> io::Result<()> {
        let transactions = self.ledger.list_by_kind(filter);
        if transactions.is_empty() {
            return writeln!(self.output, "(no transactions)");
        }

        writeln!(self.output, "{:<12}{:<12}{}", "Type", "Amount", "Timestamp")?;
        writeln!(self.output, "{}", RULE)?;
        for transaction in transactions {
            writeln!(self.output, "{}", transaction)?;
        }
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.output, "{}", text)?;
        self.output.flush()
    }

    /// Next line of input without its line ending, or `None` at end of input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        let trimmed_len = buf.trim_end_matches(['\n', '\r']).len();
        buf.truncate(trimmed_len);
        Ok(Some(buf))
    }
}
