//! One line of the ledger file: `<kind> <amount> <timestamp>`,
//! e.g. `D 100.00 2024-03-01 09:30:05`.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::core::{Amount, Kind, LedgerError, ParseAmountError, Transaction, TIMESTAMP_FORMAT};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseRecordError {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("unknown transaction kind '{0}'")]
    UnknownKind(String),
    #[error("bad amount: {0}")]
    BadAmount(#[from] ParseAmountError),
    #[error("amount {0} is not positive")]
    NonPositiveAmount(Amount),
    #[error("bad timestamp '{0}'")]
    BadTimestamp(String),
    #[error("cannot replay record: {0}")]
    Unreplayable(#[from] LedgerError),
}

pub fn format_record(transaction: &Transaction) -> String {
    format!("{} {} {}",
        transaction.kind().tag(),
        transaction.amount(),
        transaction.timestamp().format(TIMESTAMP_FORMAT))
}

/// Splits off the first whitespace-delimited field.
fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some((&s[..end], &s[end..]))
}

pub fn parse_record(line: &str) -> Result<Transaction, ParseRecordError> {
    let (kind_str, rest) = next_field(line)
        .ok_or(ParseRecordError::MissingField("kind"))?;
    let mut kind_chars = kind_str.chars();
    let kind = match (kind_chars.next(), kind_chars.next()) {
        (Some(tag), None) => Kind::from_tag(tag),
        _ => None
    }.ok_or_else(|| ParseRecordError::UnknownKind(kind_str.to_owned()))?;

    let (amount_str, rest) = next_field(rest)
        .ok_or(ParseRecordError::MissingField("amount"))?;
    let amount: Amount = amount_str.parse()?;
    if !amount.is_positive() {
        return Err(ParseRecordError::NonPositiveAmount(amount));
    }

    // the rest of the line, spaces included, is the timestamp
    let timestamp_str = rest.trim();
    if timestamp_str.is_empty() {
        return Err(ParseRecordError::MissingField("timestamp"));
    }
    let timestamp = NaiveDateTime::parse_from_str(timestamp_str, TIMESTAMP_FORMAT)
        .map_err(|_| ParseRecordError::BadTimestamp(timestamp_str.to_owned()))?;

    return Ok(Transaction::new(kind, amount, timestamp));
}


#[cfg(test)]
mod tests {
    use super::{format_record, parse_record, ParseRecordError};
    use crate::core::{Amount, Kind, ParseAmountError};
    use rstest::rstest;

    #[test]
    fn parses_and_formats() {
        let line = "D 100.00 2024-03-01 09:30:05";
        let transaction = parse_record(line).unwrap();
        assert_eq!(transaction.kind(), Kind::Deposit);
        assert_eq!(transaction.amount(), Amount::from_cents(100_00));
        assert_eq!(transaction.timestamp().to_string(), "2024-03-01 09:30:05");
        assert_eq!(format_record(&transaction), line);
    }

    #[rstest]
    #[case("W 12.5 2024-03-01 09:30:05", "W 12.50 2024-03-01 09:30:05")]
    #[case("D 100 2024-03-01 09:30:05", "D 100.00 2024-03-01 09:30:05")]
    #[case("  W\t3.10   2024-03-01 09:30:05  ", "W 3.10 2024-03-01 09:30:05")]
    fn normalises(#[case] line: &str, #[case] normalised: &str) {
        assert_eq!(format_record(&parse_record(line).unwrap()), normalised);
    }

    #[rstest]
    #[case("", ParseRecordError::MissingField("kind"))]
    #[case("D", ParseRecordError::MissingField("amount"))]
    #[case("D 10.00", ParseRecordError::MissingField("timestamp"))]
    #[case("X 10.00 2024-03-01 09:30:05", ParseRecordError::UnknownKind("X".into()))]
    #[case("DW 10.00 2024-03-01 09:30:05", ParseRecordError::UnknownKind("DW".into()))]
    #[case("D ten 2024-03-01 09:30:05",
        ParseRecordError::BadAmount(ParseAmountError::NotANumber("ten".into())))]
    #[case("D 0 2024-03-01 09:30:05", ParseRecordError::NonPositiveAmount(Amount::ZERO))]
    #[case("W -4 2024-03-01 09:30:05", ParseRecordError::NonPositiveAmount(Amount::from_cents(-400)))]
    #[case("D 10.00 yesterday", ParseRecordError::BadTimestamp("yesterday".into()))]
    #[case("D 10.00 2024-13-01 09:30:05", ParseRecordError::BadTimestamp("2024-13-01 09:30:05".into()))]
    fn rejects(#[case] line: &str, #[case] expected: ParseRecordError) {
        assert_eq!(parse_record(line), Err(expected));
    }
}
