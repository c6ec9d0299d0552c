use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use thiserror::Error;

/// An amount of money, stored as whole cents so that replaying a long
/// history never accumulates rounding error.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Amount(i64);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("no amount given")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("'{0}' has more than two decimal places")]
    TooPrecise(String),
    #[error("'{0}' is too large")]
    Overflow(String),
}

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const MAX: Amount = Amount(i64::MAX);

    pub const fn from_cents(cents: i64) -> Amount {
        Amount(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// `None` when the result does not fit.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    pub fn saturating_add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

fn parse_digits(digits: &str, original: &str) -> Result<i64, ParseAmountError> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseAmountError::NotANumber(original.to_owned()));
    }
    if digits.is_empty() {
        return Ok(0);
    }
    digits.parse::<i64>()
        .map_err(|_| ParseAmountError::Overflow(original.to_owned()))
}

impl FromStr for Amount {
    type Err = ParseAmountError;

    /// Accepts `100`, `12.5`, `12.50`, `.75` and a leading `-` or `+`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseAmountError::Empty);
        }

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed)
        };

        let (units_str, fraction_str) = match unsigned.split_once('.') {
            Some((units, fraction)) => (units, fraction),
            None => (unsigned, "")
        };
        if units_str.is_empty() && fraction_str.is_empty() {
            return Err(ParseAmountError::NotANumber(trimmed.to_owned()));
        }
        if fraction_str.len() > 2 {
            // still report garbage as garbage
            parse_digits(fraction_str, trimmed)?;
            return Err(ParseAmountError::TooPrecise(trimmed.to_owned()));
        }

        let units = parse_digits(units_str, trimmed)?;
        let fraction = parse_digits(fraction_str, trimmed)?;
        let fraction = if fraction_str.len() == 1 { fraction * 10 } else { fraction };

        let cents = units.checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(|| ParseAmountError::Overflow(trimmed.to_owned()))?;

        return Ok(Amount(if negative { -cents } else { cents }));
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let text = format!("{}{}.{:02}", sign, abs / 100, abs % 100);
        f.pad(&text)
    }
}

impl Neg for Amount {
    type Output = Amount;
    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{Amount, ParseAmountError};
    use rstest::rstest;

    #[rstest]
    #[case("100", 10000)]
    #[case("12.5", 1250)]
    #[case("12.50", 1250)]
    #[case(".75", 75)]
    #[case("0.01", 1)]
    #[case("7.", 700)]
    #[case("  42.10 ", 4210)]
    #[case("-3.20", -320)]
    #[case("+3", 300)]
    fn parses(#[case] input: &str, #[case] cents: i64) {
        assert_eq!(input.parse::<Amount>().unwrap(), Amount::from_cents(cents));
    }

    #[rstest]
    #[case("", ParseAmountError::Empty)]
    #[case("   ", ParseAmountError::Empty)]
    #[case("abc", ParseAmountError::NotANumber("abc".into()))]
    #[case(".", ParseAmountError::NotANumber(".".into()))]
    #[case("1.2.3", ParseAmountError::NotANumber("1.2.3".into()))]
    #[case("1,50", ParseAmountError::NotANumber("1,50".into()))]
    #[case("--1", ParseAmountError::NotANumber("--1".into()))]
    #[case("1.234", ParseAmountError::TooPrecise("1.234".into()))]
    #[case("99999999999999999999", ParseAmountError::Overflow("99999999999999999999".into()))]
    fn rejects(#[case] input: &str, #[case] expected: ParseAmountError) {
        assert_eq!(input.parse::<Amount>(), Err(expected));
    }

    #[test]
    fn displays_two_decimals() {
        assert_eq!(Amount::from_cents(60000).to_string(), "600.00");
        assert_eq!(Amount::from_cents(5).to_string(), "0.05");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
        assert_eq!(Amount::from_cents(-1234).to_string(), "-12.34");
    }

    #[test]
    fn display_honours_width() {
        assert_eq!(format!("{:<8}|", Amount::from_cents(150)), "1.50    |");
    }

    #[test]
    fn arithmetic() {
        let a = Amount::from_cents(1000);
        let b = Amount::from_cents(250);
        assert_eq!(a.checked_add(b), Some(Amount::from_cents(1250)));
        assert_eq!(a.checked_sub(b), Some(Amount::from_cents(750)));
        assert_eq!(-b, Amount::from_cents(-250));
    }

    #[test]
    fn arithmetic_at_the_limit() {
        let one = Amount::from_cents(1);
        assert_eq!(Amount::MAX.checked_add(one), None);
        assert_eq!(Amount::MAX.checked_add(Amount::ZERO), Some(Amount::MAX));
        assert_eq!((-Amount::MAX).checked_sub(Amount::from_cents(2)), None);
        assert_eq!(Amount::MAX.saturating_add(Amount::from_cents(500_00)), Amount::MAX);
        assert_eq!(Amount::MAX.checked_sub(one), Some(Amount::from_cents(i64::MAX - 1)));
    }

    #[test]
    fn largest_parseable_amount() {
        assert_eq!("92233720368547758.07".parse::<Amount>(), Ok(Amount::MAX));
        assert_eq!("92233720368547758.08".parse::<Amount>(),
            Err(ParseAmountError::Overflow("92233720368547758.08".into())));
    }
}
