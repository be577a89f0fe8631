//! Amounts of money in pence and their display formats.
//!
//! All amounts are stored and computed as integer pence. Pounds only appear
//! at the edges: parsing form input, rendering HTML, charts and CSV exports.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};

use crate::Error;

/// An amount of money in the minor currency unit (1/100 GBP).
pub type Pence = i64;

/// The largest amount accepted for a single donation or collection, £1,000,000.
pub const MAX_AMOUNT_PENCE: Pence = 100_000_000;

/// Format `pence` as pounds with a thousands separator, e.g. "£1,234.50".
pub fn format_pence(pence: Pence) -> String {
    let sign = if pence < 0 { "-" } else { "" };
    let pence = pence.unsigned_abs();
    let pounds = get_thousands_separator_formatter().fmt_string(pence / 100);

    format!("{sign}£{pounds}.{:02}", pence % 100)
}

/// Format `pence` as whole pounds, rounding half away from zero, e.g. "£1,235".
pub fn format_pence_rounded(pence: Pence) -> String {
    let sign = if pence < 0 { "-" } else { "" };
    let pounds = (pence.unsigned_abs() + 50) / 100;

    format!(
        "{sign}£{}",
        get_thousands_separator_formatter().fmt_string(pounds)
    )
}

/// Format `pence` as a plain decimal number of pounds, e.g. "1234.50".
///
/// Used for machine-readable output such as CSV exports.
pub fn pence_to_decimal_string(pence: Pence) -> String {
    let sign = if pence < 0 { "-" } else { "" };
    let pence = pence.unsigned_abs();

    format!("{sign}{}.{:02}", pence / 100, pence % 100)
}

/// Convert pence to pounds for chart axes.
pub fn pence_to_pounds(pence: Pence) -> f64 {
    pence as f64 / 100.0
}

/// Parse a non-negative amount of pounds such as "12", "12.5" or "£1,200.00" into pence.
///
/// # Errors
/// Returns [Error::InvalidAmount] if the text is empty or negative, has more than
/// two decimal places, contains anything other than digits or is more than
/// [MAX_AMOUNT_PENCE].
pub fn parse_pounds(text: &str) -> Result<Pence, Error> {
    let invalid = || Error::InvalidAmount(text.to_owned());

    let cleaned: String = text
        .trim()
        .trim_start_matches('£')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    let (whole, fraction) = match cleaned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (cleaned.as_str(), ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }

    if !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
        || fraction.len() > 2
    {
        return Err(invalid());
    }

    let whole: Pence = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };

    let fraction: Pence = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<Pence>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    whole
        .checked_mul(100)
        .and_then(|pence| pence.checked_add(fraction))
        .filter(|pence| *pence <= MAX_AMOUNT_PENCE)
        .ok_or_else(invalid)
}

fn get_thousands_separator_formatter() -> &'static Formatter {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    FORMATTER.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .expect("',' is a valid separator")
            .precision(Precision::Decimals(0))
    })
}


#[cfg(test)]
mod parse_tests {
    use crate::Error;

    use super::{MAX_AMOUNT_PENCE, parse_pounds};

    #[test]
    fn parses_whole_pounds() {
        assert_eq!(parse_pounds("12"), Ok(1200));
    }

    #[test]
    fn parses_one_decimal_place() {
        assert_eq!(parse_pounds("12.5"), Ok(1250));
    }

    #[test]
    fn parses_symbol_and_separators() {
        assert_eq!(parse_pounds(" £1,200.05 "), Ok(120005));
    }

    #[test]
    fn parses_fraction_only() {
        assert_eq!(parse_pounds(".99"), Ok(99));
    }

    #[test]
    fn rejects_negative_amounts() {
        assert_eq!(
            parse_pounds("-5"),
            Err(Error::InvalidAmount("-5".to_owned()))
        );
    }

    #[test]
    fn rejects_three_decimal_places() {
        assert!(parse_pounds("1.001").is_err());
    }

    #[test]
    fn rejects_amounts_over_the_limit() {
        assert_eq!(parse_pounds("1,000,000"), Ok(MAX_AMOUNT_PENCE));
        assert_eq!(
            parse_pounds("1000000.01"),
            Err(Error::InvalidAmount("1000000.01".to_owned()))
        );
        assert_eq!(
            parse_pounds("10000000000000000"),
            Err(Error::InvalidAmount("10000000000000000".to_owned()))
        );
    }

    #[test]
    fn rejects_empty_text() {
        assert!(parse_pounds("").is_err());
        assert!(parse_pounds(".").is_err());
    }
}
