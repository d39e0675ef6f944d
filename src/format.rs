//! Locale-aware rendering and parsing of amounts and rates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanError;
use crate::types::Money;
use crate::LoanResult;

/// Digit grouping and decimal marks for a display locale.
///
/// The default is Vietnamese (`100.000.000`, `10,5%`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountFormat {
    /// Mark between groups of three digits.
    pub grouping_separator: char,
    /// Mark before the fractional digits of a rate.
    pub decimal_separator: char,
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self::vietnamese()
    }
}

impl AmountFormat {
    pub const fn vietnamese() -> Self {
        Self {
            grouping_separator: '.',
            decimal_separator: ',',
        }
    }

    pub const fn english() -> Self {
        Self {
            grouping_separator: ',',
            decimal_separator: '.',
        }
    }

    /// Rejects formats that could not round-trip.
    pub fn validate(&self) -> LoanResult<()> {
        if self.grouping_separator == self.decimal_separator {
            return Err(LoanError::invalid(
                "amount_format",
                "grouping and decimal separators must differ",
            ));
        }
        if self.grouping_separator.is_ascii_digit() || self.decimal_separator.is_ascii_digit() {
            return Err(LoanError::invalid("amount_format", "separators cannot be digits"));
        }
        Ok(())
    }

    /// Renders a whole amount with thousands grouping and no decimals.
    pub fn format(&self, value: Money) -> String {
        let digits = value.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(self.grouping_separator);
            }
            out.push(c);
        }
        out
    }

    /// Reads an amount typed by a user.
    ///
    /// Leading non-digits (currency symbols, spaces) are skipped, then the
    /// longest run of digits and grouping separators is read. Whatever
    /// follows, such as a decimal part or a half-typed separator, is ignored.
    ///
    /// # Errors
    ///
    /// Fails when the text has no digits, has a minus sign touching the first
    /// digit (a spaced dash is read as label punctuation), or holds a value too large for [`Money`].
    pub fn parse(&self, text: &str) -> LoanResult<Money> {
        let start = text
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| LoanError::invalid("amount", format!("no digits in {text:?}")))?;
        if text[..start].ends_with('-') {
            return Err(LoanError::invalid("amount", "cannot be negative"));
        }

        let mut value: Money = 0;
        for c in text[start..].chars() {
            if let Some(digit) = c.to_digit(10) {
                value = value
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(Money::from(digit)))
                    .ok_or_else(|| LoanError::invalid("amount", format!("{text:?} is too large")))?;
            } else if c != self.grouping_separator {
                break;
            }
        }
        Ok(value)
    }

    /// Reads a percentage rate such as `10,5`, `10.5` or `10.5%`.
    ///
    /// Either `.` or `,` is accepted as the decimal point since rates never
    /// need grouping. A trailing point from a half-typed value is dropped.
    ///
    /// # Errors
    ///
    /// Fails on empty or negative input and on anything that is not a number.
    pub fn parse_rate(&self, text: &str) -> LoanResult<Decimal> {
        let cleaned = text.trim().trim_end_matches('%').trim_end();
        if cleaned.starts_with('-') {
            return Err(LoanError::invalid("annual_rate_percent", "cannot be negative"));
        }

        let normalized: String = cleaned
            .chars()
            .map(|c| if c == ',' || c == self.decimal_separator { '.' } else { c })
            .collect();
        let normalized = normalized.strip_suffix('.').unwrap_or(&normalized);
        if !normalized.chars().any(|c| c.is_ascii_digit()) {
            return Err(LoanError::invalid(
                "annual_rate_percent",
                format!("no digits in {text:?}"),
            ));
        }

        normalized.parse::<Decimal>().map_err(|e| {
            LoanError::invalid("annual_rate_percent", format!("{text:?} is not a rate: {e}"))
        })
    }

    /// Renders a percentage rate with the locale decimal mark, e.g. `10,5%`.
    pub fn format_rate(&self, rate: Decimal) -> String {
        let plain = rate.normalize().to_string();
        let localized: String = plain
            .chars()
            .map(|c| if c == '.' { self.decimal_separator } else { c })
            .collect();
        format!("{localized}%")
    }
}

/// Formats an amount the Vietnamese way: `100000000` → `"100.000.000"`.
pub fn format_amount(value: Money) -> String {
    AmountFormat::default().format(value)
}

/// Parses an amount typed in the Vietnamese format; see [`AmountFormat::parse`].
///
/// # Errors
///
/// Returns [`LoanError::InvalidInput`] when no amount can be read.
pub fn parse_amount(text: &str) -> LoanResult<Money> {
    AmountFormat::default().parse(text)
}
