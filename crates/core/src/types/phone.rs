//! Guest phone (WhatsApp) number.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// Too few or too many digits.
    #[error("phone number must have between {min} and {max} digits")]
    DigitCount {
        /// Minimum digits.
        min: usize,
        /// Maximum digits.
        max: usize,
    },
    /// Contains characters other than digits, spaces, `+`, `-`, `(`, `)`.
    #[error("phone number contains invalid characters")]
    InvalidCharacters,
}

/// A phone number as the guest typed it, validated loosely.
///
/// The original formatting is kept for display; [`PhoneNumber::whatsapp_number`]
/// derives the international digits used by `wa.me` links.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MIN_DIGITS: usize = 8;
    const MAX_DIGITS: usize = 15;

    /// Parse a phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is blank, contains characters other than
    /// digits and common separators, or has fewer than 8 / more than 15 digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PhoneError::Empty);
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
        {
            return Err(PhoneError::InvalidCharacters);
        }

        let digits = trimmed.chars().filter(char::is_ascii_digit).count();
        if !(Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits) {
            return Err(PhoneError::DigitCount {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Wrap a value read back from the database without re-validating it.
    #[must_use]
    pub const fn from_stored(value: String) -> Self {
        Self(value)
    }

    /// The number as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// International digits for WhatsApp: a leading `0` becomes `62`
    /// (Indonesia) and every non-digit is dropped.
    #[must_use]
    pub fn whatsapp_number(&self) -> String {
        let raw = self.0.trim();
        let prefixed = raw
            .strip_prefix('0')
            .map_or_else(|| raw.to_owned(), |rest| format!("62{rest}"));
        prefixed.chars().filter(char::is_ascii_digit).collect()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_common_formats() {
        assert!(PhoneNumber::parse("081234567890").is_ok());
        assert!(PhoneNumber::parse("+62 812-3456-7890").is_ok());
        assert!(PhoneNumber::parse("(021) 555 0199").is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(PhoneNumber::parse(" "), Err(PhoneError::Empty));
        assert_eq!(
            PhoneNumber::parse("0812abc"),
            Err(PhoneError::InvalidCharacters)
        );
        assert!(matches!(
            PhoneNumber::parse("0812"),
            Err(PhoneError::DigitCount { .. })
        ));
    }

    #[test]
    fn test_whatsapp_number_replaces_leading_zero() {
        let phone = PhoneNumber::parse("0812-3456-7890").unwrap();
        assert_eq!(phone.whatsapp_number(), "6281234567890");
    }

    #[test]
    fn test_whatsapp_number_keeps_international_prefix() {
        let phone = PhoneNumber::parse("+62 812 3456 7890").unwrap();
        assert_eq!(phone.whatsapp_number(), "6281234567890");
    }
}
