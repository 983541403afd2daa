//! Customer-facing tracking codes.
//!
//! Format: `CSK-XXXX-NNNN`, four random uppercase alphanumerics followed by
//! the last four digits of the Unix timestamp (seconds). Codes are not unique
//! by construction; the `orders.tracking_code` unique index catches
//! collisions and checkout regenerates.

use core::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const PREFIX: &str = "CSK";
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Error returned when a string is not a well-formed tracking code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid tracking code: {0}")]
pub struct TrackingCodeError(String);

/// A validated tracking code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TrackingCode(String);

impl TrackingCode {
    /// Generate a new code from the current time.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_at(&mut rand::rng(), Utc::now())
    }

    /// Generate a code with an explicit RNG and clock.
    #[must_use]
    pub fn generate_at<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Self {
        let random: String = (0..4)
            .map(|_| {
                let idx = rng.random_range(0..ALPHABET.len());
                char::from(ALPHABET.get(idx).copied().unwrap_or(b'X'))
            })
            .collect();
        let suffix = now.timestamp().rem_euclid(10_000);
        Self(format!("{PREFIX}-{random}-{suffix:04}"))
    }

    /// Parse user input. Surrounding whitespace is ignored and lowercase
    /// letters are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingCodeError`] when the input is not `CSK-XXXX-NNNN`.
    pub fn parse(input: &str) -> Result<Self, TrackingCodeError> {
        let code = input.trim().to_ascii_uppercase();
        let mut parts = code.split('-');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next(), parts.next()),
            (Some(PREFIX), Some(random), Some(digits), None)
                if random.len() == 4
                    && random.bytes().all(|b| ALPHABET.contains(&b))
                    && digits.len() == 4
                    && digits.bytes().all(|b| b.is_ascii_digit())
        );
        if valid {
            Ok(Self(code))
        } else {
            Err(TrackingCodeError(input.trim().to_owned()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TrackingCode {
    type Error = TrackingCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TrackingCode> for String {
    fn from(code: TrackingCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for TrackingCode {
    type Err = TrackingCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_generated_code_has_expected_shape() {
        for _ in 0..100 {
            let code = TrackingCode::generate();
            assert_eq!(code.as_str().len(), 13);
            assert!(TrackingCode::parse(code.as_str()).is_ok(), "{code}");
        }
    }

    #[test]
    fn test_suffix_is_last_four_timestamp_digits() {
        let now = Utc.timestamp_opt(1_718_000_042, 0).unwrap();
        let code = TrackingCode::generate_at(&mut StdRng::seed_from_u64(7), now);
        assert!(code.as_str().starts_with("CSK-"));
        assert!(code.as_str().ends_with("-0042"));
    }

    #[test]
    fn test_parse_normalises_input() {
        let code = TrackingCode::parse("  csk-ab12-0042 ").unwrap();
        assert_eq!(code.as_str(), "CSK-AB12-0042");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "CSK",
            "CSK-AB12",
            "ABC-AB12-0042",
            "CSK-AB1-0042",
            "CSK-AB12-00A2",
            "CSK-AB12-0042-1",
            "CSK-AB_2-0042",
        ] {
            assert!(TrackingCode::parse(bad).is_err(), "{bad} should be rejected");
        }
    }
}
