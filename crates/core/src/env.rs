//! Environment variable readers shared by the binaries' configuration.
//!
//! Secrets are checked against a placeholder blocklist and a minimum Shannon
//! entropy before they are accepted.

use std::collections::HashMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::storage::DEFAULT_MAX_UPLOAD_BYTES;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Substrings that mark a value as a copied placeholder (matched lowercase).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Upload storage settings (`UPLOAD_DIR`, `UPLOAD_MAX_BYTES`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Root directory holding one subdirectory per bucket
    pub dir: PathBuf,
    /// Maximum accepted file size
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("uploads"),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `UPLOAD_MAX_BYTES` is not a size.
    pub fn from_reader<L>(vars: &EnvReader<L>) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            dir: vars
                .optional("UPLOAD_DIR")
                .map_or_else(|| PathBuf::from("uploads"), PathBuf::from),
            max_bytes: vars.parsed_or("UPLOAD_MAX_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

/// Process environment lookup.
pub type ProcessLookup = fn(&str) -> Option<String>;

fn process_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Typed configuration reads over a key lookup.
///
/// [`EnvReader::process`] reads the process environment; tests pass a map.
pub struct EnvReader<L> {
    lookup: L,
}

impl EnvReader<ProcessLookup> {
    #[must_use]
    pub fn process() -> Self {
        Self::new(process_var)
    }
}

impl<L> EnvReader<L>
where
    L: Fn(&str) -> Option<String>,
{
    pub const fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// A variable that must be set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `key` is unset or empty.
    pub fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// A variable that may be unset; empty counts as unset.
    #[must_use]
    pub fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    /// Parse `key`, or use `default` when unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the value does not parse.
    pub fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }

    /// Database URL from `primary_key`, falling back to `DATABASE_URL` (set by
    /// Fly.io postgres attach).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` naming `primary_key` if neither is set.
    pub fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }

    /// A required absolute URL, returned without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if unset or not a valid URL.
    pub fn base_url(&self, key: &str) -> Result<String, ConfigError> {
        let value = self.required(key)?;
        Url::parse(&value)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        Ok(value.trim_end_matches('/').to_string())
    }

    /// A sample rate in `0.0..=1.0`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if unparsable or out of range.
    pub fn sample_rate(&self, key: &str, default: f32) -> Result<f32, ConfigError> {
        let rate = self.parsed_or(key, default)?;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("must be between 0.0 and 1.0 (got {rate})"),
            ));
        }
        Ok(rate)
    }

    /// Either every key in `keys` is set, or none is.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` naming the first unset key when only
    /// some are set.
    pub fn all_or_none<const N: usize>(
        &self,
        keys: [&str; N],
    ) -> Result<Option<[String; N]>, ConfigError> {
        let values = keys.map(|key| self.optional(key));
        if values.iter().all(Option::is_none) {
            return Ok(None);
        }
        if let Some(i) = values.iter().position(Option::is_none) {
            let missing = keys.get(i).copied().unwrap_or_default();
            return Err(ConfigError::MissingEnvVar(missing.to_string()));
        }
        Ok(Some(values.map(Option::unwrap_or_default)))
    }

    /// A session signing secret: long enough, not a placeholder, high entropy.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if unset or if the value fails any check.
    pub fn session_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        let secret = SecretString::from(self.required(key)?);
        let value = secret.expose_secret();
        if value.len() < MIN_SESSION_SECRET_LENGTH {
            return Err(ConfigError::InsecureSecret(
                key.to_string(),
                format!(
                    "must be at least {MIN_SESSION_SECRET_LENGTH} characters (got {})",
                    value.len()
                ),
            ));
        }
        check_secret_strength(value, key)?;
        Ok(secret)
    }
}

/// Refuse placeholders and low-entropy values.
///
/// # Errors
///
/// Returns `ConfigError::InsecureSecret` describing the failed check.
pub fn check_secret_strength(secret: &str, key: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            key.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }
    Ok(())
}

/// Shannon entropy in bits per character.
#[must_use]
pub fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("aB3$xY9!mK2@nL5#") > 3.3);
    }

    #[test]
    fn test_placeholders_are_refused() {
        for value in ["your-api-key-here", "changeme123", "Cooskie_Secret_42!"] {
            let err = check_secret_strength(value, "TEST_VAR").unwrap_err();
            assert!(matches!(err, ConfigError::InsecureSecret(_, _)), "{value}");
        }
    }

    #[test]
    fn test_low_entropy_is_refused() {
        let err = check_secret_strength(&"ab".repeat(20), "TEST_VAR").unwrap_err();
        assert!(err.to_string().contains("entropy too low"));
    }

    #[test]
    fn test_random_secret_is_accepted() {
        assert!(check_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR").is_ok());
    }

    fn reader(pairs: &[(&str, &str)]) -> EnvReader<impl Fn(&str) -> Option<String>> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        EnvReader::new(move |key: &str| vars.get(key).cloned())
    }

    #[test]
    fn test_parsed_or_default_and_invalid() {
        let vars = reader(&[("STOREFRONT_PORT", "eighty")]);
        assert_eq!(vars.parsed_or("ADMIN_PORT", 3000_u16).unwrap(), 3000);
        assert!(matches!(
            vars.parsed_or("STOREFRONT_PORT", 3000_u16),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_blank_counts_as_unset() {
        let vars = reader(&[("SENTRY_DSN", "   ")]);
        assert_eq!(vars.optional("SENTRY_DSN"), None);
        assert!(matches!(
            vars.required("SENTRY_DSN"),
            Err(ConfigError::MissingEnvVar(key)) if key == "SENTRY_DSN"
        ));
    }

    #[test]
    fn test_sample_rate_range() {
        let vars = reader(&[("SENTRY_SAMPLE_RATE", "1.5")]);
        assert!(vars.sample_rate("SENTRY_SAMPLE_RATE", 1.0).is_err());
        let rate = vars.sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.25).unwrap();
        assert!((rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_all_or_none() {
        let vars = reader(&[]);
        assert!(vars.all_or_none(["TLS_CERT", "TLS_KEY"]).unwrap().is_none());

        let vars = reader(&[("TLS_CERT", "cert")]);
        let err = vars.all_or_none(["TLS_CERT", "TLS_KEY"]).unwrap_err();
        assert_eq!(err.to_string(), "Missing environment variable: TLS_KEY");

        let vars = reader(&[("TLS_CERT", "cert"), ("TLS_KEY", "key")]);
        let [a, b] = vars.all_or_none(["TLS_CERT", "TLS_KEY"]).unwrap().unwrap();
        assert_eq!((a.as_str(), b.as_str()), ("cert", "key"));
    }

    #[test]
    fn test_database_url_falls_back() {
        let vars = reader(&[("DATABASE_URL", "postgres://fly/cooskie")]);
        let url = vars.database_url("ADMIN_DATABASE_URL").unwrap();
        assert_eq!(url.expose_secret(), "postgres://fly/cooskie");

        let vars = reader(&[]);
        assert!(matches!(
            vars.database_url("ADMIN_DATABASE_URL"),
            Err(ConfigError::MissingEnvVar(key)) if key == "ADMIN_DATABASE_URL"
        ));
    }

    #[test]
    fn test_base_url_trims_slash() {
        let vars = reader(&[("BASE_URL", "https://cooskie.id/"), ("BAD_URL", "not a url")]);
        assert_eq!(vars.base_url("BASE_URL").unwrap(), "https://cooskie.id");
        assert!(vars.base_url("BAD_URL").is_err());
    }

    #[test]
    fn test_upload_config_from_reader() {
        let vars = reader(&[("UPLOAD_DIR", "/srv/uploads"), ("UPLOAD_MAX_BYTES", "1024")]);
        let uploads = UploadConfig::from_reader(&vars).unwrap();
        assert_eq!(uploads.dir, PathBuf::from("/srv/uploads"));
        assert_eq!(uploads.max_bytes, 1024);

        let vars = reader(&[("UPLOAD_MAX_BYTES", "lots")]);
        assert!(UploadConfig::from_reader(&vars).is_err());
    }

    #[test]
    fn test_upload_defaults() {
        let uploads = UploadConfig::default();
        assert_eq!(uploads.dir, PathBuf::from("uploads"));
        assert_eq!(uploads.max_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_session_secret_checks() {
        let vars = reader(&[
            ("SHORT", "aB3$xY9!"),
            ("GOOD", "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6dV"),
        ]);
        let err = vars.session_secret("SHORT").unwrap_err();
        assert!(err.to_string().contains("at least 32 characters"));
        assert!(vars.session_secret("GOOD").is_ok());
    }
}
