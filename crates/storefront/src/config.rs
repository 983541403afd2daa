//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `UPLOAD_DIR` - Root directory for uploaded files (default: uploads)
//! - `UPLOAD_MAX_BYTES` - Maximum upload size in bytes (default: 5242880)
//! - `PAYMENT_BANK_NAME`, `PAYMENT_ACCOUNT_NUMBER`, `PAYMENT_ACCOUNT_HOLDER` -
//!   Bank transfer instructions shown on the tracking page (all three or none)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::SecretString;

pub use cooskie_core::env::{ConfigError, EnvReader, UploadConfig};

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Where uploads are written and how large they may be
    pub uploads: UploadConfig,
    /// Bank account customers transfer to
    pub payment: Option<PaymentInstructions>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Bank transfer details shown next to the payment-proof form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentInstructions {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_reader(&EnvReader::process())
    }

    /// Load configuration through `vars`.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_reader<L>(vars: &EnvReader<L>) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database_url: vars.database_url("STOREFRONT_DATABASE_URL")?,
            host: vars.parsed_or("STOREFRONT_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: vars.parsed_or("STOREFRONT_PORT", 3000)?,
            base_url: vars.base_url("STOREFRONT_BASE_URL")?,
            session_secret: vars.session_secret("STOREFRONT_SESSION_SECRET")?,
            uploads: UploadConfig::from_reader(vars)?,
            payment: PaymentInstructions::from_reader(vars)?,
            sentry_dsn: vars.optional("SENTRY_DSN"),
            sentry_environment: vars.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: vars.sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: vars.sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl PaymentInstructions {
    fn from_reader<L>(vars: &EnvReader<L>) -> Result<Option<Self>, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let values = vars.all_or_none([
            "PAYMENT_BANK_NAME",
            "PAYMENT_ACCOUNT_NUMBER",
            "PAYMENT_ACCOUNT_HOLDER",
        ])?;
        Ok(values.map(|[bank_name, account_number, account_holder]| Self {
            bank_name,
            account_number,
            account_holder,
        }))
    }
}
