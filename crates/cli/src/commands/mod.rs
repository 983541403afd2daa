//! Subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

use cooskie_core::env::{ConfigError, EnvReader};

/// Connect using `DATABASE_URL`.
pub(crate) async fn connect() -> Result<PgPool, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url: SecretString = EnvReader::process()
        .optional("DATABASE_URL")
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

    tracing::info!("Connecting to database...");
    Ok(cooskie_admin::db::create_pool(&database_url).await?)
}
