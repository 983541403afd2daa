//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! ck-cli migrate
//! ```
//!
//! Applies every pending file in `migrations/` at the workspace root. The
//! storefront and back-office never migrate on start-up.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply pending migrations.
///
/// # Errors
///
/// Returns an error if the connection fails or a migration does not apply.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(MigrationError::from)?;

    tracing::info!("Migrations complete!");
    Ok(())
}
