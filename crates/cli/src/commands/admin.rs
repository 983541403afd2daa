//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! ck-cli admin create -e admin@cooskie.id -n "Admin Name" -p "long passphrase"
//! ```
//!
//! Running it again for the same email resets the name and password and
//! promotes the account to admin.

use thiserror::Error;

use cooskie_admin::db::{RepositoryError, UserRepository};
use cooskie_admin::services::AuthError;
use cooskie_admin::services::auth::{hash_password, validate_password};
use cooskie_core::{Email, EmailError, UserId, UserRole};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Name must not be empty")]
    EmptyName,

    #[error(transparent)]
    Password(#[from] AuthError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Check the arguments before touching the database.
fn validate(email: &str, name: &str, password: &str) -> Result<(Email, String), AdminError> {
    let email = Email::parse(email)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(AdminError::EmptyName);
    }
    validate_password(password)?;
    Ok((email, name.to_owned()))
}

/// Create or reset an admin user.
///
/// # Errors
///
/// Returns an error if an argument is invalid or the database write fails.
pub async fn create_user(
    email: &str,
    name: &str,
    password: &str,
) -> Result<UserId, Box<dyn std::error::Error>> {
    let (email, name) = validate(email, name, password)?;
    let password_hash = hash_password(password).map_err(AdminError::from)?;

    let pool = super::connect().await?;

    tracing::info!("Creating admin user: {}", email);
    let user = UserRepository::new(&pool)
        .upsert(&email, &name, UserRole::Admin, &password_hash)
        .await
        .map_err(AdminError::from)?;

    tracing::info!(
        "Admin user ready! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );

    Ok(user.id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_good_arguments() {
        let (email, name) = validate("Admin@Cooskie.id", "  Rina ", "long passphrase").unwrap();
        assert_eq!(name, "Rina");
        assert_eq!(email.as_str(), "admin@cooskie.id");
    }

    #[test]
    fn test_validate_rejects_bad_arguments() {
        assert!(matches!(
            validate("not-an-email", "Rina", "long passphrase"),
            Err(AdminError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate("admin@cooskie.id", " ", "long passphrase"),
            Err(AdminError::EmptyName)
        ));
        assert!(matches!(
            validate("admin@cooskie.id", "Rina", "short"),
            Err(AdminError::Password(AuthError::WeakPassword(_)))
        ));
    }
}
