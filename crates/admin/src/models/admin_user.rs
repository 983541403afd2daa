//! Back-office user domain type.

use chrono::{DateTime, Utc};

use cooskie_core::{Email, UserId, UserRole};

/// A registered user as loaded for authentication.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl AdminUser {
    /// Only the `admin` role may enter the back-office.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
