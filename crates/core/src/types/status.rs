//! Status enums for various entities.
//!
//! All of these are stored as `TEXT` columns guarded by `CHECK` constraints,
//! so each one round-trips through [`as_str`](OrderStatus::as_str) and
//! [`FromStr`](std::str::FromStr) rather than a Postgres enum type.

use serde::{Deserialize, Serialize};

/// Error returned when a stored status string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

macro_rules! text_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Database and form representation.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseStatusError::new($kind, s)),
                }
            }
        }
    };
}

/// Lifecycle of an order.
///
/// See [`crate::order`] for the allowed transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, waiting for a payment proof to be uploaded and verified.
    #[default]
    WaitingVerification,
    /// Payment accepted; the bakery is preparing the order.
    Processing,
    /// Handed to the courier (or ready at the outlet).
    Shipped,
    /// Received by the customer.
    Completed,
    /// Cancelled by an admin.
    Cancelled,
}

text_enum!(OrderStatus, "order status", {
    WaitingVerification => "waiting_verification",
    Processing => "processing",
    Shipped => "shipped",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::WaitingVerification,
        Self::Processing,
        Self::Shipped,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Customer-facing label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::WaitingVerification => "Waiting for payment verification",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// CSS modifier for status badges.
    #[must_use]
    pub const fn badge_class(&self) -> &'static str {
        match self {
            Self::WaitingVerification => "badge-warning",
            Self::Processing => "badge-info",
            Self::Shipped => "badge-primary",
            Self::Completed => "badge-success",
            Self::Cancelled => "badge-danger",
        }
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the order counts towards revenue.
    #[must_use]
    pub const fn counts_as_revenue(&self) -> bool {
        matches!(self, Self::Shipped | Self::Completed)
    }
}

/// Verification state of an uploaded payment proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Uploaded, not yet reviewed.
    #[default]
    WaitingVerification,
    /// Accepted by an admin.
    Valid,
    /// Marked invalid. Rejection deletes the record, so this only appears in
    /// legacy data.
    Invalid,
}

text_enum!(PaymentStatus, "payment status", {
    WaitingVerification => "waiting_verification",
    Valid => "valid",
    Invalid => "invalid",
});

impl PaymentStatus {
    /// Label shown next to the proof.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::WaitingVerification => "Awaiting review",
            Self::Valid => "Verified",
            Self::Invalid => "Invalid",
        }
    }
}

/// How the customer receives the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    /// Collected at an outlet.
    #[default]
    Pickup,
    /// Sent to an address.
    Delivery,
}

text_enum!(DeliveryType, "delivery type", {
    Pickup => "pickup",
    Delivery => "delivery",
});

impl DeliveryType {
    /// Human label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pickup => "Pickup at outlet",
            Self::Delivery => "Delivery",
        }
    }
}

/// Catalog category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    #[default]
    Cookies,
    Dessert,
}

text_enum!(ProductCategory, "product category", {
    Cookies => "cookies",
    Dessert => "dessert",
});

impl ProductCategory {
    /// Every category, in menu order.
    pub const ALL: [Self; 2] = [Self::Cookies, Self::Dessert];

    /// Human label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cookies => "Cookies",
            Self::Dessert => "Dessert",
        }
    }
}

/// Role of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// May enter the back-office.
    Admin,
    /// Regular account, no back-office access.
    User,
}

text_enum!(UserRole, "user role", {
    Admin => "admin",
    User => "user",
});
