//! Domain models for the back-office.

pub mod admin_user;
pub mod dashboard;
pub mod form;
pub mod order;
pub mod outlet;
pub mod product;
pub mod session;

pub use admin_user::AdminUser;
pub use dashboard::DashboardStats;
pub use form::FormError;
pub use order::{AdminOrder, OrderLine, OrderSummary, Payment};
pub use outlet::{Outlet, OutletForm, OutletInput};
pub use product::{Product, ProductForm, ProductInput};
pub use session::{CurrentAdmin, keys as session_keys};
