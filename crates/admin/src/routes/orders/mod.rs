//! Order management route handlers.
//!
//! - `list` - order table
//! - `detail` - single order with proof image and action buttons
//! - `actions` - status buttons and payment review

pub mod actions;
pub mod detail;
pub mod list;
