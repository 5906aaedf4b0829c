//! # Database management and control.
//!
//! This module provides the interface contracts that order-flow database *backends* must implement.
//!
//! ## Traits
//! * [`OrderManagement`] defines the order lifecycle behaviour: inserting orders, status transitions, payment
//!   settlement bookkeeping and the queries the progression worker relies on.
//! * [`CatalogManagement`] provides read access to vendors and their menus. Menu prices fetched through this
//!   trait are the only prices the engine ever trusts.
//! * [`UserManagement`] defines behaviour for registering and looking up user accounts.
mod catalog_management;
mod order_management;
mod user_management;

pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use order_management::{OrderFlowError, OrderManagement};
pub use user_management::{AuthApiError, UserManagement};
