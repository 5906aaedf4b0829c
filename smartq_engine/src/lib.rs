//! SmartQ Order Flow Engine
//!
//! The engine contains the core logic for the SmartQ campus food-ordering platform. It is
//! transport-agnostic: the HTTP server, the progression worker and any future kiosk frontends all drive
//! the same APIs.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). You should never need to access the database
//!    directly. Instead, use the public API provided by the engine. The exception is the data types used in
//!    the database. These are defined in the `db_types` module and are public.
//! 2. The engine public API ([`mod@sq_api`]). This provides the public-facing functionality of the order
//!    flow: order creation with server-side price verification, payment settlement, pickup verification, the
//!    kitchen progression policy, authentication and the catalog. Specific backends need to implement the
//!    traits in the [`mod@traits`] module in order to act as a backend for the SmartQ server.
//!
//! The engine also provides a set of events that can be subscribed to. These events are emitted when certain
//! actions occur, for example when an order changes status. A simple actor framework is used so that you can
//! easily hook into these events and perform custom actions, and the [`events::OrderUpdateHub`] fans status
//! changes out to live subscribers such as SSE streams.
pub mod db_types;
pub mod events;
pub mod helpers;
mod sq_api;
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use sq_api::{
    auth_api::{hash_password, verify_password, AuthApi},
    catalog_api::CatalogApi,
    order_flow_api::{OrderFlowApi, TOTAL_TOLERANCE_CENTS},
    order_objects,
    progress,
};
pub use sqlite::SqliteDatabase;
pub use traits::{AuthApiError, CatalogApiError, OrderFlowError};
