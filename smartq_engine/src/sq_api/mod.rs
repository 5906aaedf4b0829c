//! # Order flow engine public API
//!
//! The `sq_api` module exposes the programmatic API for the order flow engine.
//! The API is modular, so that clients of the API can pick and choose the functionality they want.
//! Different parts (e.g. auth and orders) could even be configured on different machines, or use Sqlite for one
//! and Postgres for the other.
//!
//! * [`auth_api`] manages user registration, credential checks and profile lookups.
//! * [`catalog_api`] provides read access to vendors and menus.
//! * [`order_flow_api`] is the primary API for creating orders, settling payments, verifying pickups and
//!   advancing orders through the kitchen.
//! * [`progress`] holds the kitchen policy used by the progression worker.
//!
//! # API usage
//!
//! The pattern for using all the APIs is the same. An API instance is created by supplying a database backend that
//! implements the specific backend traits required by the API.
//!
//! ```rust,ignore
//! use smartq_engine::{OrderFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! // SqliteDatabase implements OrderManagement and CatalogManagement
//! let api = OrderFlowApi::new(db, producers);
//! let order = api.fetch_order(&order_id, &user_id).await?;
//! ```

pub mod auth_api;
pub mod catalog_api;
pub mod order_flow_api;
pub mod order_objects;
pub mod progress;
