//! # SmartQ server
//! This module hosts the HTTP server for the SmartQ campus food-ordering platform. It is responsible for:
//! * Authenticating users and issuing JWT access tokens.
//! * Serving the vendor and menu catalog.
//! * Taking orders, settling payments (directly or through the gateway webhook), verifying pickups and
//!   cancelling orders.
//! * Streaming live order status updates over server-sent events.
//! * Running the background kitchen progression worker.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.

pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod progress_worker;
pub mod routes;
pub mod server;
pub mod sse;

#[cfg(test)]
mod endpoint_tests;
