//! # HTTP Server Module
//!
//! Thin transport shell over [`crate::service::LogService`].
//!
//! # Endpoints
//!
//! - `POST /` - Append `{"data": string}`
//! - `GET /` - Newest record, unverified
//! - `GET /verify` - Latest verified record with message
//! - `GET /health` - Health check
//! - `GET /metrics` - Counters

pub mod config;
pub mod log_routes;
pub mod observability_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use log_routes::{ErrorResponse, RecordResponse, VerifyResponse, INTERNAL_ERROR_MESSAGE};
pub use server::HttpServer;
