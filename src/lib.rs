//! equitydash - portfolio equity dashboard core.
//!
//! Authenticates against a brokerage-style HTTP API (token endpoint with a
//! rotating client identifier), persists the bearer token, caches history
//! responses on disk, and exposes equity history as a typed table.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use models::{EquityTable, Interval, Span};
