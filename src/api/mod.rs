//! REST API client module for the brokerage service.
//!
//! This module provides the `ApiClient` for obtaining an OAuth-style bearer
//! token (trying client identifier candidates in order, since the service
//! rotates the valid one) and for fetching portfolio equity history with a
//! disk cache in front of the network.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
