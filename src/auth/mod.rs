//! Authentication module for tokens, credentials, and the HTTP session.
//!
//! This module provides:
//! - `TokenStore` / `TokenRecord`: bearer token persisted to disk with expiry
//! - `Credentials`: login credentials from environment or interactive prompt
//! - `ClientIdResolver`: ordered client identifier candidates with
//!   best-effort discovery from the public web site
//! - `SessionManager`: lazily created, reusable HTTP client session

pub mod client_id;
pub mod credentials;
pub mod session;
pub mod token;

pub use client_id::ClientIdResolver;
pub use credentials::Credentials;
pub use session::SessionManager;
pub use token::{TokenRecord, TokenStore};
