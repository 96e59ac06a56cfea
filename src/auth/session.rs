//! Shared HTTP session management.
//!
//! One `reqwest::Client` (a connection pool) is created lazily and reused
//! for the lifetime of its owner. Closing drops the pool; a later `get`
//! rebuilds it. The manager is owned by the API client rather than living
//! in a global, so every exit path of the owning scope releases it.

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Default)]
pub struct SessionManager {
    client: Option<Client>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the live session, creating one if none exists or the previous
    /// one was closed. Idempotent under repeated calls.
    pub fn get(&mut self) -> Result<&Client> {
        if self.client.is_none() {
            debug!("Creating HTTP session");
            let client = Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .context("Failed to build HTTP client")?;
            self.client = Some(client);
        }
        self.client.as_ref().context("HTTP session unavailable")
    }

    /// Close the session if open. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.client.take().is_some() {
            debug!("Closing HTTP session");
        }
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.close();
    }
}
