//! API client for the brokerage REST API.
//!
//! This module provides the `ApiClient` struct, which owns the whole
//! authentication state: the HTTP session, the persisted token store, the
//! in-memory token, and the client identifier candidates. Callers hold one
//! client and use `ensure_token` / `equity_table`; nothing touches the
//! token file or the cache directly.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::auth::{ClientIdResolver, Credentials, SessionManager, TokenRecord, TokenStore};
use crate::cache::CacheManager;
use crate::config::Config;
use crate::models::{EquityTable, Interval, Span};

use super::error::{is_invalid_client, ApiError};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

pub struct ApiClient {
    api_base_url: String,
    web_base_url: String,
    session: SessionManager,
    token_store: TokenStore,
    resolver: ClientIdResolver,
    cache: CacheManager,
    token: Option<TokenRecord>,
}

impl ApiClient {
    pub fn new(config: Config) -> Result<Self> {
        let cache = CacheManager::new(config.cache_dir)?;
        Ok(Self {
            api_base_url: config.api_base_url,
            web_base_url: config.web_base_url,
            session: SessionManager::new(),
            token_store: TokenStore::new(config.token_file),
            resolver: ClientIdResolver::new(),
            cache,
            token: None,
        })
    }

    /// Replace the client identifier candidate list.
    pub fn set_client_ids(&mut self, ids: Vec<String>) {
        self.resolver = ClientIdResolver::with_candidates(ids);
    }

    /// Return a valid bearer token, logging in only when necessary. This is
    /// the entry point other components should use; it hides the difference
    /// between first-ever login and renewal.
    pub async fn ensure_token(&mut self) -> Result<String> {
        if let Some(ref record) = self.token {
            if !record.is_expired() {
                return Ok(record.access_token.clone());
            }
            debug!("In-memory token has expired");
            self.token = None;
        }
        self.login().await
    }

    /// Obtain a bearer token: reuse a persisted one when valid, otherwise
    /// authenticate against the token endpoint, trying each client
    /// identifier candidate in order.
    pub async fn login(&mut self) -> Result<String> {
        if let Some(ref record) = self.token {
            if !record.is_expired() {
                return Ok(record.access_token.clone());
            }
        }
        if let Some(record) = self.token_store.load() {
            debug!("Reusing persisted token");
            let token = record.access_token.clone();
            self.token = Some(record);
            return Ok(token);
        }

        let credentials = Credentials::from_env_or_prompt()?;

        // Best-effort: a freshly scraped identifier goes to the front of
        // the candidate list. Total failure falls through to the static
        // candidates.
        let client = self.session.get()?.clone();
        if let Some(id) = self.resolver.discover(&client, &self.web_base_url).await {
            info!(id = %id, "Discovered client identifier");
            self.resolver.prepend(id);
        }

        let url = format!("{}/oauth2/token/", self.api_base_url);
        let candidates = self.resolver.candidates().to_vec();
        let mut last_error: Option<ApiError> = None;

        for client_id in &candidates {
            debug!(client_id = %client_id, "Attempting token request");
            let mut form: Vec<(&str, &str)> = vec![
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
                ("grant_type", "password"),
                ("scope", "internal"),
                ("client_id", client_id.as_str()),
            ];
            if let Some(ref mfa) = credentials.mfa_code {
                form.push(("mfa_code", mfa.as_str()));
            }

            let response = client
                .post(&url)
                .form(&form)
                .send()
                .await
                .context("Failed to send token request")?;

            let status = response.status();
            if status.is_success() {
                let parsed: TokenResponse = response
                    .json()
                    .await
                    .context("Failed to parse token response")?;
                let record = TokenRecord::new(parsed.access_token, parsed.expires_in);
                self.token_store.save(&record)?;
                let token = record.access_token.clone();
                self.token = Some(record);
                info!(client_id = %client_id, "Authenticated");
                return Ok(token);
            }

            let body = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                if is_invalid_client(&body) {
                    // Stale identifier: keep trying the remaining candidates
                    warn!(client_id = %client_id, "Client identifier rejected");
                    last_error = Some(ApiError::upstream(status, &body));
                    continue;
                }
                // Bad credentials or verification required: trying other
                // identifiers cannot help
                return Err(ApiError::CredentialsInvalid(ApiError::truncate_body(&body)).into());
            }

            warn!(client_id = %client_id, status = %status, "Token request failed");
            last_error = Some(ApiError::upstream(status, &body));
        }

        let last = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no candidates attempted".to_string());
        Err(ApiError::ClientIdsExhausted(last).into())
    }

    /// Fetch the raw equity history payload, serving from the disk cache
    /// while fresh unless `refresh` forces the network.
    pub async fn fetch_history(
        &mut self,
        span: Span,
        interval: Interval,
        refresh: bool,
    ) -> Result<String> {
        let token = self.ensure_token().await?;

        if !refresh {
            if let Some(payload) = self.cache.load(span, interval) {
                debug!(span = %span, interval = %interval, "Serving history from cache");
                return Ok(payload);
            }
        }

        let url = format!(
            "{}/portfolios/historicals/?span={}&interval={}",
            self.api_base_url, span, interval
        );
        let client = self.session.get()?.clone();
        let response = client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .context("Failed to send history request")?;

        let status = response.status();
        let body = response.text().await.context("Failed to read history response")?;
        if !status.is_success() {
            return Err(ApiError::upstream(status, &body).into());
        }

        self.cache.save(span, interval, &body)?;
        Ok(body)
    }

    /// Fetch the history and parse it into a chronologically ordered table.
    /// An empty source list yields an empty table.
    pub async fn equity_table(
        &mut self,
        span: Span,
        interval: Interval,
        refresh: bool,
    ) -> Result<EquityTable> {
        let raw = self.fetch_history(span, interval, refresh).await?;
        EquityTable::from_response(&raw)
    }

    /// Drop the in-memory token, remove the persisted one, and close the
    /// session. The session is recreated on the next request if needed.
    pub fn logout(&mut self) -> Result<()> {
        self.token = None;
        self.token_store.clear()?;
        self.session.close();
        Ok(())
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }
}
