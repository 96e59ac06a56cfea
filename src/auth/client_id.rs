//! Client identifier candidates and best-effort discovery.
//!
//! The upstream OAuth endpoint requires an application-identifying
//! `client_id` that the service rotates without notice. We keep an ordered
//! list of historically observed values and, before authenticating, try to
//! scrape the current one out of the public web pages. Discovery may fail
//! entirely (markup changes invalidate every pattern at once); it only ever
//! logs and falls back to the static list.

use regex::Regex;
use reqwest::Client;
use tracing::{debug, warn};

/// Historically observed client identifiers, most recently valid first.
const DEFAULT_CLIENT_IDS: &[&str] = &[
    "c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS",
    "c82SH0WZTsabGXGGVaTzKqHLHiNTSKqW",
];

/// Known prefix shared by recent identifiers
const KNOWN_ID_PREFIX: &str = "c82SH0WZ";

/// Inline identifiers shorter than this are config noise, not client ids
const MIN_INLINE_ID_LEN: usize = 21;

/// Maximum number of script bundles to scan per discovery attempt
const MAX_BUNDLES: usize = 2;

pub struct ClientIdResolver {
    candidates: Vec<String>,
}

impl Default for ClientIdResolver {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CLIENT_IDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ClientIdResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a resolver with an explicit candidate list instead of the
    /// historical defaults.
    pub fn with_candidates(candidates: Vec<String>) -> Self {
        Self { candidates }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Put an identifier at the front of the candidate list, deduplicated,
    /// so it is tried first on the next authentication attempt.
    pub fn prepend(&mut self, id: String) {
        self.candidates.retain(|c| c != &id);
        self.candidates.insert(0, id);
    }

    /// Try to scrape the current identifier from the public site. Returns
    /// `None` on any network or parse failure.
    pub async fn discover(&self, client: &Client, web_base: &str) -> Option<String> {
        // Strategy 1: inline config on the login page
        match fetch_text(client, &format!("{}/login", web_base)).await {
            Some(html) => {
                if let Some(id) = match_inline_id(&html) {
                    debug!(id = %id, "Discovered client id on login page");
                    return Some(id);
                }
            }
            None => warn!("Login page discovery failed"),
        }

        // Strategy 2: script bundles linked from the main page
        let html = match fetch_text(client, web_base).await {
            Some(html) => html,
            None => {
                warn!("Main page discovery failed");
                return None;
            }
        };

        for url in script_urls(&html, web_base).into_iter().take(MAX_BUNDLES) {
            if let Some(js) = fetch_text(client, &url).await {
                if let Some(id) = match_bundle_id(&js) {
                    debug!(id = %id, url = %url, "Discovered client id in script bundle");
                    return Some(id);
                }
            }
        }

        debug!("Client id discovery found nothing");
        None
    }
}

async fn fetch_text(client: &Client, url: &str) -> Option<String> {
    match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => resp.text().await.ok(),
        Ok(resp) => {
            debug!(url = %url, status = %resp.status(), "Discovery fetch returned non-success");
            None
        }
        Err(e) => {
            debug!(url = %url, error = %e, "Discovery fetch failed");
            None
        }
    }
}

/// Match `client_id`-shaped assignments embedded in page markup.
fn match_inline_id(content: &str) -> Option<String> {
    let patterns = [
        r#"client_id["']\s*:\s*["']([^"']+)["']"#,
        r#""client_id"\s*:\s*"([^"]+)""#,
        r#"clientId["']\s*:\s*["']([^"']+)["']"#,
    ];
    for pattern in patterns {
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(_) => continue,
        };
        if let Some(caps) = re.captures(content) {
            let id = caps.get(1)?.as_str();
            if id.len() >= MIN_INLINE_ID_LEN {
                return Some(id.to_string());
            }
        }
    }
    None
}

/// Extract app/main/bundle script URLs from page markup, absolute against
/// the site base.
fn script_urls(html: &str, web_base: &str) -> Vec<String> {
    let re = match Regex::new(
        r#"(?i)<script[^>]+src=["']([^"']*(?:app|main|bundle)[^"']*\.js[^"']*)["']"#,
    ) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    re.captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| {
            let src = m.as_str();
            if src.starts_with("http") {
                src.to_string()
            } else {
                format!("{}{}", web_base, src)
            }
        })
        .collect()
}

/// Scan a script bundle for identifier-shaped string literals.
fn match_bundle_id(js: &str) -> Option<String> {
    let re = Regex::new(r#"["']([a-zA-Z0-9]{32,})["']"#).ok()?;
    for caps in re.captures_iter(js) {
        let candidate = caps.get(1)?.as_str();
        if candidate.starts_with(KNOWN_ID_PREFIX) || candidate.len() == 32 {
            return Some(candidate.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepend_moves_to_front_and_dedupes() {
        let mut resolver = ClientIdResolver::new();
        let existing = resolver.candidates()[1].clone();
        resolver.prepend(existing.clone());
        assert_eq!(resolver.candidates()[0], existing);
        assert_eq!(resolver.candidates().len(), DEFAULT_CLIENT_IDS.len());

        resolver.prepend("freshly-discovered-identifier-value".to_string());
        assert_eq!(
            resolver.candidates()[0],
            "freshly-discovered-identifier-value"
        );
        assert_eq!(resolver.candidates().len(), DEFAULT_CLIENT_IDS.len() + 1);
    }

    #[test]
    fn test_match_inline_id() {
        let html = r#"<script>window.cfg = {"client_id": "c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS"}</script>"#;
        assert_eq!(
            match_inline_id(html).as_deref(),
            Some("c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS")
        );
    }

    #[test]
    fn test_match_inline_id_rejects_short_values() {
        let html = r#"{"client_id": "short"}"#;
        assert!(match_inline_id(html).is_none());
    }

    #[test]
    fn test_script_urls_resolved_against_base() {
        let html = r#"<script src="/static/app.1234.js"></script>
                      <script src="https://cdn.example.com/main.js"></script>
                      <script src="/static/vendor.js"></script>"#;
        let urls = script_urls(html, "https://example.com");
        assert_eq!(
            urls,
            vec![
                "https://example.com/static/app.1234.js".to_string(),
                "https://cdn.example.com/main.js".to_string(),
            ]
        );
    }

    #[test]
    fn test_match_bundle_id_prefers_known_prefix() {
        let js = r#"var a = "0123456789abcdef"; var b = "c82SH0WZTsabGXGGVaTzKqHLHiNTSKqW";"#;
        assert_eq!(
            match_bundle_id(js).as_deref(),
            Some("c82SH0WZTsabGXGGVaTzKqHLHiNTSKqW")
        );
    }

    #[test]
    fn test_match_bundle_id_accepts_exact_32() {
        let js = r#"token: "abcdefghijklmnopqrstuvwxyz012345""#;
        assert_eq!(
            match_bundle_id(js).as_deref(),
            Some("abcdefghijklmnopqrstuvwxyz012345")
        );
    }
}
