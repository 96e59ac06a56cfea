//! Application configuration.
//!
//! Holds the upstream endpoints and the on-disk locations for the token
//! file and the response cache. Defaults point at the real service; tests
//! substitute a mock server URL and temp directories.

use std::path::PathBuf;

/// Base URL for the brokerage REST API (token + portfolio endpoints)
const API_BASE_URL: &str = "https://api.robinhood.com";

/// Base URL for the public web site (client identifier discovery)
const WEB_BASE_URL: &str = "https://robinhood.com";

/// Token file name in the user's home directory
const TOKEN_FILE: &str = ".equitydash_token.json";

/// Cache directory, relative to the working directory
const CACHE_DIR: &str = ".cache";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub web_base_url: String,
    pub token_file: PathBuf,
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        // Fall back to the working directory if the platform has no home
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            api_base_url: API_BASE_URL.to_string(),
            web_base_url: WEB_BASE_URL.to_string(),
            token_file: home.join(TOKEN_FILE),
            cache_dir: PathBuf::from(CACHE_DIR),
        }
    }
}
