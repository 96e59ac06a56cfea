//! Persisted bearer token store.
//!
//! A single `TokenRecord` lives in one JSON file, overwritten wholesale on
//! each renewal. A missing, malformed, or expired file is the expected
//! empty state, never an error.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Bearer token plus absolute expiry.
/// Wire format: `{"access_token": string, "expires_at": epoch seconds}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn new(access_token: String, expires_in_secs: i64) -> Self {
        Self {
            access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in_secs),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the persisted record, if present and unexpired.
    pub fn load(&self) -> Option<TokenRecord> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return None,
        };
        let record: TokenRecord = match serde_json::from_str(&contents) {
            Ok(r) => r,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Ignoring malformed token file");
                return None;
            }
        };
        if record.is_expired() {
            debug!(path = %self.path.display(), "Persisted token has expired");
            return None;
        }
        Some(record)
    }

    /// Save the record: write to a temp file with owner-only permissions,
    /// then rename into place so a concurrent reader never sees a partial
    /// write.
    pub fn save(&self, record: &TokenRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(record)?;
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write token file {}", tmp.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600))
                .context("Failed to restrict token file permissions")?;
        }

        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to move token file into {}", self.path.display()))?;
        Ok(())
    }

    /// Remove the persisted record, if any.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> TokenStore {
        TokenStore::new(dir.path().join("token.json"))
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let record = TokenRecord::new("tok".to_string(), 60);
        store.save(&record).unwrap();

        let loaded = store.load().expect("record should load");
        assert_eq!(loaded.access_token, "tok");
        assert!(!loaded.is_expired());
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().is_none());
    }

    #[test]
    fn test_malformed_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "not json at all").unwrap();
        assert!(TokenStore::new(path).load().is_none());
    }

    #[test]
    fn test_expired_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let record = TokenRecord::new("tok".to_string(), -5);
        store.save(&record).unwrap();
        assert!(store.load().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let store = TokenStore::new(path.clone());
        store.save(&TokenRecord::new("tok".to_string(), 60)).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&TokenRecord::new("tok".to_string(), 60)).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
        // Clearing again is a no-op
        store.clear().unwrap();
    }
}
