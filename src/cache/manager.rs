//! Disk cache for raw history responses.
//!
//! Each `(span, interval)` pair maps to one file holding the upstream
//! payload verbatim. The file's modification time is the freshness proxy:
//! an entry older than the freshness window is ignored. There is no other
//! consistency check.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::{Interval, Span};

/// Cached responses are stale after 24 hours
const FRESHNESS_WINDOW_HOURS: u64 = 24;

pub struct CacheManager {
    dir: PathBuf,
    max_age: Duration,
}

impl CacheManager {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
        Ok(Self {
            dir,
            max_age: Duration::from_secs(FRESHNESS_WINDOW_HOURS * 3600),
        })
    }

    /// Override the freshness window (used by tests to force staleness)
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    fn entry_path(&self, span: Span, interval: Interval) -> PathBuf {
        self.dir
            .join(format!("portfolio_{}_{}.json", span, interval))
    }

    /// Return the cached payload if present and fresh. Unreadable metadata
    /// or contents are treated as a miss.
    pub fn load(&self, span: Span, interval: Interval) -> Option<String> {
        let path = self.entry_path(span, interval);
        let modified = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        // Clock skew can put the mtime in the future; treat that as age zero
        let age = modified.elapsed().unwrap_or(Duration::ZERO);
        if age >= self.max_age {
            debug!(path = %path.display(), age_secs = age.as_secs(), "Cache entry is stale");
            return None;
        }
        std::fs::read_to_string(&path).ok()
    }

    /// Persist the raw payload, overwriting any prior entry for the key.
    pub fn save(&self, span: Span, interval: Interval, payload: &str) -> Result<()> {
        let path = self.entry_path(span, interval);
        std::fs::write(&path, payload)
            .with_context(|| format!("Failed to write cache file {}", path.display()))?;
        Ok(())
    }
}
