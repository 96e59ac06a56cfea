//! Local response cache.
//!
//! Raw history responses are stored verbatim, one JSON file per
//! `(span, interval)` pair, and served instead of the network while fresh.

pub mod manager;

pub use manager::CacheManager;
