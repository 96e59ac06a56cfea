//! Data models for portfolio equity history.
//!
//! - `Span`, `Interval`: typed request parameters matching the wire values
//! - `EquityPoint`, `EquityTable`: chronologically ordered equity series
//!   with normalization and linear-trend helpers for presentation layers

pub mod portfolio;

pub use portfolio::{EquityPoint, EquityTable, Interval, Span};
