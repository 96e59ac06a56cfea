use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Time range of a history request, using the upstream wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Span {
    Day,
    Week,
    Month,
    ThreeMonth,
    Year,
    FiveYear,
    All,
}

impl Span {
    pub fn as_str(&self) -> &'static str {
        match self {
            Span::Day => "day",
            Span::Week => "week",
            Span::Month => "month",
            Span::ThreeMonth => "3month",
            Span::Year => "year",
            Span::FiveYear => "5year",
            Span::All => "all",
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Span {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(Span::Day),
            "week" => Ok(Span::Week),
            "month" => Ok(Span::Month),
            "3month" => Ok(Span::ThreeMonth),
            "year" => Ok(Span::Year),
            "5year" => Ok(Span::FiveYear),
            "all" => Ok(Span::All),
            other => Err(anyhow::anyhow!("Unknown span: {}", other)),
        }
    }
}

/// Sampling interval of a history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interval {
    FiveMinute,
    TenMinute,
    Hour,
    Day,
    Week,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::FiveMinute => "5minute",
            Interval::TenMinute => "10minute",
            Interval::Hour => "hour",
            Interval::Day => "day",
            Interval::Week => "week",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "5minute" => Ok(Interval::FiveMinute),
            "10minute" => Ok(Interval::TenMinute),
            "hour" => Ok(Interval::Hour),
            "day" => Ok(Interval::Day),
            "week" => Ok(Interval::Week),
            other => Err(anyhow::anyhow!("Unknown interval: {}", other)),
        }
    }
}

/// The history payload carries its records under one of two key names
/// depending on the endpoint version.
#[derive(Debug, Deserialize)]
struct HistoricalsResponse {
    #[serde(default, alias = "equity_historicals")]
    historicals: Vec<RawEquityPoint>,
}

#[derive(Debug, Deserialize)]
struct RawEquityPoint {
    begins_at: String,
    equity: String,
}

/// One equity observation.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub begins_at: DateTime<Utc>,
    pub equity: f64,
}

/// Chronologically ordered equity series. An empty table is a valid result
/// (the account may simply have no history for the requested window).
#[derive(Debug, Clone, Default)]
pub struct EquityTable {
    points: Vec<EquityPoint>,
}

impl EquityTable {
    /// Parse a raw history response into an ordered table.
    pub fn from_response(raw: &str) -> Result<Self> {
        let response: HistoricalsResponse =
            serde_json::from_str(raw).context("Failed to parse history response")?;

        let mut points = Vec::with_capacity(response.historicals.len());
        for raw_point in &response.historicals {
            let begins_at = DateTime::parse_from_rfc3339(&raw_point.begins_at)
                .with_context(|| format!("Bad timestamp: {}", raw_point.begins_at))?
                .with_timezone(&Utc);
            let equity: f64 = raw_point
                .equity
                .parse()
                .with_context(|| format!("Bad equity value: {}", raw_point.equity))?;
            points.push(EquityPoint { begins_at, equity });
        }
        points.sort_by_key(|p| p.begins_at);

        Ok(Self { points })
    }

    pub fn points(&self) -> &[EquityPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&EquityPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&EquityPoint> {
        self.points.last()
    }

    /// Series indexed to 100 at the first point, for comparing against a
    /// market index on the same scale. Empty if the table is empty or the
    /// first observation is zero.
    pub fn normalized(&self) -> Vec<(DateTime<Utc>, f64)> {
        let base = match self.points.first() {
            Some(p) if p.equity != 0.0 => p.equity,
            _ => return Vec::new(),
        };
        self.points
            .iter()
            .map(|p| (p.begins_at, p.equity / base * 100.0))
            .collect()
    }

    /// Least-squares linear trend `(slope, intercept)` over the point index,
    /// for a simple forecast line. `None` with fewer than two points.
    pub fn linear_trend(&self) -> Option<(f64, f64)> {
        let n = self.points.len();
        if n < 2 {
            return None;
        }
        let n_f = n as f64;
        let sum_x: f64 = (0..n).map(|i| i as f64).sum();
        let sum_y: f64 = self.points.iter().map(|p| p.equity).sum();
        let sum_xy: f64 = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| i as f64 * p.equity)
            .sum();
        let sum_xx: f64 = (0..n).map(|i| (i as f64) * (i as f64)).sum();

        let denom = n_f * sum_xx - sum_x * sum_x;
        if denom == 0.0 {
            return None;
        }
        let slope = (n_f * sum_xy - sum_x * sum_y) / denom;
        let intercept = (sum_y - slope * sum_x) / n_f;
        Some((slope, intercept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_historicals_key() {
        let raw = r#"{"historicals": [
            {"begins_at": "2020-01-02T00:00:00Z", "equity": "101.5"},
            {"begins_at": "2020-01-01T00:00:00Z", "equity": "100.0"}
        ]}"#;
        let table = EquityTable::from_response(raw).unwrap();
        assert_eq!(table.len(), 2);
        // Sorted chronologically regardless of response order
        assert_eq!(table.first().unwrap().equity, 100.0);
        assert_eq!(table.last().unwrap().equity, 101.5);
        let equities: Vec<f64> = table.points().iter().map(|p| p.equity).collect();
        assert_eq!(equities, vec![100.0, 101.5]);
    }

    #[test]
    fn test_parse_equity_historicals_key() {
        let raw = r#"{"equity_historicals": [
            {"begins_at": "2020-01-01T00:00:00Z", "equity": "100.0"}
        ]}"#;
        let table = EquityTable::from_response(raw).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_empty_history_yields_empty_table() {
        let table = EquityTable::from_response(r#"{"historicals": []}"#).unwrap();
        assert!(table.is_empty());
        assert!(table.normalized().is_empty());
        assert!(table.linear_trend().is_none());
    }

    #[test]
    fn test_missing_list_yields_empty_table() {
        let table = EquityTable::from_response("{}").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_bad_equity_value_is_an_error() {
        let raw = r#"{"historicals": [
            {"begins_at": "2020-01-01T00:00:00Z", "equity": "not-a-number"}
        ]}"#;
        assert!(EquityTable::from_response(raw).is_err());
    }

    #[test]
    fn test_normalized_indexes_to_100() {
        let raw = r#"{"historicals": [
            {"begins_at": "2020-01-01T00:00:00Z", "equity": "200.0"},
            {"begins_at": "2020-01-02T00:00:00Z", "equity": "250.0"}
        ]}"#;
        let table = EquityTable::from_response(raw).unwrap();
        let normalized = table.normalized();
        assert_eq!(normalized[0].1, 100.0);
        assert_eq!(normalized[1].1, 125.0);
    }

    #[test]
    fn test_linear_trend_on_exact_line() {
        let raw = r#"{"historicals": [
            {"begins_at": "2020-01-01T00:00:00Z", "equity": "10.0"},
            {"begins_at": "2020-01-02T00:00:00Z", "equity": "12.0"},
            {"begins_at": "2020-01-03T00:00:00Z", "equity": "14.0"}
        ]}"#;
        let table = EquityTable::from_response(raw).unwrap();
        let (slope, intercept) = table.linear_trend().unwrap();
        assert!((slope - 2.0).abs() < 1e-9);
        assert!((intercept - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_span_interval_wire_values() {
        assert_eq!(Span::ThreeMonth.as_str(), "3month");
        assert_eq!(Interval::FiveMinute.as_str(), "5minute");
        assert_eq!("5year".parse::<Span>().unwrap(), Span::FiveYear);
        assert_eq!("hour".parse::<Interval>().unwrap(), Interval::Hour);
        assert!("fortnight".parse::<Span>().is_err());
    }
}
