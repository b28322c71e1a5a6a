//! Threshold alerts over live quotes.

use crate::domain::error::MarketError;
use crate::domain::live_quote::CurrentQuote;
use std::fmt;
use tracing::debug;

pub const DEFAULT_ALERT_THRESHOLD: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AlertSeverity {
    /// Move above the threshold to the upside.
    Positive,
    /// Move above the threshold to the downside.
    Negative,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Positive => f.write_str("positive"),
            AlertSeverity::Negative => f.write_str("negative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AlertRecord {
    pub symbol: String,
    pub severity: AlertSeverity,
    /// Signed change percent that triggered the alert.
    pub magnitude: f64,
}

/// One record per quote whose |change| strictly exceeds `threshold_pct`,
/// in input order.
pub fn evaluate(
    quotes: &[CurrentQuote],
    threshold_pct: f64,
) -> Result<Vec<AlertRecord>, MarketError> {
    if !threshold_pct.is_finite() || threshold_pct < 0.0 {
        return Err(MarketError::InvalidThreshold {
            value: threshold_pct,
        });
    }

    let alerts: Vec<AlertRecord> = quotes
        .iter()
        .filter(|q| q.change_pct.abs() > threshold_pct)
        .map(|q| AlertRecord {
            symbol: q.symbol.clone(),
            severity: if q.change_pct > 0.0 {
                AlertSeverity::Positive
            } else {
                AlertSeverity::Negative
            },
            magnitude: q.change_pct,
        })
        .collect();

    debug!(threshold_pct, alerts = alerts.len(), "evaluated alerts");
    Ok(alerts)
}
