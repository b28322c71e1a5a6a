//! Rolling standard deviation.
//!
//! Sample standard deviation (divides by n - 1) over the trailing n prices.
//! A window of one price has no spread and yields 0.
//! Warmup: first (n-1) positions are `None`.

use crate::domain::error::MarketError;
use crate::domain::indicator::{IndicatorSeries, check_window};

pub fn rolling_std(prices: &[f64], window: usize) -> Result<IndicatorSeries, MarketError> {
    check_window(window)?;

    let values = (0..prices.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            Some(sample_std(&prices[i + 1 - window..=i]))
        })
        .collect();

    Ok(values)
}

fn sample_std(window: &[f64]) -> f64 {
    if window.len() < 2 {
        return 0.0;
    }
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);
    variance.sqrt()
}
