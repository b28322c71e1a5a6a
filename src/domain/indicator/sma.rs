//! Simple moving average.
//!
//! SMA(n)[i] = sum(P[i-n+1..=i]) / n
//! Warmup: first (n-1) positions are `None`.

use crate::domain::error::MarketError;
use crate::domain::indicator::{IndicatorSeries, check_window};

pub fn moving_average(prices: &[f64], window: usize) -> Result<IndicatorSeries, MarketError> {
    check_window(window)?;

    let values = (0..prices.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &prices[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect();

    Ok(values)
}
