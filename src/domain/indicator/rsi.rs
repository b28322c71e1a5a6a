//! RSI (Relative Strength Index).
//!
//! Per step: delta = P[i] - P[i-1], gain = max(delta, 0), loss = max(-delta, 0).
//! Position 0 has no predecessor and counts as a zero gain and zero loss.
//! Average gain and loss are plain means over the trailing n positions (no
//! Wilder smoothing), so each value depends only on its own window.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first (n-1) positions are `None`.

use crate::domain::error::MarketError;
use crate::domain::indicator::{IndicatorSeries, check_window};

pub fn rsi(prices: &[f64], window: usize) -> Result<IndicatorSeries, MarketError> {
    check_window(window)?;

    let mut gains = Vec::with_capacity(prices.len());
    let mut losses = Vec::with_capacity(prices.len());
    if !prices.is_empty() {
        gains.push(0.0);
        losses.push(0.0);
    }
    for pair in prices.windows(2) {
        let change = pair[1] - pair[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let values = (0..prices.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let start = i + 1 - window;
            let avg_gain = gains[start..=i].iter().sum::<f64>() / window as f64;
            let avg_loss = losses[start..=i].iter().sum::<f64>() / window as f64;
            Some(strength_index(avg_gain, avg_loss))
        })
        .collect();

    Ok(values)
}

fn strength_index(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rsi = 100.0 - (100.0 / (1.0 + avg_gain / avg_loss));
    rsi.clamp(0.0, 100.0)
}
