//! Bollinger Bands.
//!
//! - Middle: SMA(n)
//! - Upper: Middle + (k × StdDev(n))
//! - Lower: Middle - (k × StdDev(n))
//!
//! StdDev is the sample standard deviation from [`rolling_std`].
//! Default parameters: n = 20, k = 2.0.
//! Warmup: first (n-1) positions are `None` in every band.

use crate::domain::error::MarketError;
use crate::domain::indicator::{IndicatorSeries, moving_average, rolling_std};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BollingerBands {
    pub upper: IndicatorSeries,
    pub middle: IndicatorSeries,
    pub lower: IndicatorSeries,
}

pub fn bollinger_bands(
    prices: &[f64],
    window: usize,
    num_std: f64,
) -> Result<BollingerBands, MarketError> {
    if !num_std.is_finite() || num_std < 0.0 {
        return Err(MarketError::InvalidMultiplier { value: num_std });
    }
    let middle = moving_average(prices, window)?;
    let spread = rolling_std(prices, window)?;

    let (upper, lower): (IndicatorSeries, IndicatorSeries) = middle
        .iter()
        .zip(&spread)
        .map(|(mid, std)| match (mid, std) {
            (Some(m), Some(s)) => (Some(m + num_std * s), Some(m - num_std * s)),
            _ => (None, None),
        })
        .unzip();

    Ok(BollingerBands {
        upper,
        middle,
        lower,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bollinger_warmup() {
        let bands = bollinger_bands(&[10.0, 20.0, 30.0, 40.0, 50.0], 3, 2.0).unwrap();
        for series in [&bands.upper, &bands.middle, &bands.lower] {
            assert!(series[0].is_none());
            assert!(series[1].is_none());
            assert!(series[2..].iter().all(Option::is_some));
        }
    }

    #[test]
    fn bollinger_constant_values() {
        let bands = bollinger_bands(&[100.0; 5], 3, 2.0).unwrap();
        assert_eq!(bands.upper[2], Some(100.0));
        assert_eq!(bands.middle[2], Some(100.0));
        assert_eq!(bands.lower[2], Some(100.0));
    }

    #[test]
    fn bollinger_basic_calculation() {
        let bands = bollinger_bands(&[10.0, 20.0, 30.0], 3, 2.0).unwrap();
        // sample std of 10, 20, 30 is 10
        assert_relative_eq!(bands.middle[2].unwrap(), 20.0, epsilon = 1e-10);
        assert_relative_eq!(bands.upper[2].unwrap(), 40.0, epsilon = 1e-10);
        assert_relative_eq!(bands.lower[2].unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn bollinger_multiplier_variations() {
        let bands = bollinger_bands(&[10.0, 20.0, 30.0], 3, 1.0).unwrap();
        assert_relative_eq!(bands.upper[2].unwrap(), 30.0, epsilon = 1e-10);
        assert_relative_eq!(bands.lower[2].unwrap(), 10.0, epsilon = 1e-10);
    }

    #[test]
    fn bollinger_symmetry() {
        let bands = bollinger_bands(&[3.0, 7.0, 4.0, 9.0, 1.0], 4, 2.0).unwrap();
        for i in 3..5 {
            let mid = bands.middle[i].unwrap();
            let up = bands.upper[i].unwrap() - mid;
            let down = mid - bands.lower[i].unwrap();
            assert_relative_eq!(up, down, epsilon = 1e-10);
        }
    }

    #[test]
    fn bollinger_rejects_negative_multiplier() {
        assert!(matches!(
            bollinger_bands(&[1.0, 2.0], 2, -1.0),
            Err(MarketError::InvalidMultiplier { .. })
        ));
    }

    #[test]
    fn bollinger_rejects_zero_window() {
        assert!(matches!(
            bollinger_bands(&[1.0, 2.0], 0, 2.0),
            Err(MarketError::InvalidWindow { window: 0 })
        ));
    }
}
