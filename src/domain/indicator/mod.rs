//! Technical indicators over an ordered price sequence.
//!
//! Every function is pure and returns one entry per input price; `None`
//! marks warmup positions where the trailing window is not yet full.
//! - `sma`: trailing arithmetic mean
//! - `rsi`: relative strength index with simple (non-Wilder) averaging
//! - `stddev`: trailing sample standard deviation
//! - `bollinger`: mean ± k standard deviations

pub mod bollinger;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use bollinger::{BollingerBands, bollinger_bands};
pub use rsi::rsi;
pub use sma::moving_average;
pub use stddev::rolling_std;

use crate::domain::error::MarketError;
use std::fmt;

/// One value per input position, `None` during warmup.
pub type IndicatorSeries = Vec<Option<f64>>;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const DEFAULT_BOLLINGER_STD: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Stddev(usize),
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

pub(crate) fn check_window(window: usize) -> Result<(), MarketError> {
    if window == 0 {
        return Err(MarketError::InvalidWindow { window });
    }
    Ok(())
}
