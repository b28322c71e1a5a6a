//! Per-instrument indicator bundle for the technical-analysis view.

use crate::domain::error::MarketError;
use crate::domain::history::HistoricalDataset;
use crate::domain::indicator::{
    BollingerBands, DEFAULT_BOLLINGER_PERIOD, DEFAULT_BOLLINGER_STD, DEFAULT_RSI_PERIOD,
    IndicatorSeries, IndicatorType, bollinger_bands, check_window, moving_average, rsi,
};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSettings {
    pub ma_short: usize,
    pub ma_long: usize,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_std: f64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            ma_short: 20,
            ma_long: 50,
            rsi_period: DEFAULT_RSI_PERIOD,
            bollinger_period: DEFAULT_BOLLINGER_PERIOD,
            bollinger_std: DEFAULT_BOLLINGER_STD,
        }
    }
}

impl IndicatorSettings {
    pub fn validate(&self) -> Result<(), MarketError> {
        check_window(self.ma_short)?;
        check_window(self.ma_long)?;
        check_window(self.rsi_period)?;
        check_window(self.bollinger_period)?;
        if !self.bollinger_std.is_finite() || self.bollinger_std < 0.0 {
            return Err(MarketError::InvalidMultiplier {
                value: self.bollinger_std,
            });
        }
        Ok(())
    }

    /// Column order of a [`TechnicalSnapshot`].
    pub fn indicator_types(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Sma(self.ma_short),
            IndicatorType::Sma(self.ma_long),
            IndicatorType::Rsi(self.rsi_period),
            IndicatorType::Bollinger {
                period: self.bollinger_period,
                stddev_mult_x100: (self.bollinger_std * 100.0).round() as u32,
            },
        ]
    }
}

/// Price history of one instrument with its indicator series aligned by index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TechnicalSnapshot {
    pub symbol: String,
    pub dates: Vec<NaiveDate>,
    pub prices: Vec<f64>,
    pub ma_short: IndicatorSeries,
    pub ma_long: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub bollinger: BollingerBands,
}

impl TechnicalSnapshot {
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

pub fn compute_snapshot(
    dataset: &HistoricalDataset,
    symbol: &str,
    settings: &IndicatorSettings,
) -> Result<TechnicalSnapshot, MarketError> {
    settings.validate()?;
    let points = dataset.for_symbol(symbol)?;
    let prices: Vec<f64> = points.iter().map(|p| p.price).collect();

    Ok(TechnicalSnapshot {
        symbol: symbol.to_string(),
        dates: points.iter().map(|p| p.date).collect(),
        ma_short: moving_average(&prices, settings.ma_short)?,
        ma_long: moving_average(&prices, settings.ma_long)?,
        rsi: rsi(&prices, settings.rsi_period)?,
        bollinger: bollinger_bands(&prices, settings.bollinger_period, settings.bollinger_std)?,
        prices,
    })
}
