//! Engine configuration from INI sections.
//!
//! Every key is optional. Values are parsed first, then the assembled
//! [`EngineConfig`] is validated as a whole.

use crate::domain::alert::DEFAULT_ALERT_THRESHOLD;
use crate::domain::engine::{DEFAULT_REGIME_BASE_YEAR, EngineConfig};
use crate::domain::error::MarketError;
use crate::domain::indicator_helpers::IndicatorSettings;
use crate::domain::live_quote::LiveFeedConfig;
use crate::domain::simulator::DEFAULT_VOLATILITY_FLOOR;
use crate::ports::config_port::ConfigPort;
use chrono::{Local, NaiveDate};

pub const DEFAULT_START_DATE: (i32, u32, u32) = (2020, 1, 1);

/// Builds the engine config, defaulting `end_date` to today.
pub fn build_engine_config(config: &dyn ConfigPort) -> Result<EngineConfig, MarketError> {
    build_engine_config_as_of(config, Local::now().date_naive())
}

pub fn build_engine_config_as_of(
    config: &dyn ConfigPort,
    today: NaiveDate,
) -> Result<EngineConfig, MarketError> {
    let start = match config.get_date("simulation", "start_date")? {
        Some(date) => date,
        None => default_start()?,
    };
    let end = config.get_date("simulation", "end_date")?.unwrap_or(today);

    let engine = EngineConfig {
        start,
        end,
        seed: config.get_u64("simulation", "seed")?,
        regime_base_year: get_i32(config, "simulation", "regime_base_year", DEFAULT_REGIME_BASE_YEAR)?,
        volatility_floor: config.get_double("simulation", "volatility_floor", DEFAULT_VOLATILITY_FLOOR)?,
        live: build_live_config(config)?,
        world_markets: config.get_bool("live", "world_markets", false)?,
        alert_threshold: config.get_double("alerts", "threshold_pct", DEFAULT_ALERT_THRESHOLD)?,
        indicators: build_indicator_settings(config)?,
    };
    engine.validate()?;
    Ok(engine)
}

fn build_live_config(config: &dyn ConfigPort) -> Result<LiveFeedConfig, MarketError> {
    let d = LiveFeedConfig::default();
    Ok(LiveFeedConfig {
        change_probability: config.get_double("live", "change_probability", d.change_probability)?,
        tick_change_pct: config.get_double("live", "tick_change_pct", d.tick_change_pct)?,
        seed_change_pct: config.get_double("live", "seed_change_pct", d.seed_change_pct)?,
        volume_factor_min: config.get_double("live", "volume_factor_min", d.volume_factor_min)?,
        volume_factor_max: config.get_double("live", "volume_factor_max", d.volume_factor_max)?,
    })
}

fn build_indicator_settings(config: &dyn ConfigPort) -> Result<IndicatorSettings, MarketError> {
    let d = IndicatorSettings::default();
    Ok(IndicatorSettings {
        ma_short: get_window(config, "ma_short", d.ma_short)?,
        ma_long: get_window(config, "ma_long", d.ma_long)?,
        rsi_period: get_window(config, "rsi_period", d.rsi_period)?,
        bollinger_period: get_window(config, "bollinger_period", d.bollinger_period)?,
        bollinger_std: config.get_double("indicators", "bollinger_std", d.bollinger_std)?,
    })
}

fn get_window(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, MarketError> {
    let value = config.get_int("indicators", key, default as i64)?;
    match usize::try_from(value) {
        Ok(window) if window > 0 => Ok(window),
        _ => Err(MarketError::invalid_config(
            "indicators",
            key,
            "window must be at least 1",
        )),
    }
}

fn get_i32(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i32,
) -> Result<i32, MarketError> {
    let value = config.get_int(section, key, i64::from(default))?;
    i32::try_from(value)
        .map_err(|_| MarketError::invalid_config(section, key, "value out of range"))
}

fn default_start() -> Result<NaiveDate, MarketError> {
    let (y, m, d) = DEFAULT_START_DATE;
    NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| MarketError::invalid_config("simulation", "start_date", "invalid default"))
}
