#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use commodity_sim::domain::engine::{EngineConfig, MarketEngine};
use commodity_sim::domain::history::{HistoricalDataset, HistoricalPricePoint};
use commodity_sim::domain::instrument::{Category, InstrumentCatalog};
use commodity_sim::domain::live_quote::CurrentQuote;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn engine_config(start: NaiveDate, end: NaiveDate, seed: u64) -> EngineConfig {
    let mut config = EngineConfig::new(start, end);
    config.seed = Some(seed);
    config
}

/// Engine over [start, end] plus the random source used to build it.
pub fn seeded_engine(start: NaiveDate, end: NaiveDate, seed: u64) -> (MarketEngine, StdRng) {
    let mut rng = rng(seed);
    let engine = MarketEngine::new(engine_config(start, end, seed), &mut rng).unwrap();
    (engine, rng)
}

pub fn make_point(symbol: &str, category: Category, on: NaiveDate, price: f64) -> HistoricalPricePoint {
    HistoricalPricePoint {
        date: on,
        symbol: symbol.to_string(),
        category,
        price,
        volume: 1_000_000.0,
        volatility_pct: 1.0,
    }
}

/// One daily series per symbol starting at `start`.
pub fn make_dataset(start: NaiveDate, series: &[(&str, Category, &[f64])]) -> HistoricalDataset {
    HistoricalDataset::from_series(
        series
            .iter()
            .map(|(symbol, category, prices)| {
                prices
                    .iter()
                    .enumerate()
                    .map(|(i, &price)| {
                        make_point(symbol, *category, start + Duration::days(i as i64), price)
                    })
                    .collect()
            })
            .collect(),
    )
    .unwrap()
}

/// Quote with the given symbol and change, other fields from GOLD.
pub fn make_quote(symbol: &str, change_pct: f64) -> CurrentQuote {
    let catalog = InstrumentCatalog::standard();
    let mut quote =
        CurrentQuote::from_close(catalog.get("GOLD").unwrap(), 100.0, change_pct, 1_000.0, 0.2);
    quote.symbol = symbol.to_string();
    quote
}

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
