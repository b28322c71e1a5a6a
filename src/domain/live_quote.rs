//! Live quotes: one mutable entry per instrument, refreshed by ticks.
//!
//! Seeding starts each quote from the last simulated close plus an intraday
//! drift. Each tick then refreshes a random subset of quotes; the rest keep
//! their previous price and change. `change_pct` always holds the latest
//! move only, never a running total.

use crate::domain::error::MarketError;
use crate::domain::history::HistoricalDataset;
use crate::domain::instrument::{Category, InstrumentCatalog, InstrumentProfile};
use rand::Rng;
use tracing::{debug, info};

pub const SEED_VOLUME_RANGE: (f64, f64) = (500_000.0, 5_000_000.0);
pub const SPREAD_RANGE: (f64, f64) = (0.1, 0.5);

#[derive(Debug, Clone, PartialEq)]
pub struct LiveFeedConfig {
    /// Chance that a given quote moves on a tick.
    pub change_probability: f64,
    /// Tick moves are drawn from U[-tick_change_pct, tick_change_pct].
    pub tick_change_pct: f64,
    /// Seed drift is drawn from U[-seed_change_pct, seed_change_pct].
    pub seed_change_pct: f64,
    pub volume_factor_min: f64,
    pub volume_factor_max: f64,
}

impl Default for LiveFeedConfig {
    fn default() -> Self {
        Self {
            change_probability: 0.6,
            tick_change_pct: 1.5,
            seed_change_pct: 3.0,
            volume_factor_min: 0.7,
            volume_factor_max: 1.4,
        }
    }
}

impl LiveFeedConfig {
    pub fn validate(&self) -> Result<(), MarketError> {
        if !(0.0..=1.0).contains(&self.change_probability) {
            return Err(MarketError::invalid_config(
                "live",
                "change_probability",
                "must be between 0 and 1",
            ));
        }
        for (key, value) in [
            ("tick_change_pct", self.tick_change_pct),
            ("seed_change_pct", self.seed_change_pct),
        ] {
            if !(0.0..100.0).contains(&value) {
                return Err(MarketError::invalid_config(
                    "live",
                    key,
                    "must be at least 0 and below 100",
                ));
            }
        }
        if !(self.volume_factor_min.is_finite() && self.volume_factor_min > 0.0) {
            return Err(MarketError::invalid_config(
                "live",
                "volume_factor_min",
                "must be positive",
            ));
        }
        if !self.volume_factor_max.is_finite() || self.volume_factor_max < self.volume_factor_min {
            return Err(MarketError::invalid_config(
                "live",
                "volume_factor_max",
                "must be finite and not below volume_factor_min",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ChangeDirection {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CurrentQuote {
    pub symbol: String,
    pub name: String,
    pub category: Category,
    pub unit: String,
    pub price: f64,
    pub change_pct: f64,
    pub day_volume: f64,
    pub spread: f64,
    pub volatility: f64,
    pub production: f64,
    pub reserves: f64,
    pub producers: Vec<String>,
}

impl CurrentQuote {
    /// Quote priced at `last_close` moved by `change_pct` percent.
    pub fn from_close(
        profile: &InstrumentProfile,
        last_close: f64,
        change_pct: f64,
        day_volume: f64,
        spread: f64,
    ) -> Self {
        Self {
            symbol: profile.symbol.clone(),
            name: profile.name.clone(),
            category: profile.category,
            unit: profile.unit.clone(),
            price: last_close * (1.0 + change_pct / 100.0),
            change_pct,
            day_volume,
            spread,
            volatility: profile.volatility,
            production: profile.production,
            reserves: profile.reserves,
            producers: profile.producers.clone(),
        }
    }

    /// Moves price, change and volume together.
    pub fn apply_change(&mut self, change_pct: f64, volume_factor: f64) {
        self.price *= 1.0 + change_pct / 100.0;
        self.change_pct = change_pct;
        self.day_volume *= volume_factor;
    }

    pub fn direction(&self) -> ChangeDirection {
        if self.change_pct > 0.0 {
            ChangeDirection::Up
        } else if self.change_pct < 0.0 {
            ChangeDirection::Down
        } else {
            ChangeDirection::Flat
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub updated: Vec<String>,
}

/// Sole owner and writer of the current quotes, kept in catalog order.
#[derive(Debug, Clone)]
pub struct LiveQuoteStore {
    quotes: Vec<CurrentQuote>,
    config: LiveFeedConfig,
    ticks: u64,
}

impl LiveQuoteStore {
    pub fn seed<R: Rng + ?Sized>(
        catalog: &InstrumentCatalog,
        dataset: &HistoricalDataset,
        config: LiveFeedConfig,
        rng: &mut R,
    ) -> Result<Self, MarketError> {
        config.validate()?;

        let mut quotes = Vec::with_capacity(catalog.len());
        for profile in catalog.all() {
            let last = dataset.last_point(&profile.symbol)?;
            let change = rng.gen_range(-config.seed_change_pct..=config.seed_change_pct);
            let volume = rng.gen_range(SEED_VOLUME_RANGE.0..=SEED_VOLUME_RANGE.1);
            let spread = rng.gen_range(SPREAD_RANGE.0..=SPREAD_RANGE.1);
            quotes.push(CurrentQuote::from_close(
                profile, last.price, change, volume, spread,
            ));
        }

        info!(quotes = quotes.len(), "seeded live quotes");
        Ok(Self {
            quotes,
            config,
            ticks: 0,
        })
    }

    pub fn from_quotes(
        quotes: Vec<CurrentQuote>,
        config: LiveFeedConfig,
    ) -> Result<Self, MarketError> {
        config.validate()?;
        for (i, quote) in quotes.iter().enumerate() {
            if quotes[..i].iter().any(|q| q.symbol == quote.symbol) {
                return Err(MarketError::DuplicateSymbol {
                    symbol: quote.symbol.clone(),
                });
            }
        }
        Ok(Self {
            quotes,
            config,
            ticks: 0,
        })
    }

    /// One refresh cycle over every quote.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickReport {
        let cfg = &self.config;
        let mut updated = Vec::new();

        for quote in &mut self.quotes {
            if !rng.gen_bool(cfg.change_probability) {
                continue;
            }
            let change = rng.gen_range(-cfg.tick_change_pct..=cfg.tick_change_pct);
            let volume_factor = rng.gen_range(cfg.volume_factor_min..=cfg.volume_factor_max);
            quote.apply_change(change, volume_factor);
            updated.push(quote.symbol.clone());
        }

        self.ticks += 1;
        debug!(tick = self.ticks, updated = updated.len(), "live tick");
        TickReport {
            tick: self.ticks,
            updated,
        }
    }

    pub fn get(&self, symbol: &str) -> Result<&CurrentQuote, MarketError> {
        self.quotes
            .iter()
            .find(|q| q.symbol == symbol)
            .ok_or_else(|| MarketError::not_found(symbol))
    }

    pub fn all(&self) -> &[CurrentQuote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &LiveFeedConfig {
        &self.config
    }
}
