//! Market engine: the catalog, its simulated history and the live quotes.

use crate::domain::alert::{self, AlertRecord, DEFAULT_ALERT_THRESHOLD};
use crate::domain::analytics::{self, MarketSummary};
use crate::domain::error::MarketError;
use crate::domain::history::HistoricalDataset;
use crate::domain::indicator_helpers::{IndicatorSettings, TechnicalSnapshot, compute_snapshot};
use crate::domain::instrument::InstrumentCatalog;
use crate::domain::live_quote::{CurrentQuote, LiveFeedConfig, LiveQuoteStore, TickReport};
use crate::domain::market_board::MarketBoard;
use crate::domain::regime::RegimeModel;
use crate::domain::simulator::{DEFAULT_VOLATILITY_FLOOR, PriceSimulator};
use chrono::NaiveDate;
use rand::Rng;
use tracing::info;

pub const DEFAULT_REGIME_BASE_YEAR: i32 = 2020;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Seed for the engine's random source; `None` draws from entropy.
    pub seed: Option<u64>,
    pub regime_base_year: i32,
    pub volatility_floor: f64,
    pub live: LiveFeedConfig,
    /// Refresh the world index and currency board on every tick.
    pub world_markets: bool,
    pub alert_threshold: f64,
    pub indicators: IndicatorSettings,
}

impl EngineConfig {
    /// Simulation over `[start, end]` with every other setting at its default.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            seed: None,
            regime_base_year: DEFAULT_REGIME_BASE_YEAR,
            volatility_floor: DEFAULT_VOLATILITY_FLOOR,
            live: LiveFeedConfig::default(),
            world_markets: false,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            indicators: IndicatorSettings::default(),
        }
    }

    pub fn validate(&self) -> Result<(), MarketError> {
        if self.end < self.start {
            return Err(MarketError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        if !(self.volatility_floor.is_finite() && self.volatility_floor > 0.0) {
            return Err(MarketError::invalid_config(
                "simulation",
                "volatility_floor",
                "must be positive",
            ));
        }
        if !self.alert_threshold.is_finite() || self.alert_threshold < 0.0 {
            return Err(MarketError::InvalidThreshold {
                value: self.alert_threshold,
            });
        }
        self.live.validate()?;
        self.indicators.validate()
    }
}

pub struct MarketEngine {
    config: EngineConfig,
    catalog: InstrumentCatalog,
    simulator: PriceSimulator,
    history: HistoricalDataset,
    quotes: LiveQuoteStore,
    board: Option<MarketBoard>,
}

impl MarketEngine {
    /// Builds the standard catalog, simulates its history over the configured
    /// range and seeds the live quotes from the last closes.
    pub fn new<R: Rng + ?Sized>(config: EngineConfig, rng: &mut R) -> Result<Self, MarketError> {
        config.validate()?;

        let catalog = InstrumentCatalog::standard();
        let simulator = PriceSimulator::new(RegimeModel::standard(config.regime_base_year)?)
            .with_volatility_floor(config.volatility_floor);
        let history = simulator.generate_dataset(&catalog, config.start, config.end, rng)?;
        let quotes = LiveQuoteStore::seed(&catalog, &history, config.live.clone(), rng)?;
        let board = config.world_markets.then(MarketBoard::standard);

        info!(
            instruments = catalog.len(),
            start = %config.start,
            end = %config.end,
            "market engine ready"
        );
        Ok(Self {
            config,
            catalog,
            simulator,
            history,
            quotes,
            board,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &InstrumentCatalog {
        &self.catalog
    }

    pub fn regime(&self) -> &RegimeModel {
        self.simulator.regime()
    }

    pub fn history(&self) -> &HistoricalDataset {
        &self.history
    }

    /// Indicator bundle for one symbol using the configured settings.
    pub fn indicators(&self, symbol: &str) -> Result<TechnicalSnapshot, MarketError> {
        compute_snapshot(&self.history, symbol, &self.config.indicators)
    }

    pub fn quotes(&self) -> &[CurrentQuote] {
        self.quotes.all()
    }

    pub fn quote(&self, symbol: &str) -> Result<&CurrentQuote, MarketError> {
        self.quotes.get(symbol)
    }

    pub fn tick_count(&self) -> u64 {
        self.quotes.tick_count()
    }

    /// Refreshes the quotes, then the world board when enabled.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickReport {
        let report = self.quotes.tick(rng);
        if let Some(board) = &mut self.board {
            board.refresh(rng);
        }
        report
    }

    pub fn world_markets(&self) -> Option<&MarketBoard> {
        self.board.as_ref()
    }

    pub fn alerts(&self, threshold_pct: f64) -> Result<Vec<AlertRecord>, MarketError> {
        alert::evaluate(self.quotes.all(), threshold_pct)
    }

    /// Alerts at the configured threshold.
    pub fn default_alerts(&self) -> Result<Vec<AlertRecord>, MarketError> {
        self.alerts(self.config.alert_threshold)
    }

    pub fn summary(&self) -> MarketSummary {
        analytics::market_summary(self.quotes.all())
    }
}
