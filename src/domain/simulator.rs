//! Regime-aware daily price path generator.
//!
//! For each calendar day:
//!   shock      = regime factor for (date, instrument)
//!   daily_vol  = max(N(1, volatility / 100), floor)
//!   seasonal   = 1 + 0.005 * sin(2π * day_of_year / 365)
//!   price      = base_price * shock * daily_vol * seasonal
//!   volume     ~ U[100_000, 5_000_000]
//!   volatility = |daily_vol - 1| * 100
//!
//! Each day is drawn independently around the base price; there is no
//! random-walk carry-over between days.

use crate::domain::error::MarketError;
use crate::domain::history::{HistoricalDataset, HistoricalPricePoint};
use crate::domain::instrument::{InstrumentCatalog, InstrumentProfile};
use crate::domain::regime::RegimeModel;
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;
use tracing::{debug, info};

pub const DEFAULT_VOLATILITY_FLOOR: f64 = 0.01;
pub const SEASONAL_AMPLITUDE: f64 = 0.005;
pub const MIN_DAILY_VOLUME: f64 = 100_000.0;
pub const MAX_DAILY_VOLUME: f64 = 5_000_000.0;

pub fn seasonal_factor(date: NaiveDate) -> f64 {
    1.0 + SEASONAL_AMPLITUDE * (2.0 * PI * date.ordinal() as f64 / 365.0).sin()
}

#[derive(Debug, Clone)]
pub struct PriceSimulator {
    regime: RegimeModel,
    volatility_floor: f64,
}

impl PriceSimulator {
    pub fn new(regime: RegimeModel) -> Self {
        Self {
            regime,
            volatility_floor: DEFAULT_VOLATILITY_FLOOR,
        }
    }

    /// Lower clamp for the daily volatility draw; keeps every price positive.
    pub fn with_volatility_floor(mut self, floor: f64) -> Self {
        self.volatility_floor = floor;
        self
    }

    pub fn regime(&self) -> &RegimeModel {
        &self.regime
    }

    pub fn generate_history<R: Rng + ?Sized>(
        &self,
        profile: &InstrumentProfile,
        start: NaiveDate,
        end: NaiveDate,
        rng: &mut R,
    ) -> Result<Vec<HistoricalPricePoint>, MarketError> {
        if end < start {
            return Err(MarketError::InvalidRange { start, end });
        }
        let noise = Normal::new(1.0, profile.volatility / 100.0).map_err(|e| {
            MarketError::invalid_config("instrument", &profile.symbol, e.to_string())
        })?;

        let days = (end - start).num_days() as usize + 1;
        let mut points = Vec::with_capacity(days);

        for date in start.iter_days().take(days) {
            let shock = self.regime.shock_factor(date, profile, rng);
            let daily_vol = noise.sample(rng).max(self.volatility_floor);
            let price = profile.base_price * shock * daily_vol * seasonal_factor(date);

            points.push(HistoricalPricePoint {
                date,
                symbol: profile.symbol.clone(),
                category: profile.category,
                price,
                volume: rng.gen_range(MIN_DAILY_VOLUME..=MAX_DAILY_VOLUME),
                volatility_pct: (daily_vol - 1.0).abs() * 100.0,
            });
        }

        debug!(symbol = %profile.symbol, days, "generated history");
        Ok(points)
    }

    /// Runs [`Self::generate_history`] for every instrument in catalog order.
    pub fn generate_dataset<R: Rng + ?Sized>(
        &self,
        catalog: &InstrumentCatalog,
        start: NaiveDate,
        end: NaiveDate,
        rng: &mut R,
    ) -> Result<HistoricalDataset, MarketError> {
        let series = catalog
            .all()
            .iter()
            .map(|profile| self.generate_history(profile, start, end, rng))
            .collect::<Result<Vec<_>, _>>()?;

        let dataset = HistoricalDataset::from_series(series)?;
        info!(
            instruments = catalog.len(),
            points = dataset.len(),
            %start,
            %end,
            "simulated historical dataset"
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::Category;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn simulator() -> PriceSimulator {
        PriceSimulator::new(RegimeModel::standard(2020).unwrap())
    }

    #[test]
    fn one_point_per_day_inclusive() {
        let catalog = InstrumentCatalog::standard();
        let mut rng = StdRng::seed_from_u64(1);
        let points = simulator()
            .generate_history(catalog.get("GOLD").unwrap(), date(2020, 1, 1), date(2020, 12, 31), &mut rng)
            .unwrap();

        assert_eq!(points.len(), 366);
        assert_eq!(points.first().unwrap().date, date(2020, 1, 1));
        assert_eq!(points.last().unwrap().date, date(2020, 12, 31));
        for pair in points.windows(2) {
            assert_eq!(pair[1].date, pair[0].date.succ_opt().unwrap());
        }
    }

    #[test]
    fn single_day_range() {
        let catalog = InstrumentCatalog::standard();
        let mut rng = StdRng::seed_from_u64(1);
        let points = simulator()
            .generate_history(catalog.get("CORN").unwrap(), date(2023, 5, 5), date(2023, 5, 5), &mut rng)
            .unwrap();
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let catalog = InstrumentCatalog::standard();
        let mut rng = StdRng::seed_from_u64(1);
        let result = simulator().generate_history(
            catalog.get("CORN").unwrap(),
            date(2023, 5, 5),
            date(2023, 5, 4),
            &mut rng,
        );
        assert!(matches!(result, Err(MarketError::InvalidRange { .. })));
    }

    #[test]
    fn points_carry_profile_fields() {
        let catalog = InstrumentCatalog::standard();
        let mut rng = StdRng::seed_from_u64(3);
        let points = simulator()
            .generate_history(catalog.get("COFFEE").unwrap(), date(2023, 1, 1), date(2023, 1, 10), &mut rng)
            .unwrap();
        for p in &points {
            assert_eq!(p.symbol, "COFFEE");
            assert_eq!(p.category, Category::Softs);
            assert!(p.price > 0.0);
            assert!((MIN_DAILY_VOLUME..=MAX_DAILY_VOLUME).contains(&p.volume));
            assert!(p.volatility_pct >= 0.0);
        }
    }

    #[test]
    fn neutral_regime_centres_on_base_price() {
        let catalog = InstrumentCatalog::standard();
        let gold = catalog.get("GOLD").unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let points = PriceSimulator::new(RegimeModel::default())
            .generate_history(gold, date(2010, 1, 1), date(2019, 12, 31), &mut rng)
            .unwrap();

        let mean = points.iter().map(|p| p.price).sum::<f64>() / points.len() as f64;
        // seasonal term averages out over whole years
        assert_relative_eq!(mean, gold.base_price, max_relative = 0.005);
    }

    #[test]
    fn crisis_energy_prices_are_depressed() {
        let catalog = InstrumentCatalog::standard();
        let brent = catalog.get("BRENT").unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let points = simulator()
            .generate_history(brent, date(2020, 1, 1), date(2020, 6, 30), &mut rng)
            .unwrap();
        let mean = points.iter().map(|p| p.price).sum::<f64>() / points.len() as f64;
        assert!(mean < brent.base_price * 0.8, "mean {mean}");
        assert!(mean > brent.base_price * 0.5, "mean {mean}");
    }

    #[test]
    fn volatility_floor_keeps_prices_positive() {
        let mut wild = InstrumentCatalog::standard().get("COFFEE").unwrap().clone();
        wild.volatility = 400.0;
        let mut rng = StdRng::seed_from_u64(9);
        let points = simulator()
            .with_volatility_floor(0.05)
            .generate_history(&wild, date(2024, 1, 1), date(2024, 12, 31), &mut rng)
            .unwrap();
        let floor_price = wild.base_price * 0.95 * 0.05 * (1.0 - SEASONAL_AMPLITUDE);
        for p in &points {
            assert!(p.price >= floor_price * 0.999, "price {} below floor", p.price);
        }
    }

    #[test]
    fn same_seed_same_history() {
        let catalog = InstrumentCatalog::standard();
        let wheat = catalog.get("WHEAT").unwrap();
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            simulator()
                .generate_history(wheat, date(2022, 1, 1), date(2022, 3, 31), &mut rng)
                .unwrap()
        };
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(43));
    }

    #[test]
    fn dataset_covers_every_instrument() {
        let catalog = InstrumentCatalog::standard();
        let mut rng = StdRng::seed_from_u64(2);
        let ds = simulator()
            .generate_dataset(&catalog, date(2024, 1, 1), date(2024, 1, 31), &mut rng)
            .unwrap();
        assert_eq!(ds.len(), 9 * 31);
        let symbols: Vec<&str> = ds.symbols().iter().map(String::as_str).collect();
        assert_eq!(symbols, catalog.symbols());
    }

    #[test]
    fn seasonal_factor_bounds() {
        for day in date(2023, 1, 1).iter_days().take(365) {
            let s = seasonal_factor(day);
            assert!((1.0 - SEASONAL_AMPLITUDE..=1.0 + SEASONAL_AMPLITUDE).contains(&s));
        }
        // sin(2π·91/365) is close to its peak
        assert!(seasonal_factor(date(2023, 4, 1)) > 1.0049);
    }
}
