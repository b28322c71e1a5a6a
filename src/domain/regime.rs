//! Market regimes as an ordered rule table.
//!
//! Each rule pairs a date window and an instrument filter with a shock
//! distribution. Rules are evaluated in order and the first match wins; a
//! date no rule covers gets a neutral factor of 1.0.
//!
//! The standard table, relative to a base year Y0:
//! - crisis (Y0, January to June): energy U[0.5, 0.8], everything else U[0.9, 1.1]
//! - recovery (Y0 + 1): U[1.05, 1.25]
//! - supply shock (Y0 + 2, February onward): grains U[1.2, 1.6], energy U[1.1, 1.4]
//! - recent (Y0 + 3 onward): U[0.95, 1.15]

use crate::domain::error::MarketError;
use crate::domain::instrument::{Category, InstrumentProfile};
use chrono::NaiveDate;
use rand::Rng;
use std::fmt;

pub const NEUTRAL_FACTOR: f64 = 1.0;

/// Inclusive date window; `to = None` leaves it open-ended.
#[derive(Debug, Clone, PartialEq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
}

impl DateWindow {
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to: Some(to) }
    }

    pub fn starting(from: NaiveDate) -> Self {
        Self { from, to: None }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && self.to.is_none_or(|to| date <= to)
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to {
            Some(to) => write!(f, "{} to {}", self.from, to),
            None => write!(f, "{} onward", self.from),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentFilter {
    Any,
    Category(Category),
    Symbols(Vec<String>),
}

impl InstrumentFilter {
    pub fn matches(&self, profile: &InstrumentProfile) -> bool {
        match self {
            InstrumentFilter::Any => true,
            InstrumentFilter::Category(c) => profile.category == *c,
            InstrumentFilter::Symbols(symbols) => symbols.iter().any(|s| *s == profile.symbol),
        }
    }
}

impl fmt::Display for InstrumentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentFilter::Any => f.write_str("all"),
            InstrumentFilter::Category(c) => write!(f, "{c}"),
            InstrumentFilter::Symbols(symbols) => f.write_str(&symbols.join(", ")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShockDistribution {
    Fixed(f64),
    Uniform { low: f64, high: f64 },
}

impl ShockDistribution {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            ShockDistribution::Fixed(v) => v,
            ShockDistribution::Uniform { low, high } => rng.gen_range(low..=high),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let (low, high) = match *self {
            ShockDistribution::Fixed(v) => (v, v),
            ShockDistribution::Uniform { low, high } => (low, high),
        };
        if !low.is_finite() || !high.is_finite() {
            return Err("bounds must be finite".to_string());
        }
        if low <= 0.0 {
            return Err("shock factors must be positive".to_string());
        }
        if low > high {
            return Err(format!("lower bound {low} exceeds upper bound {high}"));
        }
        Ok(())
    }
}

impl fmt::Display for ShockDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShockDistribution::Fixed(v) => write!(f, "x{v}"),
            ShockDistribution::Uniform { low, high } => write!(f, "U[{low}, {high}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegimeRule {
    pub name: String,
    pub window: DateWindow,
    pub instruments: InstrumentFilter,
    pub distribution: ShockDistribution,
}

impl RegimeRule {
    pub fn matches(&self, date: NaiveDate, profile: &InstrumentProfile) -> bool {
        self.window.contains(date) && self.instruments.matches(profile)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegimeModel {
    rules: Vec<RegimeRule>,
}

impl RegimeModel {
    pub fn new(rules: Vec<RegimeRule>) -> Result<Self, MarketError> {
        for rule in &rules {
            rule.distribution
                .validate()
                .map_err(|reason| MarketError::invalid_config("regime", &rule.name, reason))?;
        }
        Ok(Self { rules })
    }

    /// The crisis / recovery / supply-shock / recent table anchored at `base_year`.
    pub fn standard(base_year: i32) -> Result<Self, MarketError> {
        let y0 = base_year;
        let grains = InstrumentFilter::Symbols(vec!["WHEAT".to_string(), "CORN".to_string()]);

        let (y1, y2, y3) = (after(y0, 1)?, after(y0, 2)?, after(y0, 3)?);

        let crisis = DateWindow::between(ymd(y0, 1, 1)?, ymd(y0, 6, 30)?);
        let recovery = DateWindow::between(ymd(y1, 1, 1)?, ymd(y1, 12, 31)?);
        let supply_shock = DateWindow::between(ymd(y2, 2, 1)?, ymd(y2, 12, 31)?);
        let recent = DateWindow::starting(ymd(y3, 1, 1)?);

        Self::new(vec![
            rule(
                "crisis",
                crisis.clone(),
                InstrumentFilter::Category(Category::Energy),
                0.5,
                0.8,
            ),
            rule("crisis", crisis, InstrumentFilter::Any, 0.9, 1.1),
            rule("recovery", recovery, InstrumentFilter::Any, 1.05, 1.25),
            rule("supply-shock", supply_shock.clone(), grains, 1.2, 1.6),
            rule(
                "supply-shock",
                supply_shock,
                InstrumentFilter::Category(Category::Energy),
                1.1,
                1.4,
            ),
            rule("recent", recent, InstrumentFilter::Any, 0.95, 1.15),
        ])
    }

    pub fn rules(&self) -> &[RegimeRule] {
        &self.rules
    }

    pub fn regime_for(&self, date: NaiveDate, profile: &InstrumentProfile) -> Option<&RegimeRule> {
        self.rules.iter().find(|r| r.matches(date, profile))
    }

    pub fn shock_factor<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        profile: &InstrumentProfile,
        rng: &mut R,
    ) -> f64 {
        self.regime_for(date, profile)
            .map_or(NEUTRAL_FACTOR, |r| r.distribution.sample(rng))
    }
}

fn rule(
    name: &str,
    window: DateWindow,
    instruments: InstrumentFilter,
    low: f64,
    high: f64,
) -> RegimeRule {
    RegimeRule {
        name: name.to_string(),
        window,
        instruments,
        distribution: ShockDistribution::Uniform { low, high },
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate, MarketError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| year_out_of_range(year))
}

fn after(base_year: i32, years: i32) -> Result<i32, MarketError> {
    base_year
        .checked_add(years)
        .ok_or_else(|| year_out_of_range(base_year))
}

fn year_out_of_range(year: i32) -> MarketError {
    MarketError::invalid_config(
        "simulation",
        "regime_base_year",
        format!("year {year} is out of range"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::instrument::InstrumentCatalog;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draws(model: &RegimeModel, on: NaiveDate, symbol: &str) -> Vec<f64> {
        let catalog = InstrumentCatalog::standard();
        let profile = catalog.get(symbol).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        (0..500)
            .map(|_| model.shock_factor(on, profile, &mut rng))
            .collect()
    }

    fn assert_within(values: &[f64], low: f64, high: f64) {
        for v in values {
            assert!(*v >= low && *v <= high, "{v} outside [{low}, {high}]");
        }
    }

    #[test]
    fn crisis_depresses_energy() {
        let model = RegimeModel::standard(2020).unwrap();
        assert_within(&draws(&model, date(2020, 4, 20), "BRENT"), 0.5, 0.8);
        assert_within(&draws(&model, date(2020, 6, 30), "WTI"), 0.5, 0.8);
    }

    #[test]
    fn crisis_is_mild_for_other_categories() {
        let model = RegimeModel::standard(2020).unwrap();
        assert_within(&draws(&model, date(2020, 3, 1), "GOLD"), 0.9, 1.1);
        assert_within(&draws(&model, date(2020, 1, 1), "COFFEE"), 0.9, 1.1);
    }

    #[test]
    fn second_half_of_base_year_is_neutral() {
        let model = RegimeModel::standard(2020).unwrap();
        let values = draws(&model, date(2020, 7, 1), "BRENT");
        assert!(values.iter().all(|v| *v == NEUTRAL_FACTOR));
    }

    #[test]
    fn recovery_lifts_everything() {
        let model = RegimeModel::standard(2020).unwrap();
        for symbol in ["BRENT", "GOLD", "WHEAT", "COFFEE"] {
            assert_within(&draws(&model, date(2021, 9, 15), symbol), 1.05, 1.25);
        }
    }

    #[test]
    fn supply_shock_hits_grains_and_energy() {
        let model = RegimeModel::standard(2020).unwrap();
        assert_within(&draws(&model, date(2022, 3, 1), "WHEAT"), 1.2, 1.6);
        assert_within(&draws(&model, date(2022, 3, 1), "CORN"), 1.2, 1.6);
        assert_within(&draws(&model, date(2022, 3, 1), "WTI"), 1.1, 1.4);
    }

    #[test]
    fn supply_shock_leaves_others_untouched() {
        let model = RegimeModel::standard(2020).unwrap();
        for symbol in ["SOYBEANS", "GOLD", "COPPER", "COFFEE"] {
            let values = draws(&model, date(2022, 5, 10), symbol);
            assert!(values.iter().all(|v| *v == NEUTRAL_FACTOR), "{symbol}");
        }
    }

    #[test]
    fn january_before_supply_shock_is_neutral() {
        let model = RegimeModel::standard(2020).unwrap();
        let values = draws(&model, date(2022, 1, 31), "WHEAT");
        assert!(values.iter().all(|v| *v == NEUTRAL_FACTOR));
    }

    #[test]
    fn recent_regime_is_open_ended() {
        let model = RegimeModel::standard(2020).unwrap();
        assert_within(&draws(&model, date(2023, 1, 1), "SILVER"), 0.95, 1.15);
        assert_within(&draws(&model, date(2031, 8, 8), "BRENT"), 0.95, 1.15);
    }

    #[test]
    fn dates_before_base_year_are_neutral() {
        let model = RegimeModel::standard(2020).unwrap();
        let values = draws(&model, date(2019, 12, 31), "BRENT");
        assert!(values.iter().all(|v| *v == NEUTRAL_FACTOR));
    }

    #[test]
    fn base_year_near_limits_is_rejected() {
        for year in [i32::MAX, i32::MAX - 2, 300_000] {
            assert!(matches!(
                RegimeModel::standard(year),
                Err(MarketError::ConfigInvalid { key, .. }) if key == "regime_base_year"
            ));
        }
    }

    #[test]
    fn regime_for_names_first_match() {
        let model = RegimeModel::standard(2020).unwrap();
        let catalog = InstrumentCatalog::standard();
        let brent = catalog.get("BRENT").unwrap();
        let rule = model.regime_for(date(2020, 2, 1), brent).unwrap();
        assert_eq!(rule.name, "crisis");
        assert_eq!(rule.instruments, InstrumentFilter::Category(Category::Energy));
        assert!(model.regime_for(date(2020, 8, 1), brent).is_none());
    }

    #[test]
    fn first_match_wins_over_later_rules() {
        let window = DateWindow::starting(date(2020, 1, 1));
        let model = RegimeModel::new(vec![
            RegimeRule {
                name: "first".into(),
                window: window.clone(),
                instruments: InstrumentFilter::Any,
                distribution: ShockDistribution::Fixed(2.0),
            },
            RegimeRule {
                name: "second".into(),
                window,
                instruments: InstrumentFilter::Any,
                distribution: ShockDistribution::Fixed(3.0),
            },
        ])
        .unwrap();
        assert!(draws(&model, date(2024, 1, 1), "GOLD").iter().all(|v| *v == 2.0));
    }

    #[test]
    fn empty_model_is_neutral() {
        let model = RegimeModel::default();
        assert!(draws(&model, date(2020, 3, 1), "BRENT").iter().all(|v| *v == 1.0));
    }

    #[test]
    fn new_rejects_inverted_bounds() {
        let result = RegimeModel::new(vec![rule(
            "broken",
            DateWindow::starting(date(2020, 1, 1)),
            InstrumentFilter::Any,
            1.5,
            1.0,
        )]);
        assert!(matches!(result, Err(MarketError::ConfigInvalid { key, .. }) if key == "broken"));
    }

    #[test]
    fn new_rejects_non_positive_factor() {
        let result = RegimeModel::new(vec![RegimeRule {
            name: "zero".into(),
            window: DateWindow::starting(date(2020, 1, 1)),
            instruments: InstrumentFilter::Any,
            distribution: ShockDistribution::Fixed(0.0),
        }]);
        assert!(result.is_err());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let w = DateWindow::between(date(2020, 1, 1), date(2020, 6, 30));
        assert!(w.contains(date(2020, 1, 1)));
        assert!(w.contains(date(2020, 6, 30)));
        assert!(!w.contains(date(2019, 12, 31)));
        assert!(!w.contains(date(2020, 7, 1)));
    }

    #[test]
    fn rules_render_for_display() {
        let model = RegimeModel::standard(2020).unwrap();
        let crisis = &model.rules()[0];
        assert_eq!(crisis.window.to_string(), "2020-01-01 to 2020-06-30");
        assert_eq!(crisis.instruments.to_string(), "Energy");
        assert_eq!(crisis.distribution.to_string(), "U[0.5, 0.8]");
        assert_eq!(model.rules()[3].instruments.to_string(), "WHEAT, CORN");
        assert_eq!(model.rules()[5].window.to_string(), "2023-01-01 onward");
    }
}
