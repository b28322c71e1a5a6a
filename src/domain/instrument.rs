//! Instrument profiles and the catalog that owns them.

use crate::domain::error::MarketError;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Category {
    Energy,
    PreciousMetals,
    IndustrialMetals,
    Agriculture,
    Softs,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Energy,
        Category::PreciousMetals,
        Category::IndustrialMetals,
        Category::Agriculture,
        Category::Softs,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Energy => "Energy",
            Category::PreciousMetals => "Precious Metals",
            Category::IndustrialMetals => "Industrial Metals",
            Category::Agriculture => "Agriculture",
            Category::Softs => "Softs",
        };
        f.write_str(name)
    }
}

/// Static description of a tradable commodity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InstrumentProfile {
    pub symbol: String,
    pub name: String,
    pub category: Category,
    pub unit: String,
    pub base_price: f64,
    /// Daily volatility coefficient, in percent.
    pub volatility: f64,
    pub production: f64,
    pub reserves: f64,
    pub producers: Vec<String>,
    pub description: String,
}

impl InstrumentProfile {
    /// Price and supply figures must be usable by the simulator and the analytics.
    pub fn validate(&self) -> Result<(), MarketError> {
        let invalid = |reason: &str| {
            Err(MarketError::invalid_config(
                "instrument",
                &self.symbol,
                reason.to_string(),
            ))
        };
        if !(self.base_price.is_finite() && self.base_price > 0.0) {
            return invalid("base price must be positive");
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return invalid("volatility must be finite and non-negative");
        }
        if !(self.production.is_finite() && self.production >= 0.0)
            || !(self.reserves.is_finite() && self.reserves >= 0.0)
        {
            return invalid("production and reserves must be finite and non-negative");
        }
        Ok(())
    }
}

/// Registry of instruments in a fixed registration order.
///
/// Built once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct InstrumentCatalog {
    profiles: Vec<InstrumentProfile>,
}

impl InstrumentCatalog {
    pub fn new(profiles: Vec<InstrumentProfile>) -> Result<Self, MarketError> {
        let mut seen = HashSet::new();
        for profile in &profiles {
            profile.validate()?;
            if !seen.insert(profile.symbol.as_str()) {
                return Err(MarketError::DuplicateSymbol {
                    symbol: profile.symbol.clone(),
                });
            }
        }
        Ok(Self { profiles })
    }

    /// The nine instruments shipped with the simulator.
    pub fn standard() -> Self {
        Self {
            profiles: vec![
                profile(
                    "BRENT",
                    "Brent Crude Oil",
                    Category::Energy,
                    "USD/barrel",
                    85.0,
                    2.5,
                    82.0,
                    1500.0,
                    &["Saudi Arabia", "Russia", "USA", "Iraq"],
                    "Global crude oil benchmark",
                ),
                profile(
                    "WTI",
                    "WTI Crude Oil",
                    Category::Energy,
                    "USD/barrel",
                    82.5,
                    2.8,
                    78.0,
                    500.0,
                    &["USA", "Canada", "Mexico"],
                    "US crude oil benchmark",
                ),
                profile(
                    "GOLD",
                    "Gold",
                    Category::PreciousMetals,
                    "USD/ounce",
                    1950.0,
                    1.2,
                    3500.0,
                    54000.0,
                    &["China", "Australia", "Russia", "USA"],
                    "Traditional safe-haven asset",
                ),
                profile(
                    "SILVER",
                    "Silver",
                    Category::PreciousMetals,
                    "USD/ounce",
                    23.5,
                    2.1,
                    25000.0,
                    530000.0,
                    &["Mexico", "Peru", "China"],
                    "Precious metal with heavy industrial use",
                ),
                profile(
                    "COPPER",
                    "Copper",
                    Category::IndustrialMetals,
                    "USD/pound",
                    3.85,
                    1.8,
                    22.0,
                    870.0,
                    &["Chile", "Peru", "China"],
                    "Barometer of the global economy",
                ),
                profile(
                    "WHEAT",
                    "Wheat",
                    Category::Agriculture,
                    "USD/bushel",
                    6.25,
                    3.2,
                    780.0,
                    280.0,
                    &["China", "India", "Russia", "USA"],
                    "Major food grain",
                ),
                profile(
                    "CORN",
                    "Corn",
                    Category::Agriculture,
                    "USD/bushel",
                    4.80,
                    2.9,
                    1200.0,
                    320.0,
                    &["USA", "China", "Brazil"],
                    "Grain for feed and food",
                ),
                profile(
                    "SOYBEANS",
                    "Soybeans",
                    Category::Agriculture,
                    "USD/bushel",
                    12.80,
                    2.7,
                    350.0,
                    90.0,
                    &["USA", "Brazil", "Argentina"],
                    "Main source of vegetable protein",
                ),
                profile(
                    "COFFEE",
                    "Coffee",
                    Category::Softs,
                    "USD/pound",
                    1.85,
                    4.1,
                    10.5,
                    25.0,
                    &["Brazil", "Vietnam", "Colombia"],
                    "Most traded beverage commodity",
                ),
            ],
        }
    }

    pub fn get(&self, symbol: &str) -> Result<&InstrumentProfile, MarketError> {
        self.profiles
            .iter()
            .find(|p| p.symbol == symbol)
            .ok_or_else(|| MarketError::not_found(symbol))
    }

    pub fn all(&self) -> &[InstrumentProfile] {
        &self.profiles
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.symbol.as_str()).collect()
    }

    pub fn by_category(&self, category: Category) -> Vec<&InstrumentProfile> {
        self.profiles
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[allow(clippy::too_many_arguments)]
fn profile(
    symbol: &str,
    name: &str,
    category: Category,
    unit: &str,
    base_price: f64,
    volatility: f64,
    production: f64,
    reserves: f64,
    producers: &[&str],
    description: &str,
) -> InstrumentProfile {
    InstrumentProfile {
        symbol: symbol.to_string(),
        name: name.to_string(),
        category,
        unit: unit.to_string(),
        base_price,
        volatility,
        production,
        reserves,
        producers: producers.iter().map(|p| p.to_string()).collect(),
        description: description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_has_nine_instruments_in_order() {
        let catalog = InstrumentCatalog::standard();
        assert_eq!(
            catalog.symbols(),
            vec![
                "BRENT", "WTI", "GOLD", "SILVER", "COPPER", "WHEAT", "CORN", "SOYBEANS", "COFFEE"
            ]
        );
    }

    #[test]
    fn standard_catalog_spans_every_category() {
        let catalog = InstrumentCatalog::standard();
        for category in Category::ALL {
            assert!(
                !catalog.by_category(category).is_empty(),
                "no instrument for {category}"
            );
        }
    }

    #[test]
    fn standard_profiles_are_positive() {
        for p in InstrumentCatalog::standard().all() {
            assert!(p.base_price > 0.0, "{}", p.symbol);
            assert!(p.volatility > 0.0, "{}", p.symbol);
        }
    }

    #[test]
    fn get_returns_profile() {
        let catalog = InstrumentCatalog::standard();
        let gold = catalog.get("GOLD").unwrap();
        assert_eq!(gold.category, Category::PreciousMetals);
        assert!((gold.base_price - 1950.0).abs() < f64::EPSILON);
    }

    #[test]
    fn get_unknown_symbol_is_not_found() {
        let catalog = InstrumentCatalog::standard();
        let err = catalog.get("PLATINUM").unwrap_err();
        assert!(matches!(err, MarketError::NotFound { symbol } if symbol == "PLATINUM"));
    }

    #[test]
    fn new_rejects_duplicates() {
        let gold = InstrumentCatalog::standard().get("GOLD").unwrap().clone();
        let result = InstrumentCatalog::new(vec![gold.clone(), gold]);
        assert!(matches!(
            result,
            Err(MarketError::DuplicateSymbol { symbol }) if symbol == "GOLD"
        ));
    }

    #[test]
    fn new_rejects_unusable_profiles() {
        let gold = InstrumentCatalog::standard().get("GOLD").unwrap().clone();
        let broken = [
            InstrumentProfile { base_price: 0.0, ..gold.clone() },
            InstrumentProfile { base_price: -5.0, ..gold.clone() },
            InstrumentProfile { base_price: f64::INFINITY, ..gold.clone() },
            InstrumentProfile { volatility: -1.0, ..gold.clone() },
            InstrumentProfile { volatility: f64::NAN, ..gold.clone() },
            InstrumentProfile { reserves: -1.0, ..gold.clone() },
        ];
        for profile in broken {
            assert!(matches!(
                InstrumentCatalog::new(vec![profile]),
                Err(MarketError::ConfigInvalid { key, .. }) if key == "GOLD"
            ));
        }
        assert!(InstrumentCatalog::new(vec![InstrumentProfile { volatility: 0.0, ..gold }]).is_ok());
    }

    #[test]
    fn category_display() {
        assert_eq!(Category::PreciousMetals.to_string(), "Precious Metals");
        assert_eq!(Category::Softs.to_string(), "Softs");
    }
}
