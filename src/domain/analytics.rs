//! Read-only aggregates over the dataset, the catalog and the live quotes.

use crate::domain::error::MarketError;
use crate::domain::history::{HistoricalDataset, days_before};
use crate::domain::instrument::{Category, InstrumentCatalog};
use crate::domain::live_quote::CurrentQuote;
use chrono::NaiveDate;

pub const DEFAULT_RECENT_DAYS: i64 = 30;

/// Per-symbol scalar, in dataset symbol order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SymbolValue<T> {
    pub symbol: String,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PriceDistribution {
    pub category: Category,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SupplyShare {
    pub symbol: String,
    pub name: String,
    pub production: f64,
    pub reserves: f64,
    /// Share of the catalog's total reserves, in percent.
    pub reserve_share_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Mover {
    pub symbol: String,
    pub change_pct: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MarketSummary {
    pub instruments: usize,
    pub average_change_pct: f64,
    pub total_day_volume: f64,
    pub advancing: usize,
    pub declining: usize,
    pub strongest: Option<Mover>,
    pub weakest: Option<Mover>,
}

/// Percent move from the first to the last price of each symbol.
pub fn relative_performance(
    dataset: &HistoricalDataset,
) -> Result<Vec<SymbolValue<f64>>, MarketError> {
    dataset
        .symbols()
        .iter()
        .map(|symbol| {
            let points = dataset.for_symbol(symbol)?;
            let value = match (points.first(), points.last()) {
                (Some(first), Some(last)) if first.price > 0.0 => {
                    (last.price - first.price) / first.price * 100.0
                }
                _ => 0.0,
            };
            Ok(SymbolValue {
                symbol: symbol.clone(),
                value,
            })
        })
        .collect()
}

pub fn average_volatility(
    dataset: &HistoricalDataset,
) -> Result<Vec<SymbolValue<f64>>, MarketError> {
    dataset
        .symbols()
        .iter()
        .map(|symbol| {
            let vols: Vec<f64> = dataset
                .for_symbol(symbol)?
                .iter()
                .map(|p| p.volatility_pct)
                .collect();
            Ok(SymbolValue {
                symbol: symbol.clone(),
                value: mean(&vols).unwrap_or(0.0),
            })
        })
        .collect()
}

/// Sample std of `volatility_pct` over points dated after `as_of - days`.
///
/// `None` when fewer than two points fall in the window.
pub fn recent_volatility(
    dataset: &HistoricalDataset,
    as_of: NaiveDate,
    days: i64,
) -> Result<Vec<SymbolValue<Option<f64>>>, MarketError> {
    let cutoff = days_before(as_of, days)?;
    dataset
        .symbols()
        .iter()
        .map(|symbol| {
            let vols: Vec<f64> = dataset
                .for_symbol(symbol)?
                .iter()
                .filter(|p| p.date > cutoff && p.date <= as_of)
                .map(|p| p.volatility_pct)
                .collect();
            Ok(SymbolValue {
                symbol: symbol.clone(),
                value: sample_std(&vols),
            })
        })
        .collect()
}

/// Five-number summary of prices per category, in [`Category::ALL`] order.
/// Categories without points are skipped.
pub fn category_price_distribution(dataset: &HistoricalDataset) -> Vec<PriceDistribution> {
    Category::ALL
        .iter()
        .filter_map(|&category| {
            let mut prices: Vec<f64> = dataset
                .points()
                .iter()
                .filter(|p| p.category == category)
                .map(|p| p.price)
                .collect();
            if prices.is_empty() {
                return None;
            }
            prices.sort_by(f64::total_cmp);
            Some(PriceDistribution {
                category,
                count: prices.len(),
                min: prices[0],
                q1: quantile(&prices, 0.25),
                median: quantile(&prices, 0.5),
                q3: quantile(&prices, 0.75),
                max: prices[prices.len() - 1],
            })
        })
        .collect()
}

pub fn supply_overview(catalog: &InstrumentCatalog) -> Vec<SupplyShare> {
    let total: f64 = catalog.all().iter().map(|p| p.reserves).sum();
    catalog
        .all()
        .iter()
        .map(|p| SupplyShare {
            symbol: p.symbol.clone(),
            name: p.name.clone(),
            production: p.production,
            reserves: p.reserves,
            reserve_share_pct: if total > 0.0 {
                p.reserves / total * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Ties on the strongest or weakest move go to the earlier quote.
pub fn market_summary(quotes: &[CurrentQuote]) -> MarketSummary {
    let changes: Vec<f64> = quotes.iter().map(|q| q.change_pct).collect();

    let mut strongest: Option<&CurrentQuote> = None;
    let mut weakest: Option<&CurrentQuote> = None;
    for quote in quotes {
        if strongest.is_none_or(|s| quote.change_pct > s.change_pct) {
            strongest = Some(quote);
        }
        if weakest.is_none_or(|w| quote.change_pct < w.change_pct) {
            weakest = Some(quote);
        }
    }
    let mover = |q: &CurrentQuote| Mover {
        symbol: q.symbol.clone(),
        change_pct: q.change_pct,
    };

    MarketSummary {
        instruments: quotes.len(),
        average_change_pct: mean(&changes).unwrap_or(0.0),
        total_day_volume: quotes.iter().map(|q| q.day_volume).sum(),
        advancing: changes.iter().filter(|&&c| c > 0.0).count(),
        declining: changes.iter().filter(|&&c| c < 0.0).count(),
        strongest: strongest.map(mover),
        weakest: weakest.map(mover),
    }
}

/// Groups quotes by category in order of first appearance.
pub fn quotes_by_category(quotes: &[CurrentQuote]) -> Vec<(Category, Vec<&CurrentQuote>)> {
    let mut groups: Vec<(Category, Vec<&CurrentQuote>)> = Vec::new();
    for quote in quotes {
        match groups.iter_mut().find(|(c, _)| *c == quote.category) {
            Some((_, members)) => members.push(quote),
            None => groups.push((quote.category, vec![quote])),
        }
    }
    groups
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
