//! Simulated daily history and read-only queries over it.

use crate::domain::error::MarketError;
use crate::domain::instrument::Category;
use chrono::{Duration, NaiveDate};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HistoricalPricePoint {
    pub date: NaiveDate,
    pub symbol: String,
    pub category: Category,
    pub price: f64,
    pub volume: f64,
    /// |daily_vol - 1| * 100
    pub volatility_pct: f64,
}

/// All simulated points, grouped by symbol and ordered by date within a symbol.
#[derive(Debug, Clone, Default)]
pub struct HistoricalDataset {
    points: Vec<HistoricalPricePoint>,
    ranges: HashMap<String, Range<usize>>,
    symbols: Vec<String>,
}

impl HistoricalDataset {
    /// Builds a dataset from one series per symbol.
    ///
    /// Each series must hold a single symbol with strictly increasing dates.
    /// Empty series are ignored.
    pub fn from_series(series: Vec<Vec<HistoricalPricePoint>>) -> Result<Self, MarketError> {
        let mut dataset = Self::default();
        for points in series {
            dataset.push_series(points)?;
        }
        Ok(dataset)
    }

    fn push_series(&mut self, points: Vec<HistoricalPricePoint>) -> Result<(), MarketError> {
        let Some(first) = points.first() else {
            return Ok(());
        };
        let symbol = first.symbol.clone();
        if self.ranges.contains_key(&symbol) {
            return Err(MarketError::DuplicateSymbol { symbol });
        }

        for pair in points.windows(2) {
            if pair[1].symbol != symbol {
                return Err(MarketError::DuplicateSymbol {
                    symbol: pair[1].symbol.clone(),
                });
            }
            if pair[1].date <= pair[0].date {
                return Err(MarketError::InvalidRange {
                    start: pair[0].date,
                    end: pair[1].date,
                });
            }
        }

        let start = self.points.len();
        self.points.extend(points);
        self.ranges.insert(symbol.clone(), start..self.points.len());
        self.symbols.push(symbol);
        Ok(())
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn points(&self) -> &[HistoricalPricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.ranges.contains_key(symbol)
    }

    pub fn for_symbol(&self, symbol: &str) -> Result<&[HistoricalPricePoint], MarketError> {
        self.ranges
            .get(symbol)
            .map(|r| &self.points[r.clone()])
            .ok_or_else(|| MarketError::not_found(symbol))
    }

    pub fn prices(&self, symbol: &str) -> Result<Vec<f64>, MarketError> {
        Ok(self.for_symbol(symbol)?.iter().map(|p| p.price).collect())
    }

    pub fn last_point(&self, symbol: &str) -> Result<&HistoricalPricePoint, MarketError> {
        self.for_symbol(symbol)?
            .last()
            .ok_or_else(|| MarketError::not_found(symbol))
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.points.iter().map(|p| p.date).min()
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.points.iter().map(|p| p.date).max()
    }

    /// Points matching `filter`, symbol by symbol in dataset order.
    pub fn filter(&self, filter: &HistoryFilter) -> Result<Vec<&HistoricalPricePoint>, MarketError> {
        filter.validate()?;

        let selected: Vec<&str> = match &filter.symbols {
            Some(symbols) => {
                for s in symbols {
                    if !self.contains(s) {
                        return Err(MarketError::not_found(s.as_str()));
                    }
                }
                let wanted: HashSet<&str> = symbols.iter().map(String::as_str).collect();
                self.symbols
                    .iter()
                    .map(String::as_str)
                    .filter(|s| wanted.contains(s))
                    .collect()
            }
            None => self.symbols.iter().map(String::as_str).collect(),
        };

        let mut out = Vec::new();
        for symbol in selected {
            out.extend(
                self.for_symbol(symbol)?
                    .iter()
                    .filter(|p| filter.includes_date(p.date)),
            );
        }
        Ok(out)
    }
}

/// Symbol-set and date-range selection over a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    pub symbols: Option<Vec<String>>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl HistoryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols = Some(symbols.into_iter().map(Into::into).collect());
        self
    }

    pub fn from(mut self, date: NaiveDate) -> Self {
        self.from = Some(date);
        self
    }

    pub fn to(mut self, date: NaiveDate) -> Self {
        self.to = Some(date);
        self
    }

    pub fn with_lookback(mut self, lookback: Lookback, as_of: NaiveDate) -> Result<Self, MarketError> {
        if let Some(cutoff) = lookback.cutoff(as_of)? {
            self.from = Some(cutoff);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), MarketError> {
        match (self.from, self.to) {
            (Some(start), Some(end)) if end < start => Err(MarketError::InvalidRange { start, end }),
            _ => Ok(()),
        }
    }

    fn includes_date(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|f| date >= f) && self.to.is_none_or(|t| date <= t)
    }
}

/// Preset analysis periods, counted back from an as-of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    Years(u32),
    All,
}

impl Lookback {
    /// First included date, or `None` for the whole period.
    pub fn cutoff(self, as_of: NaiveDate) -> Result<Option<NaiveDate>, MarketError> {
        match self {
            Lookback::Years(n) => days_before(as_of, 365 * i64::from(n)).map(Some),
            Lookback::All => Ok(None),
        }
    }
}

/// `as_of` moved back by `days`, failing when the result leaves chrono's date range.
pub fn days_before(as_of: NaiveDate, days: i64) -> Result<NaiveDate, MarketError> {
    Duration::try_days(days)
        .and_then(|span| as_of.checked_sub_signed(span))
        .ok_or(MarketError::PeriodOutOfRange { as_of, days })
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Years(n) => write!(f, "{n}y"),
            Lookback::All => f.write_str("all"),
        }
    }
}

impl FromStr for Lookback {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "all" {
            return Ok(Lookback::All);
        }
        s.strip_suffix('y')
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .map(Lookback::Years)
            .ok_or_else(|| format!("invalid lookback '{s}', expected e.g. 1y, 3y or all"))
    }
}
