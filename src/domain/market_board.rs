//! World equity indices and currency pairs shown next to the commodity quotes.
//!
//! Each refresh redraws every entry's move, uniformly within its kind's range,
//! and applies it to the level:
//!
//! - indices: change ~ U[-2, 2] percent
//! - currency pairs: change ~ U[-0.8, 0.8] percent

use crate::domain::error::MarketError;
use rand::Rng;
use std::fmt;
use tracing::debug;

pub const INDEX_MOVE_PCT: f64 = 2.0;
pub const CURRENCY_MOVE_PCT: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BoardKind {
    Index,
    Currency,
}

impl BoardKind {
    /// Largest absolute move per refresh, in percent.
    pub fn move_range(self) -> f64 {
        match self {
            BoardKind::Index => INDEX_MOVE_PCT,
            BoardKind::Currency => CURRENCY_MOVE_PCT,
        }
    }
}

impl fmt::Display for BoardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardKind::Index => f.pad("index"),
            BoardKind::Currency => f.pad("currency"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BoardEntry {
    pub name: String,
    pub kind: BoardKind,
    /// Market the index tracks; empty for currency pairs.
    pub region: String,
    pub level: f64,
    pub change_pct: f64,
}

impl BoardEntry {
    fn new(name: &str, kind: BoardKind, region: &str, level: f64) -> Self {
        Self {
            name: name.to_string(),
            kind,
            region: region.to_string(),
            level,
            change_pct: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketBoard {
    entries: Vec<BoardEntry>,
    refreshes: u64,
}

impl MarketBoard {
    /// Six equity indices followed by four currency pairs, all unchanged.
    pub fn standard() -> Self {
        use BoardKind::{Currency, Index};
        Self {
            entries: vec![
                BoardEntry::new("S&P 500", Index, "USA", 4500.0),
                BoardEntry::new("NASDAQ", Index, "USA Tech", 14000.0),
                BoardEntry::new("DAX", Index, "Germany", 16000.0),
                BoardEntry::new("CAC 40", Index, "France", 7200.0),
                BoardEntry::new("FTSE 100", Index, "UK", 7500.0),
                BoardEntry::new("Nikkei 225", Index, "Japan", 33000.0),
                BoardEntry::new("EUR/USD", Currency, "", 1.0850),
                BoardEntry::new("USD/JPY", Currency, "", 148.50),
                BoardEntry::new("GBP/USD", Currency, "", 1.2650),
                BoardEntry::new("USD/CHF", Currency, "", 0.8850),
            ],
            refreshes: 0,
        }
    }

    pub fn refresh<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for entry in &mut self.entries {
            let range = entry.kind.move_range();
            entry.change_pct = rng.gen_range(-range..=range);
            entry.level *= 1.0 + entry.change_pct / 100.0;
        }
        self.refreshes += 1;
        debug!(refresh = self.refreshes, "world markets refreshed");
    }

    pub fn all(&self) -> &[BoardEntry] {
        &self.entries
    }

    pub fn indices(&self) -> impl Iterator<Item = &BoardEntry> {
        self.by_kind(BoardKind::Index)
    }

    pub fn currencies(&self) -> impl Iterator<Item = &BoardEntry> {
        self.by_kind(BoardKind::Currency)
    }

    pub fn get(&self, name: &str) -> Result<&BoardEntry, MarketError> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| MarketError::not_found(name))
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    fn by_kind(&self, kind: BoardKind) -> impl Iterator<Item = &BoardEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }
}
