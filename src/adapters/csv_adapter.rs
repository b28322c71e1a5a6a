//! CSV export adapter.
//!
//! The `write_*` functions take any [`io::Write`] so the CLI can stream to
//! stdout; [`CsvExportAdapter`] opens files for the [`ExportPort`].

use crate::domain::error::MarketError;
use crate::domain::history::HistoricalPricePoint;
use crate::domain::indicator::IndicatorSeries;
use crate::domain::indicator_helpers::TechnicalSnapshot;
use crate::domain::live_quote::CurrentQuote;
use crate::ports::export_port::ExportPort;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::info;

pub const HISTORY_HEADER: [&str; 6] = ["date", "symbol", "category", "price", "volume", "volatility_pct"];
pub const QUOTE_HEADER: [&str; 8] = [
    "symbol", "name", "category", "unit", "price", "change_pct", "day_volume", "spread",
];
pub const INDICATOR_HEADER: [&str; 9] = [
    "date", "price", "ma_short", "ma_long", "rsi", "bb_upper", "bb_middle", "bb_lower", "symbol",
];

pub struct CsvExportAdapter;

impl CsvExportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvExportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn create(path: &Path) -> Result<File, MarketError> {
    File::create(path).map_err(|e| MarketError::Export {
        reason: format!("failed to create {}: {}", path.display(), e),
    })
}

impl ExportPort for CsvExportAdapter {
    fn export_history(
        &self,
        points: &[&HistoricalPricePoint],
        output_path: &Path,
    ) -> Result<(), MarketError> {
        write_history(create(output_path)?, points)?;
        info!(rows = points.len(), path = %output_path.display(), "exported history");
        Ok(())
    }

    fn export_quotes(&self, quotes: &[CurrentQuote], output_path: &Path) -> Result<(), MarketError> {
        write_quotes(create(output_path)?, quotes)?;
        info!(rows = quotes.len(), path = %output_path.display(), "exported quotes");
        Ok(())
    }

    fn export_indicators(
        &self,
        snapshot: &TechnicalSnapshot,
        output_path: &Path,
    ) -> Result<(), MarketError> {
        write_indicators(create(output_path)?, snapshot)?;
        info!(rows = snapshot.len(), path = %output_path.display(), "exported indicators");
        Ok(())
    }
}

pub fn write_history<W: io::Write>(
    writer: W,
    points: &[&HistoricalPricePoint],
) -> Result<(), MarketError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HISTORY_HEADER).map_err(export_error)?;
    for p in points {
        wtr.write_record([
            p.date.to_string(),
            p.symbol.clone(),
            p.category.to_string(),
            p.price.to_string(),
            p.volume.to_string(),
            p.volatility_pct.to_string(),
        ])
        .map_err(export_error)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_quotes<W: io::Write>(writer: W, quotes: &[CurrentQuote]) -> Result<(), MarketError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(QUOTE_HEADER).map_err(export_error)?;
    for q in quotes {
        wtr.write_record([
            q.symbol.clone(),
            q.name.clone(),
            q.category.to_string(),
            q.unit.clone(),
            q.price.to_string(),
            q.change_pct.to_string(),
            q.day_volume.to_string(),
            q.spread.to_string(),
        ])
        .map_err(export_error)?;
    }
    wtr.flush()?;
    Ok(())
}

/// One row per date; undefined indicator values are left blank.
pub fn write_indicators<W: io::Write>(
    writer: W,
    snapshot: &TechnicalSnapshot,
) -> Result<(), MarketError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(INDICATOR_HEADER).map_err(export_error)?;
    let cell = |series: &IndicatorSeries, i: usize| {
        series[i].map(|v| v.to_string()).unwrap_or_default()
    };
    for i in 0..snapshot.len() {
        wtr.write_record([
            snapshot.dates[i].to_string(),
            snapshot.prices[i].to_string(),
            cell(&snapshot.ma_short, i),
            cell(&snapshot.ma_long, i),
            cell(&snapshot.rsi, i),
            cell(&snapshot.bollinger.upper, i),
            cell(&snapshot.bollinger.middle, i),
            cell(&snapshot.bollinger.lower, i),
            snapshot.symbol.clone(),
        ])
        .map_err(export_error)?;
    }
    wtr.flush()?;
    Ok(())
}

fn export_error(e: csv::Error) -> MarketError {
    MarketError::Export {
        reason: format!("CSV write error: {}", e),
    }
}
