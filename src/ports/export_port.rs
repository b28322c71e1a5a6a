//! Snapshot export port.

use crate::domain::error::MarketError;
use crate::domain::history::HistoricalPricePoint;
use crate::domain::indicator_helpers::TechnicalSnapshot;
use crate::domain::live_quote::CurrentQuote;
use std::path::Path;

/// Port for writing engine snapshots for an external renderer.
pub trait ExportPort {
    fn export_history(
        &self,
        points: &[&HistoricalPricePoint],
        output_path: &Path,
    ) -> Result<(), MarketError>;

    fn export_quotes(&self, quotes: &[CurrentQuote], output_path: &Path) -> Result<(), MarketError>;

    fn export_indicators(
        &self,
        snapshot: &TechnicalSnapshot,
        output_path: &Path,
    ) -> Result<(), MarketError>;
}
