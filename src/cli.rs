//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use tracing::info;

use crate::adapters::csv_adapter::{self, CsvExportAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analytics::{self, DEFAULT_RECENT_DAYS};
use crate::domain::config::build_engine_config;
use crate::domain::engine::{EngineConfig, MarketEngine};
use crate::domain::error::MarketError;
use crate::domain::history::{HistoryFilter, Lookback};
use crate::domain::instrument::InstrumentCatalog;
use crate::domain::live_quote::ChangeDirection;
use crate::domain::regime::RegimeModel;
use crate::ports::export_port::ExportPort;

#[derive(Parser, Debug)]
#[command(name = "commodity-sim", about = "Commodity market simulator and analytics")]
pub struct Cli {
    /// INI config file; every key is optional
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Seed for reproducible runs
    #[arg(long, global = true)]
    pub seed: Option<u64>,
    /// First simulated day (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub start: Option<NaiveDate>,
    /// Last simulated day (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub end: Option<NaiveDate>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List instruments, supply figures and the regime table
    Catalog,
    /// Print or export simulated daily history as CSV
    History {
        /// Symbol to include; repeat for several, omit for all
        #[arg(short, long = "symbol")]
        symbols: Vec<String>,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Period counted back from the last simulated day: 1y, 2y, 3y or all
        #[arg(long)]
        lookback: Option<Lookback>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show moving averages, RSI and Bollinger Bands for one symbol
    Indicators {
        #[arg(short, long)]
        symbol: String,
        /// Number of most recent days to print
        #[arg(long, default_value_t = 10)]
        last: usize,
        /// Write the full series as CSV instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Refresh live quotes and report alerts
    Watch {
        #[arg(long, default_value_t = 10)]
        ticks: u64,
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
        /// Alert threshold in percent; overrides [alerts] threshold_pct
        #[arg(long)]
        threshold: Option<f64>,
        /// Write the final quotes as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also show world indices and currency pairs
        #[arg(long)]
        world: bool,
    },
    /// Market overview: movers, performance, volatility and price ranges
    Summary {
        #[arg(long, default_value_t = DEFAULT_RECENT_DAYS)]
        recent_days: i64,
    },
}

/// CLI values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub seed: Option<u64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub threshold: Option<f64>,
    pub world_markets: Option<bool>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(start) = self.start {
            config.start = start;
        }
        if let Some(end) = self.end {
            config.end = end;
        }
        if let Some(threshold) = self.threshold {
            config.alert_threshold = threshold;
        }
        if let Some(world) = self.world_markets {
            config.world_markets = world;
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn execute(cli: Cli) -> Result<(), MarketError> {
    let mut overrides = ConfigOverrides {
        seed: cli.seed,
        start: cli.start,
        end: cli.end,
        threshold: None,
        world_markets: None,
    };
    if let Command::Watch { threshold, world, .. } = &cli.command {
        overrides.threshold = *threshold;
        if *world {
            overrides.world_markets = Some(true);
        }
    }
    let config = resolve_config(cli.config.as_deref(), &overrides)?;

    match cli.command {
        Command::Catalog => run_catalog(&config),
        Command::History {
            symbols,
            from,
            to,
            lookback,
            output,
        } => {
            let (engine, _) = start_engine(config)?;
            run_history(&engine, symbols, from, to, lookback, output.as_deref())
        }
        Command::Indicators {
            symbol,
            last,
            output,
        } => {
            let (engine, _) = start_engine(config)?;
            run_indicators(&engine, &symbol, last, output.as_deref())
        }
        Command::Watch {
            ticks,
            interval_ms,
            output,
            ..
        } => {
            let (mut engine, mut rng) = start_engine(config)?;
            run_watch(&mut engine, &mut rng, ticks, interval_ms, output.as_deref())
        }
        Command::Summary { recent_days } => {
            let (engine, _) = start_engine(config)?;
            run_summary(&engine, recent_days)
        }
    }
}

/// The engine plus the random source that keeps driving its ticks.
fn start_engine(config: EngineConfig) -> Result<(MarketEngine, StdRng), MarketError> {
    let mut rng = make_rng(config.seed);
    let engine = MarketEngine::new(config, &mut rng)?;
    Ok((engine, rng))
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, MarketError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Config file values, then CLI overrides, validated together.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<EngineConfig, MarketError> {
    let adapter = load_config(path)?;
    let mut config = build_engine_config(&adapter)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn run_catalog(config: &EngineConfig) -> Result<(), MarketError> {
    let regime = RegimeModel::standard(config.regime_base_year)?;
    let catalog = InstrumentCatalog::standard();

    println!(
        "{:<9} {:<22} {:<18} {:<12} {:>10} {:>7} {:>9}",
        "SYMBOL", "NAME", "CATEGORY", "UNIT", "BASE", "VOL%", "RESERVE%"
    );
    for (profile, share) in catalog.all().iter().zip(analytics::supply_overview(&catalog)) {
        println!(
            "{:<9} {:<22} {:<18} {:<12} {:>10.2} {:>7.1} {:>9.1}",
            profile.symbol,
            profile.name,
            profile.category.to_string(),
            profile.unit,
            profile.base_price,
            profile.volatility,
            share.reserve_share_pct,
        );
    }

    println!("\nRegimes (first match wins):");
    for rule in regime.rules() {
        println!(
            "  {:<13} {:<26} {:<18} {}",
            rule.name,
            rule.window.to_string(),
            rule.instruments.to_string(),
            rule.distribution
        );
    }
    Ok(())
}

fn run_history(
    engine: &MarketEngine,
    symbols: Vec<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    lookback: Option<Lookback>,
    output: Option<&Path>,
) -> Result<(), MarketError> {
    let history = engine.history();
    let mut filter = HistoryFilter::all();
    if !symbols.is_empty() {
        filter = filter.with_symbols(symbols.into_iter().map(|s| s.to_uppercase()));
    }
    if let (Some(lookback), Some(as_of)) = (lookback, history.end_date()) {
        filter = filter.with_lookback(lookback, as_of)?;
    }
    if let Some(from) = from {
        filter = filter.from(from);
    }
    if let Some(to) = to {
        filter = filter.to(to);
    }

    let points = history.filter(&filter)?;
    match output {
        Some(path) => CsvExportAdapter::new().export_history(&points, path),
        None => csv_adapter::write_history(io::stdout().lock(), &points),
    }
}

fn run_indicators(
    engine: &MarketEngine,
    symbol: &str,
    last: usize,
    output: Option<&Path>,
) -> Result<(), MarketError> {
    let snapshot = engine.indicators(&symbol.to_uppercase())?;
    if let Some(path) = output {
        return CsvExportAdapter::new().export_indicators(&snapshot, path);
    }

    let labels: Vec<String> = engine
        .config()
        .indicators
        .indicator_types()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("{} ({})", snapshot.symbol, labels.join(", "));
    println!(
        "{:<10} {:>10} {:>10} {:>10} {:>7} {:>10} {:>10}",
        "DATE", "PRICE", "MA_SHORT", "MA_LONG", "RSI", "BB_UPPER", "BB_LOWER"
    );
    let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
    for i in snapshot.len().saturating_sub(last)..snapshot.len() {
        println!(
            "{:<10} {:>10.2} {:>10} {:>10} {:>7} {:>10} {:>10}",
            snapshot.dates[i],
            snapshot.prices[i],
            fmt(snapshot.ma_short[i]),
            fmt(snapshot.ma_long[i]),
            fmt(snapshot.rsi[i]),
            fmt(snapshot.bollinger.upper[i]),
            fmt(snapshot.bollinger.lower[i]),
        );
    }
    Ok(())
}

fn run_watch(
    engine: &mut MarketEngine,
    rng: &mut StdRng,
    ticks: u64,
    interval_ms: u64,
    output: Option<&Path>,
) -> Result<(), MarketError> {
    for n in 0..ticks {
        let report = engine.tick(rng);
        println!("tick {} ({} updated)", report.tick, report.updated.len());
        for quote in engine.quotes() {
            let arrow = match quote.direction() {
                ChangeDirection::Up => "▲",
                ChangeDirection::Down => "▼",
                ChangeDirection::Flat => "-",
            };
            println!(
                "  {:<9} {:>12.4} {} {:>+6.2}%  vol {:>12.0}",
                quote.symbol, quote.price, arrow, quote.change_pct, quote.day_volume
            );
        }
        if let Some(board) = engine.world_markets() {
            for entry in board.all() {
                println!(
                    "  {:<9} {:<10} {:>12.4} {:>+6.2}%",
                    entry.kind, entry.name, entry.level, entry.change_pct
                );
            }
        }
        for alert in engine.default_alerts()? {
            println!(
                "  ALERT {} {} {:+.2}%",
                alert.symbol, alert.severity, alert.magnitude
            );
        }
        if interval_ms > 0 && n + 1 < ticks {
            thread::sleep(Duration::from_millis(interval_ms));
        }
    }

    if let Some(path) = output {
        CsvExportAdapter::new().export_quotes(engine.quotes(), path)?;
    }
    Ok(())
}

fn run_summary(engine: &MarketEngine, recent_days: i64) -> Result<(), MarketError> {
    let summary = engine.summary();
    println!("Market summary ({} instruments)", summary.instruments);
    println!("  average change: {:+.2}%", summary.average_change_pct);
    println!("  total volume:   {:.0}", summary.total_day_volume);
    println!(
        "  advancing {} / declining {}",
        summary.advancing, summary.declining
    );
    if let (Some(top), Some(bottom)) = (&summary.strongest, &summary.weakest) {
        println!("  strongest: {} {:+.2}%", top.symbol, top.change_pct);
        println!("  weakest:   {} {:+.2}%", bottom.symbol, bottom.change_pct);
    }

    println!("\nBy category:");
    for (category, quotes) in analytics::quotes_by_category(engine.quotes()) {
        let members: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
        println!("  {:<18} {}", category.to_string(), members.join(", "));
    }

    let history = engine.history();
    let as_of = history.end_date().unwrap_or(engine.config().end);
    let performance = analytics::relative_performance(history)?;
    let average = analytics::average_volatility(history)?;
    let recent = analytics::recent_volatility(history, as_of, recent_days)?;

    println!(
        "\n{:<9} {:>12} {:>10} {:>12}",
        "SYMBOL", "PERF%", "AVG VOL%", "RECENT VOL"
    );
    for ((perf, avg), rec) in performance.iter().zip(&average).zip(&recent) {
        let recent = rec
            .value
            .map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
        println!(
            "{:<9} {:>+12.2} {:>10.3} {:>12}",
            perf.symbol, perf.value, avg.value, recent
        );
    }

    println!(
        "\n{:<18} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "CATEGORY", "MIN", "Q1", "MEDIAN", "Q3", "MAX"
    );
    for dist in analytics::category_price_distribution(history) {
        println!(
            "{:<18} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            dist.category.to_string(),
            dist.min,
            dist.q1,
            dist.median,
            dist.q3,
            dist.max
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_file_values() {
        let mut config = EngineConfig::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        );
        let overrides = ConfigOverrides {
            seed: Some(5),
            start: NaiveDate::from_ymd_opt(2020, 6, 1),
            end: None,
            threshold: Some(1.0),
            world_markets: Some(true),
        };
        overrides.apply(&mut config);
        assert_eq!(config.seed, Some(5));
        assert_eq!(config.start, NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        assert_eq!(config.end, NaiveDate::from_ymd_opt(2020, 12, 31).unwrap());
        assert_eq!(config.alert_threshold, 1.0);
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "commodity-sim",
            "history",
            "--symbol",
            "gold",
            "--lookback",
            "2y",
            "--seed",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(3));
        match cli.command {
            Command::History {
                symbols, lookback, ..
            } => {
                assert_eq!(symbols, vec!["gold"]);
                assert_eq!(lookback, Some(Lookback::Years(2)));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_lookback() {
        let result = Cli::try_parse_from(["commodity-sim", "history", "--lookback", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn seeded_rngs_agree() {
        use rand::Rng;
        let a: u64 = make_rng(Some(11)).gen_range(0..u64::MAX);
        let b: u64 = make_rng(Some(11)).gen_range(0..u64::MAX);
        assert_eq!(a, b);
    }
}
