//! TrendSignal CLI: evaluate, scan, and config commands.
//!
//! Commands:
//! - `evaluate`: run the trading cycle against a candle file
//! - `scan`: replay candle files and list every signal the cycle would emit
//! - `config`: print a runner config with defaults filled in

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use trendsignal_core::collaborators::OrderSink;
use trendsignal_core::fusion::{FilterStyle, Preset};
use trendsignal_core::EngineConfig;
use trendsignal_runner::{
    load_series, scan_many, CsvCandleSource, CycleOutcome, FixedPositions, JsonlSink, LogSink,
    OrderRecord, RunnerConfig, ScanJob, TradingCycle,
};

#[derive(Parser)]
#[command(
    name = "trendsignal",
    about = "TrendSignal CLI: streaming trend signal engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the newest closed bar of a candle file and submit any signal.
    Evaluate {
        /// CSV candle file (timestamp,open,high,low,close,volume).
        #[arg(long)]
        candles: PathBuf,

        /// Runner TOML config. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbol. Defaults to the config's symbol, then the file stem.
        #[arg(long)]
        symbol: Option<String>,

        /// Preset override: confirmed, all_signals.
        #[arg(long)]
        preset: Option<String>,

        /// Filter style override, e.g. trend_strength, trend_confluence.
        #[arg(long)]
        filter_style: Option<String>,

        /// Append submitted orders to this JSONL file instead of logging them.
        #[arg(long)]
        orders_out: Option<PathBuf>,

        /// Open positions reported for the symbol; signals are suppressed when > 0.
        #[arg(long, default_value_t = 0)]
        open_positions: usize,

        /// Re-run the cycle every N seconds instead of once.
        #[arg(long)]
        poll_secs: Option<u64>,
    },
    /// Replay candle files bar by bar and print every signal as JSONL.
    Scan {
        /// CSV candle files; each file stem is used as the symbol.
        #[arg(long, required = true, num_args = 1..)]
        candles: Vec<PathBuf>,

        /// Runner TOML config. Only its engine table and window are used.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Window override (candles fetched per live cycle).
        #[arg(long)]
        window: Option<usize>,
    },
    /// Print a runner config as TOML.
    Config {
        #[arg(long, default_value = "BTCUSDT")]
        symbol: String,

        #[arg(long)]
        preset: Option<String>,

        #[arg(long)]
        filter_style: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            candles,
            config,
            symbol,
            preset,
            filter_style,
            orders_out,
            open_positions,
            poll_secs,
        } => {
            let mut runner = load_config(config.as_deref(), preset.as_deref(), filter_style.as_deref())?;
            if let Some(symbol) = symbol.or_else(|| config.is_none().then(|| file_symbol(&candles))) {
                runner.symbol = symbol;
            }
            let poll = poll_secs.map(Duration::from_secs);
            let source = CsvCandleSource::new(runner.symbol.clone(), candles);
            let sentinel = FixedPositions(open_positions);
            match orders_out {
                Some(path) => run_evaluate(&runner, source, sentinel, JsonlSink::new(path), poll),
                None => run_evaluate(&runner, source, sentinel, LogSink, poll),
            }
        }
        Commands::Scan {
            candles,
            config,
            window,
        } => run_scan(&candles, config.as_deref(), window),
        Commands::Config {
            symbol,
            preset,
            filter_style,
        } => {
            let mut runner = load_config(None, preset.as_deref(), filter_style.as_deref())?;
            runner.symbol = symbol;
            print!("{}", runner.to_toml()?);
            Ok(())
        }
    }
}

/// Load the runner config (or defaults) and apply command-line overrides.
fn load_config(path: Option<&Path>, preset: Option<&str>, filter_style: Option<&str>) -> Result<RunnerConfig> {
    let mut config = match path {
        Some(path) => RunnerConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => RunnerConfig::new("UNKNOWN", EngineConfig::default()),
    };
    if let Some(name) = preset {
        config.engine.preset = name.parse::<Preset>()?;
    }
    if let Some(name) = filter_style {
        config.engine.filter_style = name.parse::<FilterStyle>()?;
    }
    config.validate()?;
    Ok(config)
}

fn file_symbol(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

fn run_evaluate<O: OrderSink>(
    config: &RunnerConfig,
    source: CsvCandleSource,
    sentinel: FixedPositions,
    sink: O,
    poll: Option<Duration>,
) -> Result<()> {
    let mut cycle = TradingCycle::from_config(config, source, sentinel, sink)?;
    info!(
        symbol = %config.symbol,
        window = config.window,
        preset = %config.engine.preset,
        filter_style = %config.engine.filter_style,
        config = %cycle.engine().fingerprint(),
        "evaluating"
    );

    loop {
        let outcome = cycle.run_once().context("trading cycle failed")?;
        print_outcome(&outcome)?;
        match poll {
            Some(interval) => std::thread::sleep(interval),
            None => return Ok(()),
        }
    }
}

fn print_outcome(outcome: &CycleOutcome) -> Result<()> {
    match outcome {
        CycleOutcome::NotReady { available, required } => {
            println!("not ready: {available} closed candles, {required} required");
        }
        CycleOutcome::AlreadyEvaluated => println!("no new closed bar"),
        CycleOutcome::NoSignal => println!("no signal"),
        CycleOutcome::Suppressed {
            open_positions,
            signal,
        } => {
            println!(
                "{} suppressed: {open_positions} open position(s)",
                signal.kind
            );
        }
        CycleOutcome::Submitted(signal) => {
            println!("{}", serde_json::to_string_pretty(signal)?);
        }
        CycleOutcome::SubmitFailed { signal, reason } => {
            println!("{} not submitted: {reason}", signal.kind);
        }
    }
    Ok(())
}

fn run_scan(paths: &[PathBuf], config_path: Option<&Path>, window: Option<usize>) -> Result<()> {
    let mut config = load_config(config_path, None, None)?;
    if let Some(window) = window {
        config.window = window;
        config.validate()?;
    }

    let jobs = paths
        .iter()
        .map(|path| {
            Ok(ScanJob {
                symbol: file_symbol(path),
                series: load_series(path)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut failed = 0;
    for (symbol, result) in scan_many(&jobs, &config.engine, config.window) {
        match result {
            Ok(report) => {
                for signal in report.signals {
                    let record = OrderRecord {
                        symbol: symbol.clone(),
                        signal,
                    };
                    println!("{}", serde_json::to_string(&record)?);
                }
            }
            Err(e) => {
                eprintln!("Error for {symbol}: {e}");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} scans failed", jobs.len());
    }
    Ok(())
}
