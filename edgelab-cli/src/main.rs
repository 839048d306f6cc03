//! EdgeLab CLI — run and scan commands.
//!
//! Commands:
//! - `run` — full pipeline over a bar CSV (or synthetic data): features,
//!   walk-forward training, backtest, metrics; optionally writes the
//!   report as JSON
//! - `scan` — rolling z-score anomaly scan over a metric CSV

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use edgelab_core::anomaly::{AnomalyConfig, AnomalyDetector};
use edgelab_runner::config::RunConfig;
use edgelab_runner::data::{load_bars_csv, load_metric_csv, synthetic_bars};
use edgelab_runner::pipeline::{run_pipeline, PipelineReport};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "edgelab", about = "EdgeLab — signal research and risk engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: features, walk-forward training, backtest.
    Run {
        /// Path to a bar CSV (timestamp,open,high,low,close,volume).
        #[arg(long, conflicts_with = "synthetic")]
        data: Option<PathBuf>,

        /// Generate this many synthetic bars instead of loading a file.
        #[arg(long)]
        synthetic: Option<usize>,

        /// Path to a TOML run config. Defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Optional auxiliary metric CSV (timestamp,value), one row per
        /// bar, used as an extra feature column.
        #[arg(long)]
        aux: Option<PathBuf>,

        /// Write the full report as JSON to this path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Scan a metric series for rolling z-score anomalies.
    Scan {
        /// Path to a metric CSV (timestamp,value).
        #[arg(long)]
        data: PathBuf,

        /// Rolling baseline window, in observations.
        #[arg(long, default_value_t = 20)]
        window: usize,

        /// Z-score at which a Building alert fires.
        #[arg(long, default_value_t = 2.0)]
        building: f64,

        /// Z-score at which an Extreme alert fires.
        #[arg(long, default_value_t = 3.0)]
        extreme: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            synthetic,
            config,
            aux,
            output,
        } => run_cmd(data, synthetic, config, aux, output),
        Commands::Scan {
            data,
            window,
            building,
            extreme,
        } => scan_cmd(data, window, building, extreme),
    }
}

fn run_cmd(
    data: Option<PathBuf>,
    synthetic: Option<usize>,
    config_path: Option<PathBuf>,
    aux_path: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {}", path.display()))?;
            RunConfig::from_toml_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => RunConfig::default(),
    };

    let bars = match (data, synthetic) {
        (Some(path), None) => load_bars_csv(&path)
            .with_context(|| format!("loading bars from {}", path.display()))?,
        (None, Some(n)) => {
            eprintln!("WARNING: running on {n} synthetic bars");
            synthetic_bars(n, config.seed)
        }
        (None, None) => bail!("one of --data or --synthetic is required"),
        (Some(_), Some(_)) => unreachable!("clap enforces the conflict"),
    };

    let aux_values = match aux_path {
        Some(path) => {
            let series = load_metric_csv(&path)
                .with_context(|| format!("loading metric from {}", path.display()))?;
            if series.len() != bars.len() {
                bail!(
                    "auxiliary series has {} rows but there are {} bars",
                    series.len(),
                    bars.len()
                );
            }
            Some(series.into_iter().map(|(_, v)| v).collect::<Vec<f64>>())
        }
        None => None,
    };

    println!("Run {} over {} bars...", &config.run_id()[..12], bars.len());
    let report = run_pipeline(&bars, aux_values.as_deref(), &config)?;
    print_summary(&report);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing report to {}", path.display()))?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn scan_cmd(data: PathBuf, window: usize, building: f64, extreme: f64) -> Result<()> {
    let series = load_metric_csv(&data)
        .with_context(|| format!("loading metric from {}", data.display()))?;

    let mut detector = AnomalyDetector::new(AnomalyConfig {
        window,
        building_threshold: building,
        extreme_threshold: extreme,
    })?;
    let alerts = detector.scan(&series);

    println!(
        "Scanned {} observations (window {window}): {} alert(s)",
        series.len(),
        alerts.len()
    );
    for alert in &alerts {
        println!(
            "{}  {:<8}  value={:.4}  z={:+.2}  (baseline {:.4} ± {:.4})",
            alert.timestamp,
            format!("{:?}", alert.severity),
            alert.value,
            alert.z_score,
            alert.rolling_mean,
            alert.rolling_std,
        );
    }

    Ok(())
}

fn print_summary(report: &PipelineReport) {
    println!();
    println!("=== Run {} ===", &report.run_id[..12]);
    println!("Bars:           {}", report.bar_count);
    println!("Samples:        {}", report.sample_count);
    println!("Windows:        {}", report.windows.len());
    println!("Predictions:    {}", report.records.len());
    println!();
    println!("--- Classification ---");
    println!("Accuracy:       {:.1}%", report.accuracy * 100.0);
    println!("Precision:      {:.1}%", report.precision * 100.0);
    println!("Recall:         {:.1}%", report.recall * 100.0);
    println!();
    println!("--- Strategy ---");
    println!("Total Return:   {:.2}%", report.strategy.total_return * 100.0);
    println!("Max Drawdown:   {:.2}%", report.strategy.max_drawdown * 100.0);
    println!("Sharpe:         {:.3}", report.strategy.sharpe);
    println!("Win Rate:       {:.1}%", report.strategy.win_rate * 100.0);
    println!("Profit Factor:  {:.2}", report.strategy.profit_factor);
    println!("Trades:         {}", report.strategy.trade_count);
    println!();
}
