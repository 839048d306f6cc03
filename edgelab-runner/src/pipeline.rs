//! End-to-end run: bars in, evaluated strategy report out.
//!
//! Features → labels → dataset → walk-forward training → signal
//! mapping → backtest → metrics. Every stage is deterministic given
//! the config, so the report's `run_id` fully identifies its inputs.

use crate::config::{ConfigError, RunConfig};
use crate::metrics::{ConfusionMatrix, StrategyMetrics};
use crate::walk_forward::{WalkForwardError, WalkForwardTrainer, WindowSpec};
use edgelab_core::backtest::{signals_from_predictions, BacktestEngine, BacktestError, BacktestOutcome};
use edgelab_core::domain::{Bar, PredictionRecord};
use edgelab_core::features::{label_bars, Dataset, FeatureBuilder, FeatureError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    WalkForward(#[from] WalkForwardError),

    #[error(transparent)]
    Backtest(#[from] BacktestError),
}

/// Everything one run produces, serializable as a single JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Content hash of the `RunConfig` that produced this report.
    pub run_id: String,
    pub bar_count: usize,
    pub sample_count: usize,
    pub windows: Vec<WindowSpec>,
    pub records: Vec<PredictionRecord>,
    pub confusion: ConfusionMatrix,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub backtest: BacktestOutcome,
    pub strategy: StrategyMetrics,
}

/// Run the full pipeline over a bar series.
///
/// `aux` is an optional per-bar auxiliary metric (e.g. a sentiment
/// score); when present it must be as long as `bars` and becomes one
/// more feature column.
pub fn run_pipeline(
    bars: &[Bar],
    aux: Option<&[f64]>,
    config: &RunConfig,
) -> Result<PipelineReport, PipelineError> {
    config.validate()?;

    let features = FeatureBuilder::new(config.feature.clone()).build(bars, aux)?;
    let labels = label_bars(bars, config.feature.label_horizon, config.feature.label_threshold);
    let dataset = Dataset::assemble(&features, &labels);

    let trainer = WalkForwardTrainer::new(
        config.walk_forward.clone(),
        config.models.clone(),
        config.seed,
    );
    let outcome = trainer.run(&dataset)?;

    let signals = signals_from_predictions(bars, &outcome.records, config.signal_threshold);
    let backtest = BacktestEngine::new(config.backtest.clone())?.run(bars, &signals)?;

    let confusion = ConfusionMatrix::from_records(&outcome.records);
    let strategy = StrategyMetrics::compute(&backtest.equity_curve, &backtest.trades);

    Ok(PipelineReport {
        run_id: config.run_id(),
        bar_count: bars.len(),
        sample_count: dataset.len(),
        windows: outcome.windows,
        records: outcome.records,
        accuracy: confusion.accuracy(),
        precision: confusion.precision(),
        recall: confusion.recall(),
        confusion,
        backtest,
        strategy,
    })
}
