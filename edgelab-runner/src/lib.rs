//! EdgeLab Runner — orchestration on top of the core engine.
//!
//! Turns raw bar series into evaluated strategies: configuration with a
//! reproducible run id, walk-forward window formation and training,
//! classification and strategy metrics, CSV ingestion, and the
//! end-to-end pipeline the CLI drives.

pub mod config;
pub mod data;
pub mod metrics;
pub mod pipeline;
pub mod walk_forward;

pub use config::{ConfigError, ModelConfig, RunConfig};
pub use data::{load_bars_csv, load_metric_csv, synthetic_bars, LoadError};
pub use metrics::{ConfusionMatrix, StrategyMetrics};
pub use pipeline::{run_pipeline, PipelineError, PipelineReport};
pub use walk_forward::{
    build_windows, WalkForwardConfig, WalkForwardError, WalkForwardTrainer, WindowMode, WindowSpec,
};
