//! Feature engineering: OHLCV bars in, aligned feature matrix out.
//!
//! The builder computes every indicator column over the full bar history,
//! derives the composite columns (EMA distance, ATR percent, volume ratio,
//! lagged returns, bar range), optionally joins a pre-aligned auxiliary
//! scalar series, then drops the common warm-up prefix so that every
//! surviving row is fully defined. Labels are computed separately from
//! forward returns and zipped with the rows into a `Dataset`.

mod builder;
mod config;
mod dataset;

pub use builder::{label_bars, FeatureBuilder, FeatureError, FeatureSet};
pub use config::FeatureConfig;
pub use dataset::Dataset;
