//! EdgeLab Core — the predictive signal & risk engine.
//!
//! This crate contains the algorithmic heart of the system:
//! - Domain types (bars, features, labels, predictions, trades, alerts)
//! - Technical indicators with a strict no-look-ahead warm-up convention
//! - Feature building from OHLCV bars and auxiliary scalar series
//! - Three base classifiers of distinct inductive bias plus a soft-voting
//!   ensemble
//! - A deterministic next-bar-open backtest simulator
//! - A rolling Z-score anomaly detector for derivatives-market metrics
//!
//! Everything operates on already-materialized in-memory series; data
//! acquisition and presentation live outside this crate.

pub mod anomaly;
pub mod backtest;
pub mod domain;
pub mod features;
pub mod indicators;
pub mod models;
