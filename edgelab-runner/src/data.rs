//! CSV ingestion and synthetic bar generation.
//!
//! Bars arrive as `timestamp,open,high,low,close,volume` CSV; auxiliary
//! metric series (for anomaly scanning or the sentiment feature) as
//! `timestamp,value`. Timestamps accept ISO datetimes with a `T` or
//! space separator, or a bare date (midnight assumed). Rows must be
//! strictly increasing in time; malformed rows fail loudly with the
//! line number rather than being skipped.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use edgelab_core::domain::{is_strictly_ordered, Bar};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unparseable timestamp '{value}' on line {line}")]
    Timestamp { value: String, line: u64 },

    #[error("file contains no data rows")]
    Empty,

    #[error("rows are not strictly increasing in time")]
    Unordered,

    #[error("insane bar on line {line} (non-finite or inconsistent OHLCV)")]
    InsaneBar { line: u64 },
}

#[derive(Debug, Deserialize)]
struct RawBarRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct RawMetricRow {
    timestamp: String,
    value: f64,
}

fn parse_timestamp(value: &str, line: u64) -> Result<NaiveDateTime, LoadError> {
    let trimmed = value.trim();
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(ts);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(ts) = date.and_hms_opt(0, 0, 0) {
            return Ok(ts);
        }
    }
    Err(LoadError::Timestamp {
        value: trimmed.to_string(),
        line,
    })
}

/// Load an OHLCV bar series from a headered CSV file.
pub fn load_bars_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut bars = Vec::new();

    let mut line = 1; // header
    for result in reader.deserialize() {
        line += 1;
        let row: RawBarRow = result?;
        let bar = Bar {
            timestamp: parse_timestamp(&row.timestamp, line)?,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        };
        if !bar.is_sane() {
            return Err(LoadError::InsaneBar { line });
        }
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(LoadError::Empty);
    }
    if !is_strictly_ordered(&bars) {
        return Err(LoadError::Unordered);
    }
    Ok(bars)
}

/// Load a single-valued metric series (`timestamp,value`) from CSV.
pub fn load_metric_csv(path: &Path) -> Result<Vec<(NaiveDateTime, f64)>, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut points = Vec::new();

    let mut line = 1; // header
    for result in reader.deserialize() {
        line += 1;
        let row: RawMetricRow = result?;
        points.push((parse_timestamp(&row.timestamp, line)?, row.value));
    }

    if points.is_empty() {
        return Err(LoadError::Empty);
    }
    if !points.windows(2).all(|w| w[0].0 < w[1].0) {
        return Err(LoadError::Unordered);
    }
    Ok(points)
}

/// Deterministic random-walk OHLCV series, hourly from 2024-01-02.
///
/// Intended for smoke runs and tests when no real data is at hand;
/// the same `(n, seed)` pair always yields the same bars.
pub fn synthetic_bars(n: usize, seed: u64) -> Vec<Bar> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2024, 1, 2)
        .expect("valid date")
        .and_hms_opt(0, 0, 0)
        .expect("valid time");

    let mut bars = Vec::with_capacity(n);
    let mut price = 100.0_f64;
    for i in 0..n {
        let bar_return: f64 = rng.gen_range(-0.02..0.02);
        let open = price;
        let close = price * (1.0 + bar_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
        let volume = rng.gen_range(500.0..5_000.0_f64).round();

        bars.push(Bar {
            timestamp: start + chrono::Duration::hours(i as i64),
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
    }
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_bars_with_datetime_and_date_only_stamps() {
        let file = write_temp(
            "timestamp,open,high,low,close,volume\n\
             2024-01-02T00:00:00,100.0,101.0,99.0,100.5,1000\n\
             2024-01-03 00:00:00,100.5,102.0,100.0,101.5,1100\n\
             2024-01-04,101.5,103.0,101.0,102.0,900\n",
        );
        let bars = load_bars_csv(file.path()).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].close, 100.5);
        assert_eq!(
            bars[2].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 4)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn bad_timestamp_reports_line() {
        let file = write_temp(
            "timestamp,open,high,low,close,volume\n\
             2024-01-02,100.0,101.0,99.0,100.5,1000\n\
             not-a-date,100.5,102.0,100.0,101.5,1100\n",
        );
        let err = load_bars_csv(file.path()).unwrap_err();
        match err {
            LoadError::Timestamp { value, line } => {
                assert_eq!(value, "not-a-date");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unordered_rows_rejected() {
        let file = write_temp(
            "timestamp,open,high,low,close,volume\n\
             2024-01-03,100.0,101.0,99.0,100.5,1000\n\
             2024-01-02,100.5,102.0,100.0,101.5,1100\n",
        );
        assert!(matches!(
            load_bars_csv(file.path()),
            Err(LoadError::Unordered)
        ));
    }

    #[test]
    fn insane_bar_rejected() {
        // High below low.
        let file = write_temp(
            "timestamp,open,high,low,close,volume\n\
             2024-01-02,100.0,98.0,99.0,100.5,1000\n",
        );
        assert!(matches!(
            load_bars_csv(file.path()),
            Err(LoadError::InsaneBar { .. })
        ));
    }

    #[test]
    fn empty_file_rejected() {
        let file = write_temp("timestamp,open,high,low,close,volume\n");
        assert!(matches!(load_bars_csv(file.path()), Err(LoadError::Empty)));
    }

    #[test]
    fn metric_series_loads() {
        let file = write_temp(
            "timestamp,value\n\
             2024-01-02T00:00:00,1.5\n\
             2024-01-02T01:00:00,2.5\n",
        );
        let points = load_metric_csv(file.path()).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].1, 2.5);
    }

    #[test]
    fn synthetic_bars_are_deterministic_and_sane() {
        let a = synthetic_bars(300, 7);
        let b = synthetic_bars(300, 7);
        assert_eq!(a, b);
        assert!(is_strictly_ordered(&a));
        assert!(a.iter().all(Bar::is_sane));

        let other = synthetic_bars(300, 8);
        assert_ne!(a, other);
    }
}
