//! Tick stream reader.
//!
//! Parses one competitor's market history from a delimited text file:
//! one header row (discarded), then `timestamp,price[, ...]` rows. Columns
//! past the second are ignored.

use std::path::Path;

use chrono::NaiveDateTime;
use thiserror::Error;

use super::types::Tick;

/// Timestamp layouts seen in market data exports. Tried in order; a bare
/// integer is treated as unix seconds.
const TIMESTAMP_LAYOUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Error, Debug)]
pub enum TickError {
    #[error("unable to open tick file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("unreadable tick row in {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("malformed tick row {row} in {path}: {reason}")]
    Row {
        path: String,
        row: usize,
        reason: String,
    },
}

/// Read the ordered tick stream from a market CSV file.
pub fn read_ticks(path: &Path) -> Result<Vec<Tick>, TickError> {
    let display = path.display().to_string();
    let mut reader = csv::Reader::from_path(path).map_err(|source| TickError::Open {
        path: display.clone(),
        source,
    })?;

    let mut ticks = Vec::new();
    for (index, record) in reader.records().enumerate() {
        // Row numbers are 1-based and count the discarded header.
        let row = index + 2;
        let record = record.map_err(|source| TickError::Read {
            path: display.clone(),
            source,
        })?;

        let malformed = |reason: String| TickError::Row {
            path: display.clone(),
            row,
            reason,
        };

        let raw_timestamp = record
            .get(0)
            .ok_or_else(|| malformed("missing timestamp column".to_string()))?;
        let raw_price = record
            .get(1)
            .ok_or_else(|| malformed("missing price column".to_string()))?;

        let timestamp = parse_timestamp(raw_timestamp)
            .ok_or_else(|| malformed(format!("unparseable timestamp {raw_timestamp:?}")))?;
        let price: f64 = raw_price
            .trim()
            .parse()
            .map_err(|_| malformed(format!("unparseable price {raw_price:?}")))?;

        ticks.push(Tick { timestamp, price });
    }

    Ok(ticks)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for layout in TIMESTAMP_LAYOUTS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, layout) {
            return Some(timestamp);
        }
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|seconds| chrono::DateTime::from_timestamp(seconds, 0))
        .map(|utc| utc.naive_utc())
}
