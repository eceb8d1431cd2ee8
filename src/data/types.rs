//! Core data types for race-market backtesting.
//!
//! These types represent the fundamental data structures used throughout
//! the backtester: raw market ticks, per-competitor session snapshots,
//! and the races that own them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Race-weekend session whose market snapshot drives a strategy run.
///
/// Closed set with no `Default`: ranking competitors by one session and
/// pricing them by another would make results incomparable, so callers
/// always name the session explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Session {
    Practice,
    Qualifying,
    Race,
}

impl Session {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Practice => "practice",
            Self::Qualifying => "qualifying",
            Self::Race => "race",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single price observation from one competitor's win market.
///
/// Prices are implied win probabilities in [0, 1]. Streams are assumed
/// non-decreasing in timestamp; the source does not enforce it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

/// Decision-point prices for one competitor, reduced from its tick stream.
///
/// Built once by snapshot extraction and immutable afterwards. `winner` is
/// derived from the settlement price (the last recorded tick), not observed
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverSnapshot {
    /// Competitor identity taken from the market file name.
    pub name: String,

    /// Last known price before the practice cutoff.
    pub practice_price: f64,

    /// Last known price before the qualifying cutoff.
    pub qualifying_price: f64,

    /// Last known price before the race cutoff.
    pub race_price: f64,

    /// Whether the market settled in this competitor's favor.
    pub winner: bool,
}

impl DriverSnapshot {
    /// Snapshot price for the given session.
    pub fn price(&self, session: Session) -> f64 {
        match session {
            Session::Practice => self.practice_price,
            Session::Qualifying => self.qualifying_price,
            Session::Race => self.race_price,
        }
    }
}

/// One race: its configured name and the full competitor field.
///
/// A validated race carries exactly one winning competitor; the loader
/// refuses to produce anything else.
#[derive(Debug, Clone)]
pub struct Race {
    pub name: String,
    pub drivers: Vec<DriverSnapshot>,
}

impl Race {
    /// The competitor whose market settled in their favor.
    pub fn winner(&self) -> Option<&DriverSnapshot> {
        self.drivers.iter().find(|d| d.winner)
    }
}
