//! Snapshot extraction.
//!
//! Reduces a competitor's tick stream into the three session decision-point
//! prices plus the settlement price. Each boundary snapshot is the last
//! known price *before* the market moved past that cutoff: the price a
//! strategy acting ahead of the session could actually have traded at.

use chrono::NaiveDateTime;
use thiserror::Error;

use super::types::{DriverSnapshot, Session, Tick};

/// Session cutoff instants for one race, in ascending order.
///
/// Ordering (practice < qualifying < race) is enforced when the schedule is
/// loaded; extraction assumes it.
#[derive(Debug, Clone, Copy)]
pub struct SessionBoundaries {
    pub practice: NaiveDateTime,
    pub qualifying: NaiveDateTime,
    pub race: NaiveDateTime,
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("{source_name}: no tick preceded the {session} cutoff, snapshot unassigned")]
    MissingSnapshot { source_name: String, session: Session },

    #[error("{source_name}: tick stream is empty, no settlement price")]
    EmptyStream { source_name: String },
}

/// Reduce a tick stream to a competitor snapshot.
///
/// Scans ticks in order, tracking the previous tick's price. A boundary
/// snapshot is assigned when the current tick's timestamp moves strictly
/// past the earliest still-unassigned cutoff; the value assigned is the
/// *previous* tick's price. At most one boundary is assigned per tick, so
/// two cutoffs falling between the same pair of ticks leave the later one
/// unassigned and the extraction fails. Sparse streams are rejected, not
/// patched.
///
/// The settlement price is the final tick's price; the winner flag is set
/// when it exceeds `winner_price_limit`.
pub fn extract_snapshot(
    name: &str,
    source: &str,
    ticks: &[Tick],
    boundaries: &SessionBoundaries,
    winner_price_limit: f64,
) -> Result<DriverSnapshot, SnapshotError> {
    let mut previous: Option<f64> = None;
    let mut practice: Option<f64> = None;
    let mut qualifying: Option<f64> = None;
    let mut race: Option<f64> = None;

    for tick in ticks {
        if let Some(last_price) = previous {
            if practice.is_none() && tick.timestamp > boundaries.practice {
                practice = Some(last_price);
            } else if qualifying.is_none() && tick.timestamp > boundaries.qualifying {
                qualifying = Some(last_price);
            } else if race.is_none() && tick.timestamp > boundaries.race {
                race = Some(last_price);
            }
        }
        previous = Some(tick.price);
    }

    let settlement = previous.ok_or_else(|| SnapshotError::EmptyStream {
        source_name: source.to_string(),
    })?;

    let missing = |session: Session| SnapshotError::MissingSnapshot {
        source_name: source.to_string(),
        session,
    };
    let practice_price = practice.ok_or_else(|| missing(Session::Practice))?;
    let qualifying_price = qualifying.ok_or_else(|| missing(Session::Qualifying))?;
    let race_price = race.ok_or_else(|| missing(Session::Race))?;

    Ok(DriverSnapshot {
        name: name.to_string(),
        practice_price,
        qualifying_price,
        race_price,
        winner: settlement > winner_price_limit,
    })
}
