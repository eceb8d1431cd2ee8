//! Race market data: tick streams, snapshot extraction, race loading.
//!
//! The pipeline runs bottom-up: `ticks` parses one competitor's market
//! history, `snapshot` reduces it to session decision-point prices, and
//! `loader` assembles whole races and enforces their integrity.

pub mod loader;
pub mod snapshot;
pub mod ticks;
pub mod types;

pub use loader::{LoaderConfig, LoaderError, RaceLoader};
pub use snapshot::{extract_snapshot, SessionBoundaries, SnapshotError};
pub use ticks::{read_ticks, TickError};
pub use types::{DriverSnapshot, Race, Session, Tick};
