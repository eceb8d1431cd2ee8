//! Race prediction-market strategy backtester.
//!
//! Reduces per-competitor market tick streams into session decision-point
//! snapshots and replays configurable betting strategies over a historical
//! race corpus:
//! - Tick-to-snapshot reduction (last known price before each session cutoff)
//! - Directory-driven race loading with parallel competitor extraction
//! - Deterministic strategy simulation with spread and optional stop-loss
//! - Risk-adjusted performance summaries and outcome distribution analysis

pub mod analytics;
pub mod backtest;
pub mod config;
pub mod data;
pub mod metrics;

// Re-export commonly used types
pub use analytics::{BinGroup, OutcomeAnalysis, PriceBin};
pub use backtest::{
    BacktestRun, Bet, BetDirection, SimulationConfig, SimulationError, Simulator, StrategyParams,
};
pub use config::{RaceSchedule, Settings, SettingsError};
pub use data::{
    DriverSnapshot, LoaderConfig, LoaderError, Race, RaceLoader, Session, SessionBoundaries, Tick,
};
pub use metrics::PerformanceSummary;
