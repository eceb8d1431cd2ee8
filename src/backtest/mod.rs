//! Betting strategy backtesting.
//!
//! - Strategy parametrization (session basis, rank-targeted bets)
//! - Deterministic replay over the race corpus
//! - Spread-adjusted settlement with an optional stop-loss cap

pub mod simulator;
pub mod strategy;

pub use simulator::{BacktestRun, SimulationConfig, SimulationError, Simulator};
pub use strategy::{Bet, BetDirection, StrategyError, StrategyParams};
