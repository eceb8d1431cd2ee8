//! Corpus analytics.
//!
//! Reporting over the loaded race corpus that sits outside the backtest
//! itself, currently the price-band outcome distribution.

pub mod outcomes;

pub use outcomes::{BinGroup, OutcomeAnalysis, PriceBin};
