//! Strategy configuration.
//!
//! A strategy names the session whose snapshot prices rank the field and a
//! list of rank-targeted bets. Strategies are caller-supplied per run and
//! immutable during simulation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Session;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("strategy has no bets")]
    NoBets,

    #[error("bet ranks are 1-indexed, rank 0 is invalid")]
    ZeroRank,
}

/// Which side of a competitor's win market a bet takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetDirection {
    /// Back the competitor to win.
    For,
    /// Lay the competitor; the effective price is the complement.
    Against,
}

/// One leg of a strategy: a direction on the competitor at a given rank.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bet {
    /// 1-indexed position in the session-price ordering this bet targets.
    pub rank: usize,
    pub direction: BetDirection,
}

/// Complete parametrization of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Ranking and pricing basis. Deliberately no default.
    pub session: Session,
    pub bets: Vec<Bet>,
}

impl StrategyParams {
    /// Reject strategies no simulation could execute.
    pub fn validate(&self) -> Result<(), StrategyError> {
        if self.bets.is_empty() {
            return Err(StrategyError::NoBets);
        }
        if self.bets.iter().any(|bet| bet.rank == 0) {
            return Err(StrategyError::ZeroRank);
        }
        Ok(())
    }

    /// Short report label, e.g. `race: against #1, for #2`.
    pub fn label(&self) -> String {
        let bets: Vec<String> = self
            .bets
            .iter()
            .map(|bet| {
                let side = match bet.direction {
                    BetDirection::For => "for",
                    BetDirection::Against => "against",
                };
                format!("{side} #{}", bet.rank)
            })
            .collect();
        format!("{}: {}", self.session, bets.join(", "))
    }
}
