//! Strategy simulator.
//!
//! Replays one strategy over the race corpus:
//! 1. Rank each race's field by the strategy's session price (stable sort
//!    on a working copy; the canonical order is never touched)
//! 2. Resolve each bet's rank to a competitor
//! 3. Settle at the configured spread, with an optional stop-loss cap
//! 4. Accumulate per-race returns and the additive cash curve
//!
//! Races are independent trials: each return is appended in input order and
//! no race's outcome feeds into the next.

use std::cmp::Ordering;

use serde::Deserialize;
use thiserror::Error;

use crate::data::Race;

use super::strategy::{BetDirection, StrategyError, StrategyParams};

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error("bet rank {rank} is outside the field of {field} competitors in race {race}")]
    RankOutOfField {
        race: String,
        rank: usize,
        field: usize,
    },
}

/// Tunables applied to every simulated bet.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Fixed transaction cost added to the quoted price when a win pays out.
    #[serde(default = "default_spread")]
    pub spread: f64,

    /// Cap losses at `stop_loss - spread` instead of the full stake.
    #[serde(default)]
    pub enable_stop_loss: bool,

    /// Loss cap level, in price terms.
    #[serde(default = "default_stop_loss")]
    pub stop_loss: f64,

    /// Fraction of bankroll put at risk per race, split evenly across the
    /// strategy's bets.
    #[serde(default = "default_position_size")]
    pub position_size: f64,
}

fn default_spread() -> f64 {
    0.02
}

fn default_stop_loss() -> f64 {
    0.80
}

fn default_position_size() -> f64 {
    0.2
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spread: default_spread(),
            enable_stop_loss: false,
            stop_loss: default_stop_loss(),
            position_size: default_position_size(),
        }
    }
}

/// Outcome of one strategy over the full corpus.
#[derive(Debug, Clone)]
pub struct BacktestRun {
    pub strategy: StrategyParams,

    /// Net fractional gain/loss per race, in input race order.
    pub race_returns: Vec<f64>,

    /// Running balance, starting from 1.0 and treating each race's return
    /// as an additive increment.
    pub cash_curve: Vec<f64>,
}

impl BacktestRun {
    pub fn final_cash(&self) -> f64 {
        self.cash_curve.last().copied().unwrap_or(1.0)
    }
}

/// Deterministic, single-threaded strategy simulator.
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Replay `strategy` over every race, in order.
    pub fn run(
        &self,
        strategy: &StrategyParams,
        races: &[Race],
    ) -> Result<BacktestRun, SimulationError> {
        strategy.validate()?;

        let mut race_returns = Vec::with_capacity(races.len());
        let mut cash_curve = Vec::with_capacity(races.len() + 1);
        let mut cash = 1.0;
        cash_curve.push(cash);

        for race in races {
            let race_return = self.race_return(strategy, race)?;
            cash += race_return;
            cash_curve.push(cash);
            race_returns.push(race_return);
        }

        Ok(BacktestRun {
            strategy: strategy.clone(),
            race_returns,
            cash_curve,
        })
    }

    fn race_return(&self, strategy: &StrategyParams, race: &Race) -> Result<f64, SimulationError> {
        // Rank a working copy; other consumers rely on the canonical driver
        // order surviving the run.
        let mut field = race.drivers.clone();
        // Stable descending sort: equal prices keep their original relative
        // order, which pins rank assignment reproducibly.
        field.sort_by(|a, b| {
            b.price(strategy.session)
                .partial_cmp(&a.price(strategy.session))
                .unwrap_or(Ordering::Equal)
        });

        let bet_size = self.config.position_size / strategy.bets.len() as f64;
        let mut returns = 0.0;

        for bet in &strategy.bets {
            let driver = field
                .get(bet.rank - 1)
                .ok_or_else(|| SimulationError::RankOutOfField {
                    race: race.name.clone(),
                    rank: bet.rank,
                    field: field.len(),
                })?;

            let mut price = driver.price(strategy.session);
            if bet.direction == BetDirection::Against {
                price = 1.0 - price;
            }

            let won = (bet.direction == BetDirection::For) == driver.winner;
            if won {
                returns += bet_size * (1.0 / (price + self.config.spread) - 1.0);
            } else if self.config.enable_stop_loss {
                returns -= bet_size * (self.config.stop_loss - self.config.spread);
            } else {
                returns -= bet_size;
            }
        }

        Ok(returns)
    }
}
