//! Aggregate performance statistics.
//!
//! Reduces a per-race return series to portfolio-level numbers: total
//! return of the additive cash curve, mean and sample deviation of the
//! series, and the risk-adjusted ratio of the two.

use serde::Serialize;
use statrs::statistics::Statistics;

/// Portfolio statistics over one strategy's per-race returns.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSummary {
    /// Number of races in the series.
    pub races: usize,

    /// Final gain/loss of the additive cash curve, as a percentage.
    pub total_return_pct: f64,

    pub mean_return: f64,

    /// Sample standard deviation of the return series.
    pub return_std_dev: f64,

    /// Mean over sample deviation. Absent when the deviation is zero or the
    /// series is too short to have one; never Inf or NaN.
    pub risk_adjusted: Option<f64>,
}

impl PerformanceSummary {
    pub fn from_returns(returns: &[f64]) -> Self {
        let races = returns.len();
        if races == 0 {
            return Self {
                races: 0,
                total_return_pct: 0.0,
                mean_return: 0.0,
                return_std_dev: 0.0,
                risk_adjusted: None,
            };
        }

        let mean_return = returns.mean();
        let return_std_dev = if races > 1 { returns.std_dev() } else { 0.0 };
        let total: f64 = returns.iter().sum();

        let risk_adjusted = if return_std_dev > 0.0 {
            Some(mean_return / return_std_dev)
        } else {
            None
        };

        Self {
            races,
            total_return_pct: 100.0 * total,
            mean_return,
            return_std_dev,
            risk_adjusted,
        }
    }

    /// Generate a summary report block.
    pub fn summary(&self) -> String {
        let risk_adjusted = match self.risk_adjusted {
            Some(ratio) => format!("{ratio:.2}"),
            None => "undefined (zero return deviation)".to_string(),
        };
        format!(
            "Races: {}\n\
             Returns: {:+.1}%\n\
             Mean race return: {:.4}\n\
             Return deviation: {:.4}\n\
             Risk-adjusted return: {}",
            self.races, self.total_return_pct, self.mean_return, self.return_std_dev, risk_adjusted
        )
    }
}
