//! Outcome distribution analysis.
//!
//! Buckets every competitor's session price into fixed bands and reports
//! how often markets at that price level went on to settle as winners,
//! as a calibration check on the market's implied probabilities.

use statrs::statistics::Statistics;

use crate::data::{Race, Session};

/// Price bands used for the distribution report. Half-open `[min, max)`.
const PRICE_BANDS: &[(f64, f64)] = &[
    (0.00, 0.025),
    (0.025, 0.05),
    (0.05, 0.10),
    (0.10, 0.20),
    (0.20, 0.30),
    (0.40, 1.00),
];

/// One half-open price band and its observations.
#[derive(Debug, Clone)]
pub struct PriceBin {
    pub price_min: f64,
    pub price_max: f64,
    prices: Vec<f64>,
    hits: usize,
}

impl PriceBin {
    fn new(price_min: f64, price_max: f64) -> Self {
        Self {
            price_min,
            price_max,
            prices: Vec::new(),
            hits: 0,
        }
    }

    fn add(&mut self, price: f64, won: bool) {
        if price < self.price_min || price >= self.price_max {
            return;
        }
        self.prices.push(price);
        if won {
            self.hits += 1;
        }
    }

    pub fn samples(&self) -> usize {
        self.prices.len()
    }

    /// Fraction of observations in this band that won. `None` when empty.
    pub fn hit_rate(&self) -> Option<f64> {
        if self.prices.is_empty() {
            None
        } else {
            Some(self.hits as f64 / self.prices.len() as f64)
        }
    }

    pub fn mean_price(&self) -> Option<f64> {
        if self.prices.is_empty() {
            None
        } else {
            Some((&self.prices).mean())
        }
    }
}

/// All price bands for one session.
#[derive(Debug, Clone)]
pub struct BinGroup {
    pub session: Session,
    pub bins: Vec<PriceBin>,
}

impl BinGroup {
    pub fn new(session: Session) -> Self {
        let bins = PRICE_BANDS
            .iter()
            .map(|&(min, max)| PriceBin::new(min, max))
            .collect();
        Self { session, bins }
    }

    fn add(&mut self, price: f64, won: bool) {
        for bin in &mut self.bins {
            bin.add(price, won);
        }
    }

    /// Render the band table for this session.
    pub fn summary(&self) -> String {
        let mut out = format!("{}:\n", self.session);
        for bin in &self.bins {
            match (bin.hit_rate(), bin.mean_price()) {
                (Some(rate), Some(mean)) => {
                    out.push_str(&format!(
                        "\t{:.3} - {:.3}: {:.1}% (mean {:.3}, {} samples)\n",
                        bin.price_min,
                        bin.price_max,
                        100.0 * rate,
                        mean,
                        bin.samples()
                    ));
                }
                _ => {
                    out.push_str(&format!("\t{:.3} - {:.3}: -\n", bin.price_min, bin.price_max));
                }
            }
        }
        out
    }
}

/// Per-session outcome distributions over the whole corpus.
#[derive(Debug, Clone)]
pub struct OutcomeAnalysis {
    pub groups: Vec<BinGroup>,
}

impl OutcomeAnalysis {
    pub fn collect(races: &[Race]) -> Self {
        let mut groups = vec![
            BinGroup::new(Session::Practice),
            BinGroup::new(Session::Qualifying),
            BinGroup::new(Session::Race),
        ];
        for race in races {
            for driver in &race.drivers {
                for group in &mut groups {
                    group.add(driver.price(group.session), driver.winner);
                }
            }
        }
        Self { groups }
    }

    pub fn summary(&self) -> String {
        self.groups
            .iter()
            .map(BinGroup::summary)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
