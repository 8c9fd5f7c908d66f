use std::fmt;

use crate::errors::{LedgerError, Result};

/// Single-server queue with arrival rate λ and departure rate μ.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct QueueModel {
    pub arrival_rate: f64,
    pub departure_rate: f64,
}

impl QueueModel {
    pub fn new(arrival_rate: f64, departure_rate: f64) -> Self {
        Self {
            arrival_rate,
            departure_rate,
        }
    }

    /// ρ = λ / μ
    pub fn rho(&self) -> Result<f64> {
        if self.departure_rate == 0. {
            return Err(LedgerError::ZeroDenominator {
                quantity: "queue utilisation (rho)",
            });
        }
        Ok(self.arrival_rate / self.departure_rate)
    }

    /// Probability of exactly `n` elements on the queue, ρⁿ(1 - ρ).
    pub fn probability_of_n(&self, n: u32) -> Result<f64> {
        let rho = self.rho()?;
        Ok(rho.powi(n as i32) * (1. - rho))
    }

    pub fn probability_at_most(&self, n: u32) -> Result<f64> {
        (0..=n).map(|k| self.probability_of_n(k)).sum()
    }

    pub fn probability_more_than(&self, n: u32) -> Result<f64> {
        Ok(1. - self.probability_at_most(n)?)
    }
}

impl fmt::Display for QueueModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arrival rate {}, departure rate {}",
            self.arrival_rate, self.departure_rate
        )
    }
}
