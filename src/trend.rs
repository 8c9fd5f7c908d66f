use log::debug;

use crate::errors::{LedgerError, Result};

/// Least-squares line `y = slope * x + intercept` through `(index, value)`
/// pairs of a series.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn fit(series: &[f64]) -> Result<Self> {
        if series.len() < 2 {
            return Err(LedgerError::InsufficientData {
                points: series.len(),
            });
        }

        let n = series.len() as f64;
        let mean_x = (n - 1.) / 2.;
        let mean_y = series.iter().sum::<f64>() / n;

        let (sxx, sxy) = series
            .iter()
            .enumerate()
            .fold((0., 0.), |(sxx, sxy), (x, &y)| {
                let dx = x as f64 - mean_x;
                (sxx + dx * dx, sxy + dx * (y - mean_y))
            });
        if sxx == 0. {
            return Err(LedgerError::ZeroDenominator {
                quantity: "least-squares slope",
            });
        }

        let slope = sxy / sxx;
        let fit = Self {
            slope,
            intercept: mean_y - slope * mean_x,
        };
        debug!("fitted {:?} to {} points", fit, series.len());
        Ok(fit)
    }

    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Longest forecast accepted, in months.
pub const MAX_HORIZON: usize = 1200;

/// Returns `series` followed by `horizon` values extrapolated from its
/// linear fit.
pub fn project(series: &[f64], horizon: usize) -> Result<Vec<f64>> {
    let too_large = LedgerError::HorizonTooLarge {
        horizon,
        max: MAX_HORIZON,
    };
    if horizon > MAX_HORIZON {
        return Err(too_large);
    }
    let fit = LinearFit::fit(series)?;
    let end = series.len().checked_add(horizon).ok_or(too_large)?;

    let mut extended = Vec::with_capacity(end);
    extended.extend_from_slice(series);
    extended.extend((series.len()..end).map(|x| fit.at(x as f64)));
    Ok(extended)
}
