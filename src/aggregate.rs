use log::debug;

use crate::errors::{LedgerError, Result};
use crate::ledger::LoanPayment;

/// Sums every payment, across all loans, into the month it was made.
/// The result has `month_counter + 1` entries, one per month from 0 up to
/// and including the open month.
pub fn monthly_totals(payments: &[LoanPayment], month_counter: u32) -> Result<Vec<f64>> {
    let mut totals = vec![0.; month_counter as usize + 1];

    for payment in payments {
        if payment.month_created > month_counter {
            return Err(LedgerError::PaymentAfterCounter {
                id: payment.id,
                month: payment.month_created,
                month_counter,
            });
        }
        totals[payment.month_created as usize] += payment.amount;
    }

    debug!("monthly payment totals: {:?}", totals);
    Ok(totals)
}
