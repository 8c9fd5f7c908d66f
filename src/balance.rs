use log::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::ledger::{InterestPolicy, Loan, LoanPayment};

/// Signed outstanding amount of a loan. A negative `balance` is still owed;
/// once finished, `balance` is the surplus carried over.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Balance {
    pub is_finished: bool,
    pub balance: f64,
}

impl Balance {
    fn owing(balance: f64) -> Self {
        Self {
            is_finished: false,
            balance,
        }
    }

    fn settled(balance: f64) -> Self {
        Self {
            is_finished: true,
            balance,
        }
    }
}

/// Computes the balance of `loan` as of `current_month`.
///
/// Only payments whose `loan_name` matches are considered, and each of them
/// must fall in the loan's periods `loan.month_created..current_month`.
/// When no period has elapsed the payments are not inspected and the full
/// amount due is returned as owed.
pub fn balance(loan: &Loan, payments: &[LoanPayment], current_month: u32) -> Result<Balance> {
    let number_of_periods = i64::from(current_month) - i64::from(loan.month_created);
    if number_of_periods <= 0 {
        let result = Balance::owing(-initial_amount_due(loan));
        debug!("loan {} has no elapsed periods: {:?}", loan.name, result);
        return Ok(result);
    }

    let totals = period_totals(loan, payments, current_month, number_of_periods as usize)?;
    let result = match loan.policy() {
        InterestPolicy::Fixed => fixed_interest_balance(loan, &totals),
        InterestPolicy::Compounding => compounding_balance(loan, &totals),
    };
    debug!(
        "loan {} over {} period(s), {} interest: {:?}",
        loan.name,
        number_of_periods,
        loan.policy(),
        result
    );
    Ok(result)
}

fn growth_rate(interest_rate: f64) -> f64 {
    1. + (interest_rate / 100.)
}

// amount due before any period has elapsed
fn initial_amount_due(loan: &Loan) -> f64 {
    match loan.policy() {
        InterestPolicy::Fixed => loan.principal,
        InterestPolicy::Compounding => loan.principal * growth_rate(loan.interest_rate),
    }
}

// payment totals per elapsed period, index 0 being the month the loan was created
fn period_totals(
    loan: &Loan,
    payments: &[LoanPayment],
    current_month: u32,
    number_of_periods: usize,
) -> Result<Vec<f64>> {
    let mut totals = vec![0.; number_of_periods];

    for payment in payments.iter().filter(|p| p.loan_name == loan.name) {
        if payment.month_created < loan.month_created || payment.month_created >= current_month {
            return Err(LedgerError::PaymentOutOfRange {
                id: payment.id,
                month: payment.month_created,
                first_month: loan.month_created,
                current_month,
            });
        }
        totals[(payment.month_created - loan.month_created) as usize] += payment.amount;
    }

    Ok(totals)
}

// The flat monthly interest is principal * rate with the rate taken as is,
// not divided by 100, and charged for every elapsed period.
fn fixed_interest_balance(loan: &Loan, totals: &[f64]) -> Balance {
    let monthly_interest = loan.principal * loan.interest_rate;
    let total_interest = monthly_interest * totals.len() as f64;

    let amount_due = loan.principal + total_interest;
    let amount_paid: f64 = totals.iter().sum();
    let balance = amount_paid - amount_due;

    if balance >= 0. {
        Balance::settled(balance)
    } else {
        Balance::owing(balance)
    }
}

fn compounding_balance(loan: &Loan, totals: &[f64]) -> Balance {
    let total_paid: f64 = totals.iter().sum();
    let mut valid_paid = 0.;
    let mut amount_due = loan.principal * growth_rate(loan.interest_rate);

    for (period, &period_total) in totals.iter().enumerate() {
        valid_paid += period_total;
        amount_due -= period_total;
        trace!(
            "loan {} period {}: paid {}, still due {}",
            loan.name,
            period,
            period_total,
            amount_due
        );

        if amount_due <= 0. {
            // whatever went past zero was not needed and is handed back
            let overshoot = amount_due.abs();
            valid_paid -= overshoot;
            return Balance::settled(total_paid - valid_paid);
        }
    }

    // amount_due is now the residual left after every payment
    Balance::owing(total_paid - amount_due)
}

#[cfg(test)]
mod tests {
    use super::{balance, Balance};
    use crate::errors::LedgerError;
    use crate::ledger::{Loan, LoanPayment};
    use test_log::test;

    const EPSILON: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn payment(id: u64, loan_name: &str, amount: f64, month_created: u32) -> LoanPayment {
        LoanPayment {
            id,
            loan_name: loan_name.to_string(),
            payer: "alice".to_string(),
            amount,
            month_created,
        }
    }

    #[test]
    fn test_no_elapsed_periods() {
        let fixed = Loan::new("car", "alice", 1000., 0.05, true, 3);
        let compounding = Loan::new("boat", "alice", 1000., 5., false, 3);
        let payments = vec![payment(0, "car", 2000., 3), payment(1, "boat", 2000., 3)];

        for current_month in [0, 2, 3] {
            assert_eq!(
                balance(&fixed, &payments, current_month).unwrap(),
                Balance {
                    is_finished: false,
                    balance: -1000.
                }
            );
            let result = balance(&compounding, &payments, current_month).unwrap();
            assert!(!result.is_finished);
            assert_close(result.balance, -1050.);
        }
    }

    #[test]
    fn test_fixed_interest_without_payments() {
        let principal = 1000.;
        let rate = 0.01;
        let loan = Loan::new("car", "alice", principal, rate, true, 2);

        for periods in 1..6 {
            let result = balance(&loan, &[], 2 + periods).unwrap();
            assert!(!result.is_finished);
            assert_close(
                result.balance,
                -(principal + principal * rate * periods as f64),
            );
        }
    }

    #[test]
    fn test_fixed_interest_paid_off_with_surplus() {
        // 100 + 100 * 0.1 * 2 = 120 due after two periods
        let loan = Loan::new("car", "alice", 100., 0.1, true, 0);
        let payments = vec![
            payment(0, "car", 50., 0),
            payment(1, "boat", 999., 0),
            payment(2, "car", 80., 1),
        ];

        let result = balance(&loan, &payments, 2).unwrap();
        assert!(result.is_finished);
        assert_close(result.balance, 10.);
    }

    #[test]
    fn test_fixed_interest_exact_payment_is_finished() {
        let loan = Loan::new("car", "alice", 100., 0., true, 0);
        let payments = vec![payment(0, "car", 100., 0)];

        assert_eq!(
            balance(&loan, &payments, 1).unwrap(),
            Balance {
                is_finished: true,
                balance: 0.
            }
        );
    }

    #[test]
    fn test_compounding_exact_payment_in_first_period() {
        let principal = 250.;
        let rate = 4.;
        let loan = Loan::new("car", "alice", principal, rate, false, 0);
        let payments = vec![payment(0, "car", principal * (1. + rate / 100.), 0)];

        let result = balance(&loan, &payments, 1).unwrap();
        assert!(result.is_finished);
        assert_close(result.balance, 0.);
    }

    #[test]
    fn test_compounding_refunds_overshoot_and_later_payments() {
        // 200 due; settled in period 1 with 30 too much, period 2 is all surplus
        let loan = Loan::new("car", "alice", 200., 0., false, 1);
        let payments = vec![
            payment(0, "car", 120., 1),
            payment(1, "car", 110., 2),
            payment(2, "car", 15., 3),
        ];

        let result = balance(&loan, &payments, 4).unwrap();
        assert!(result.is_finished);
        assert_close(result.balance, 45.);
    }

    #[test]
    fn test_compounding_unfinished_returns_paid_minus_residual() {
        // 110 due, 30 paid leaves a residual of 80
        let loan = Loan::new("car", "alice", 100., 10., false, 0);
        let payments = vec![payment(0, "car", 10., 0), payment(1, "car", 20., 1)];

        let result = balance(&loan, &payments, 3).unwrap();
        assert!(!result.is_finished);
        assert_close(result.balance, 30. - 80.);
    }

    #[test]
    fn test_payment_before_loan_creation_is_rejected() {
        let loan = Loan::new("car", "alice", 100., 1., true, 2);
        let payments = vec![payment(7, "car", 10., 1)];

        assert_eq!(
            balance(&loan, &payments, 4).unwrap_err(),
            LedgerError::PaymentOutOfRange {
                id: 7,
                month: 1,
                first_month: 2,
                current_month: 4,
            }
        );
    }

    #[test]
    fn test_payment_in_query_month_is_rejected() {
        let loan = Loan::new("car", "alice", 100., 1., false, 0);
        let payments = vec![payment(0, "car", 10., 0), payment(1, "car", 10., 3)];

        assert!(matches!(
            balance(&loan, &payments, 3),
            Err(LedgerError::PaymentOutOfRange { id: 1, month: 3, .. })
        ));
    }

    #[test]
    fn test_other_loans_out_of_range_payments_are_ignored() {
        let loan = Loan::new("car", "alice", 100., 0., true, 0);
        let payments = vec![payment(0, "boat", 10., 9)];

        let result = balance(&loan, &payments, 1).unwrap();
        assert_close(result.balance, -100.);
    }

    #[test]
    fn test_nan_payment_never_settles() {
        let fixed = Loan::new("car", "alice", 1000., 0.01, true, 0);
        let compounding = Loan::new("boat", "alice", 1000., 1., false, 0);
        let payments = vec![payment(0, "car", f64::NAN, 0), payment(1, "boat", f64::NAN, 0)];

        assert!(!balance(&fixed, &payments, 1).unwrap().is_finished);
        assert!(!balance(&compounding, &payments, 1).unwrap().is_finished);
    }
}
