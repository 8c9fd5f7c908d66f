use log::{debug, info, warn};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::balance::{self, Balance};
use crate::errors::{LedgerError, Result};

#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct User {
    pub name: String,
}

impl User {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// How interest accrues on a loan.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InterestPolicy {
    /// a flat `principal * interest_rate` charged every elapsed period
    Fixed,
    /// a one-off `1 + interest_rate / 100` markup on the principal
    Compounding,
}

impl fmt::Display for InterestPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterestPolicy::Fixed => write!(f, "fixed"),
            InterestPolicy::Compounding => write!(f, "compounding"),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Loan {
    pub name: String,
    pub creator: String,
    pub principal: f64,
    pub interest_rate: f64, // percentage units, i.e. 7.0 for 7%
    pub month_created: u32,
    pub is_fixed_interest: bool,
    is_finished: bool,
}

impl Loan {
    pub fn new(
        name: &str,
        creator: &str,
        principal: f64,
        interest_rate: f64,
        is_fixed_interest: bool,
        month_created: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            creator: creator.to_string(),
            principal,
            interest_rate,
            month_created,
            is_fixed_interest,
            is_finished: false,
        }
    }

    pub fn policy(&self) -> InterestPolicy {
        if self.is_fixed_interest {
            InterestPolicy::Fixed
        } else {
            InterestPolicy::Compounding
        }
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    // once set the flag is never cleared
    fn mark_finished(&mut self) {
        self.is_finished = true;
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoanPayment {
    pub id: u64,
    pub loan_name: String,
    pub payer: String,
    pub amount: f64,
    pub month_created: u32,
}

impl fmt::Display for LoanPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "payment {}, loan {}, payer {}, amount ${:.2}, month {}",
            self.id, self.loan_name, self.payer, self.amount, self.month_created
        )
    }
}

fn finite(quantity: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        warn!("rejected {} of {}", quantity, value);
        Err(LedgerError::NonFiniteAmount { quantity, value })
    }
}

/// Session state: the month counter and the users, loans and payments
/// recorded so far, all in insertion order.
#[derive(Debug, Default)]
pub struct Ledger {
    month_counter: u32,
    next_payment_id: u64,
    users: Vec<User>,
    loans: Vec<Loan>,
    payments: Vec<LoanPayment>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn month_counter(&self) -> u32 {
        self.month_counter
    }

    pub fn advance_month(&mut self) -> u32 {
        self.month_counter += 1;
        info!("month counter advanced to {}", self.month_counter);
        self.month_counter
    }

    pub fn add_user(&mut self, name: &str) -> User {
        info!("user {} registered", name);
        let user = User::new(name);
        self.users.push(user.clone());
        user
    }

    /// Creates a loan stamped with the current month.
    pub fn add_loan(
        &mut self,
        name: &str,
        creator: &str,
        principal: f64,
        interest_rate: f64,
        is_fixed_interest: bool,
    ) -> Result<Loan> {
        finite("principal", principal)?;
        finite("interest rate", interest_rate)?;
        if self.loan(name).is_some() {
            warn!("rejected loan {}: name already taken", name);
            return Err(LedgerError::DuplicateLoan {
                name: name.to_string(),
            });
        }

        let loan = Loan::new(
            name,
            creator,
            principal,
            interest_rate,
            is_fixed_interest,
            self.month_counter,
        );
        info!(
            "loan {} created by {}: principal {}, rate {}, {} interest, month {}",
            name,
            creator,
            principal,
            interest_rate,
            loan.policy(),
            self.month_counter
        );
        self.loans.push(loan.clone());
        Ok(loan)
    }

    /// Records a payment against an existing loan, stamped with the current
    /// month and the next sequence id.
    pub fn add_payment(&mut self, loan_name: &str, payer: &str, amount: f64) -> Result<LoanPayment> {
        finite("payment amount", amount)?;
        if self.loan(loan_name).is_none() {
            warn!("rejected payment from {}: no loan named {}", payer, loan_name);
            return Err(LedgerError::UnknownLoan {
                name: loan_name.to_string(),
            });
        }

        let payment = LoanPayment {
            id: self.next_payment_id,
            loan_name: loan_name.to_string(),
            payer: payer.to_string(),
            amount,
            month_created: self.month_counter,
        };
        self.next_payment_id += 1;
        info!("{}", payment);
        self.payments.push(payment.clone());
        Ok(payment)
    }

    pub fn list_users(&self) -> &[User] {
        &self.users
    }

    pub fn list_loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn list_payments(&self) -> &[LoanPayment] {
        &self.payments
    }

    pub fn loan(&self, name: &str) -> Option<&Loan> {
        self.loans.iter().find(|loan| loan.name == name)
    }

    pub fn payments_for_loan<'a>(&'a self, loan_name: &'a str) -> impl Iterator<Item = &'a LoanPayment> {
        self.payments
            .iter()
            .filter(move |payment| payment.loan_name == loan_name)
    }

    /// Payments made in months that have already closed. The counter only
    /// moves forward, so these always form a prefix of the payment list.
    pub fn settled_payments(&self) -> &[LoanPayment] {
        let end = self
            .payments
            .partition_point(|payment| payment.month_created < self.month_counter);
        &self.payments[..end]
    }

    /// Total paid towards a loan during the still open month.
    pub fn pending_for_loan(&self, loan_name: &str) -> f64 {
        self.payments[self.settled_payments().len()..]
            .iter()
            .filter(|payment| payment.loan_name == loan_name)
            .map(|payment| payment.amount)
            .sum()
    }

    /// Balance of the named loan as of the current month, counting settled
    /// payments only.
    pub fn loan_balance(&self, loan_name: &str) -> Result<Balance> {
        let loan = self.loan(loan_name).ok_or_else(|| LedgerError::UnknownLoan {
            name: loan_name.to_string(),
        })?;
        balance::balance(loan, self.settled_payments(), self.month_counter)
    }

    /// Marks every loan whose balance is no longer negative as finished and
    /// returns the names of the loans that changed. Either every balance is
    /// computed and the flags are updated, or nothing changes.
    pub fn sweep_finished_loans(&mut self) -> Result<Vec<String>> {
        let settled = self.settled_payments();
        let mut newly_finished = Vec::new();
        for (index, loan) in self.loans.iter().enumerate() {
            if loan.is_finished() {
                continue;
            }
            let result = balance::balance(loan, settled, self.month_counter)?;
            if result.is_finished {
                newly_finished.push(index);
            }
        }

        let mut names = Vec::with_capacity(newly_finished.len());
        for index in newly_finished {
            let loan = &mut self.loans[index];
            loan.mark_finished();
            info!("loan {} is finished", loan.name);
            names.push(loan.name.clone());
        }
        debug!("sweep marked {} loan(s) finished", names.len());
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::{InterestPolicy, Ledger, LedgerError};
    use test_log::test;

    fn ledger_with_loan(is_fixed_interest: bool) -> Ledger {
        let mut ledger = Ledger::new();
        ledger.add_user("alice");
        ledger
            .add_loan("car", "alice", 100., 10., is_fixed_interest)
            .unwrap();
        ledger
    }

    #[test]
    fn test_users_keep_insertion_order() {
        let mut ledger = Ledger::new();
        ledger.add_user("carol");
        ledger.add_user("alice");
        ledger.add_user("bob");

        let names: Vec<&str> = ledger.list_users().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["carol", "alice", "bob"]);
    }

    #[test]
    fn test_loan_is_stamped_with_current_month() {
        let mut ledger = Ledger::new();
        ledger.advance_month();
        ledger.advance_month();
        let loan = ledger.add_loan("house", "bob", 5000., 3.5, true).unwrap();

        assert_eq!(loan.month_created, 2);
        assert_eq!(loan.policy(), InterestPolicy::Fixed);
        assert!(!loan.is_finished());
    }

    #[test]
    fn test_duplicate_loan_name_is_rejected() {
        let mut ledger = ledger_with_loan(false);
        let err = ledger.add_loan("car", "bob", 1., 1., true).unwrap_err();

        assert_eq!(err, LedgerError::DuplicateLoan { name: "car".into() });
        assert_eq!(ledger.list_loans().len(), 1);
        assert_eq!(ledger.list_loans()[0].creator, "alice");
    }

    #[test]
    fn test_payment_ids_are_monotonic() {
        let mut ledger = ledger_with_loan(false);
        for month in 0..4 {
            ledger.add_payment("car", "alice", 10.).unwrap();
            ledger.add_payment("car", "bob", 5.).unwrap();
            assert_eq!(ledger.month_counter(), month);
            ledger.advance_month();
        }

        let payments = ledger.list_payments();
        assert_eq!(payments.len(), 8);
        for pair in payments.windows(2) {
            assert!(pair[0].id < pair[1].id);
        }
        assert_eq!(payments[7].month_created, 3);
    }

    #[test]
    fn test_payment_to_unknown_loan_leaves_ledger_untouched() {
        let mut ledger = ledger_with_loan(true);
        let err = ledger.add_payment("boat", "alice", 10.).unwrap_err();

        assert_eq!(err, LedgerError::UnknownLoan { name: "boat".into() });
        assert!(ledger.list_payments().is_empty());

        // the rejected payment did not consume an id
        let payment = ledger.add_payment("car", "alice", 10.).unwrap();
        assert_eq!(payment.id, 0);
    }

    #[test]
    fn test_payments_for_loan_filters_by_name() {
        let mut ledger = ledger_with_loan(true);
        ledger.add_loan("boat", "alice", 50., 1., true).unwrap();
        ledger.add_payment("car", "alice", 1.).unwrap();
        ledger.add_payment("boat", "alice", 2.).unwrap();
        ledger.add_payment("car", "alice", 3.).unwrap();

        let amounts: Vec<f64> = ledger.payments_for_loan("car").map(|p| p.amount).collect();
        assert_eq!(amounts, vec![1., 3.]);
    }

    #[test]
    fn test_open_month_payments_are_pending() {
        let mut ledger = ledger_with_loan(false);
        ledger.add_payment("car", "alice", 40.).unwrap();
        ledger.advance_month();
        ledger.add_payment("car", "alice", 25.).unwrap();

        assert_eq!(ledger.settled_payments().len(), 1);
        assert_eq!(ledger.pending_for_loan("car"), 25.);
        assert_eq!(ledger.pending_for_loan("boat"), 0.);
    }

    #[test]
    fn test_loan_balance_of_unknown_loan() {
        let ledger = Ledger::new();
        assert_eq!(
            ledger.loan_balance("car").unwrap_err(),
            LedgerError::UnknownLoan { name: "car".into() }
        );
    }

    #[test]
    fn test_loan_balance_ignores_pending_payments() {
        let mut ledger = ledger_with_loan(false);
        ledger.add_payment("car", "alice", 500.).unwrap();

        // nothing has settled in month 0
        let result = ledger.loan_balance("car").unwrap();
        assert!(!result.is_finished);

        ledger.advance_month();
        let result = ledger.loan_balance("car").unwrap();
        assert!(result.is_finished);
        assert!((result.balance - 390.).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_marks_finished_loans_once() {
        let mut ledger = ledger_with_loan(false);
        ledger.add_loan("boat", "alice", 1000., 10., false).unwrap();
        ledger.add_payment("car", "alice", 200.).unwrap();
        ledger.advance_month();

        let finished = ledger.sweep_finished_loans().unwrap();
        assert_eq!(finished, vec!["car".to_string()]);
        let before = ledger.loan_balance("car").unwrap();

        let finished = ledger.sweep_finished_loans().unwrap();
        assert!(finished.is_empty());
        assert!(ledger.loan("car").unwrap().is_finished());
        assert!(!ledger.loan("boat").unwrap().is_finished());
        assert_eq!(ledger.loan_balance("car").unwrap(), before);
    }

    #[test]
    fn test_non_finite_amounts_are_rejected() {
        let mut ledger = ledger_with_loan(true);

        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                ledger.add_payment("car", "alice", amount),
                Err(LedgerError::NonFiniteAmount {
                    quantity: "payment amount",
                    ..
                })
            ));
        }
        assert!(matches!(
            ledger.add_loan("boat", "alice", f64::NAN, 1., true),
            Err(LedgerError::NonFiniteAmount {
                quantity: "principal",
                ..
            })
        ));
        assert!(matches!(
            ledger.add_loan("boat", "alice", 10., f64::INFINITY, false),
            Err(LedgerError::NonFiniteAmount {
                quantity: "interest rate",
                ..
            })
        ));

        assert!(ledger.list_payments().is_empty());
        assert_eq!(ledger.list_loans().len(), 1);
        ledger.advance_month();
        assert!(!ledger.loan_balance("car").unwrap().is_finished);
    }
}
