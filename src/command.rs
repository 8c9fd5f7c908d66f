use log::info;
use std::fmt;

use crate::aggregate::monthly_totals;
use crate::errors::Result;
use crate::ledger::{Ledger, Loan, LoanPayment, User};
use crate::table::BalanceRow;
use crate::trend::project;

/// The nine REPL actions, numbered by their command code.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CommandKind {
    AdvanceMonth,
    CreateUser,
    ListUsers,
    CreateLoan,
    ListLoans,
    MakePayment,
    ListPayments,
    ListBalances,
    PredictPayments,
}

impl CommandKind {
    pub const ALL: [CommandKind; 9] = [
        CommandKind::AdvanceMonth,
        CommandKind::CreateUser,
        CommandKind::ListUsers,
        CommandKind::CreateLoan,
        CommandKind::ListLoans,
        CommandKind::MakePayment,
        CommandKind::ListPayments,
        CommandKind::ListBalances,
        CommandKind::PredictPayments,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u8 {
        match self {
            CommandKind::AdvanceMonth => 0,
            CommandKind::CreateUser => 1,
            CommandKind::ListUsers => 2,
            CommandKind::CreateLoan => 3,
            CommandKind::ListLoans => 4,
            CommandKind::MakePayment => 5,
            CommandKind::ListPayments => 6,
            CommandKind::ListBalances => 7,
            CommandKind::PredictPayments => 8,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CommandKind::AdvanceMonth => "Fast forward a month",
            CommandKind::CreateUser => "Create a user",
            CommandKind::ListUsers => "List all users",
            CommandKind::CreateLoan => "Create a loan",
            CommandKind::ListLoans => "List all loans",
            CommandKind::MakePayment => "Make a loan payment",
            CommandKind::ListPayments => "List all loan payments",
            CommandKind::ListBalances => "List all loan balances",
            CommandKind::PredictPayments => "Predict monthly payments",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] - {}", self.code(), self.description())
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum Command {
    AdvanceMonth,
    CreateUser {
        name: String,
    },
    ListUsers,
    CreateLoan {
        name: String,
        creator: String,
        principal: f64,
        interest_rate: f64,
        is_fixed_interest: bool,
    },
    ListLoans,
    MakePayment {
        loan_name: String,
        payer: String,
        amount: f64,
    },
    ListPayments,
    ListBalances,
    PredictPayments {
        horizon: usize,
    },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::AdvanceMonth => CommandKind::AdvanceMonth,
            Command::CreateUser { .. } => CommandKind::CreateUser,
            Command::ListUsers => CommandKind::ListUsers,
            Command::CreateLoan { .. } => CommandKind::CreateLoan,
            Command::ListLoans => CommandKind::ListLoans,
            Command::MakePayment { .. } => CommandKind::MakePayment,
            Command::ListPayments => CommandKind::ListPayments,
            Command::ListBalances => CommandKind::ListBalances,
            Command::PredictPayments { .. } => CommandKind::PredictPayments,
        }
    }
}

/// What a command produced, for the caller to display.
#[derive(Clone, PartialEq, Debug)]
pub enum Outcome {
    MonthAdvanced { month: u32, finished: Vec<String> },
    UserCreated(User),
    Users(Vec<User>),
    LoanCreated(Loan),
    Loans(Vec<Loan>),
    PaymentMade(LoanPayment),
    Payments(Vec<LoanPayment>),
    Balances(Vec<BalanceRow>),
    /// `series` holds `observed` monthly totals followed by the projection
    Prediction { observed: usize, series: Vec<f64> },
}

impl Ledger {
    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        info!("executing {}", command.kind());
        let outcome = match command {
            Command::AdvanceMonth => {
                let month = self.advance_month();
                let finished = self.sweep_finished_loans()?;
                Outcome::MonthAdvanced { month, finished }
            }
            Command::CreateUser { name } => Outcome::UserCreated(self.add_user(&name)),
            Command::ListUsers => Outcome::Users(self.list_users().to_vec()),
            Command::CreateLoan {
                name,
                creator,
                principal,
                interest_rate,
                is_fixed_interest,
            } => Outcome::LoanCreated(self.add_loan(
                &name,
                &creator,
                principal,
                interest_rate,
                is_fixed_interest,
            )?),
            Command::ListLoans => Outcome::Loans(self.list_loans().to_vec()),
            Command::MakePayment {
                loan_name,
                payer,
                amount,
            } => Outcome::PaymentMade(self.add_payment(&loan_name, &payer, amount)?),
            Command::ListPayments => Outcome::Payments(self.list_payments().to_vec()),
            Command::ListBalances => {
                self.sweep_finished_loans()?;
                let rows = self
                    .list_loans()
                    .iter()
                    .map(|loan| -> Result<BalanceRow> {
                        Ok(BalanceRow {
                            loan_name: loan.name.clone(),
                            balance: self.loan_balance(&loan.name)?,
                            pending: self.pending_for_loan(&loan.name),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Outcome::Balances(rows)
            }
            Command::PredictPayments { horizon } => {
                let totals = monthly_totals(self.list_payments(), self.month_counter())?;
                let observed = totals.len();
                Outcome::Prediction {
                    observed,
                    series: project(&totals, horizon)?,
                }
            }
        };
        Ok(outcome)
    }
}
