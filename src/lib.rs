pub mod aggregate;
pub mod balance;
pub mod chart;
pub mod command;
pub mod config;
pub mod errors;
pub mod ledger;
pub mod queue;
pub mod repl;
pub mod table;
pub mod trend;

pub use balance::{balance, Balance};
pub use command::{Command, CommandKind, Outcome};
pub use errors::{LedgerError, Result};
pub use ledger::{InterestPolicy, Ledger, Loan, LoanPayment, User};
pub use queue::QueueModel;
pub use trend::{project, LinearFit};
