//! Line-based prompt that turns operator input into [`Command`]s and prints
//! their outcomes.

use log::warn;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use thiserror::Error;

use crate::chart;
use crate::command::{Command, CommandKind, Outcome};
use crate::config::Config;
use crate::errors::LedgerError;
use crate::ledger::Ledger;
use crate::table;

const PADDING: &str = "    ";
const PROMPT: &str = "riba> ";
const RULE: &str = "================================================";
const EXIT_MESSAGE: &str = " Goodbye and thanks for all the fish :) ><> ><> ><>";

#[derive(Error, Debug)]
pub enum ReplError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown command: {0} (type '?' for help)")]
    UnknownCommand(String),

    #[error("not a valid number: {0}")]
    InvalidNumber(String),

    #[error("input closed")]
    EndOfInput,
}

enum Flow {
    Continue,
    Quit,
}

pub struct Repl<R, W> {
    input: R,
    output: W,
    ledger: Ledger,
    config: Config,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(input: R, output: W, config: Config) -> Self {
        Self {
            input,
            output,
            ledger: Ledger::new(),
            config,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Runs until the operator quits or the input ends. Only I/O failures on
    /// the REPL streams are returned; every other error is reported and the
    /// loop carries on.
    pub fn run(&mut self) -> io::Result<()> {
        self.show_header()?;
        self.show_commands()?;

        loop {
            let line = match self.prompt(PROMPT) {
                Ok(line) => line,
                Err(ReplError::EndOfInput) => break,
                Err(ReplError::Io(err)) => return Err(err),
                Err(err) => return Err(io::Error::other(err.to_string())),
            };

            match self.step(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(ReplError::EndOfInput) => break,
                Err(ReplError::Io(err)) => return Err(err),
                Err(err) => {
                    warn!("{}", err);
                    writeln!(self.output, "{}error: {}", PADDING, err)?;
                }
            }
        }

        writeln!(self.output, "{}", EXIT_MESSAGE)?;
        self.output.flush()
    }

    fn step(&mut self, line: &str) -> Result<Flow, ReplError> {
        let input = line.trim().to_lowercase();
        match input.as_str() {
            "" => Ok(Flow::Continue),
            "q" | "quit" => Ok(Flow::Quit),
            "?" | "help" => {
                self.show_commands()?;
                Ok(Flow::Continue)
            }
            code => {
                let kind = code
                    .parse::<u8>()
                    .ok()
                    .and_then(CommandKind::from_code)
                    .ok_or_else(|| ReplError::UnknownCommand(code.to_string()))?;
                let command = self.read_command(kind)?;
                let outcome = self.ledger.execute(command)?;
                self.show_outcome(outcome)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn read_command(&mut self, kind: CommandKind) -> Result<Command, ReplError> {
        let command = match kind {
            CommandKind::AdvanceMonth => Command::AdvanceMonth,
            CommandKind::CreateUser => Command::CreateUser {
                name: self.ask("Enter a username: ")?,
            },
            CommandKind::ListUsers => Command::ListUsers,
            CommandKind::CreateLoan => Command::CreateLoan {
                name: self.ask("What is the name of the loan? ")?,
                creator: self.ask("Who is the loan creator? ")?,
                principal: self.ask_number("What is the loan amount? ")?,
                interest_rate: self.ask_number("What is the interest rate? ")?,
                is_fixed_interest: matches!(
                    self.ask("Is the interest rate fixed? ")?.to_lowercase().as_str(),
                    "yes" | "y"
                ),
            },
            CommandKind::ListLoans => Command::ListLoans,
            CommandKind::MakePayment => Command::MakePayment {
                loan_name: self.ask("What is the name of the loan? ")?,
                payer: self.ask("Who is making the payment? ")?,
                amount: self.ask_number("How much do you wish to pay? ")?,
            },
            CommandKind::ListPayments => Command::ListPayments,
            CommandKind::ListBalances => Command::ListBalances,
            CommandKind::PredictPayments => Command::PredictPayments {
                horizon: self.ask_number("How many months do you wish to predict? ")?,
            },
        };
        Ok(command)
    }

    fn prompt(&mut self, text: &str) -> Result<String, ReplError> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ReplError::EndOfInput);
        }
        Ok(line.trim().to_string())
    }

    fn ask(&mut self, question: &str) -> Result<String, ReplError> {
        self.prompt(&format!("{}{}", PADDING, question))
    }

    fn ask_number<T: FromStr>(&mut self, question: &str) -> Result<T, ReplError> {
        let answer = self.ask(question)?;
        answer
            .parse()
            .map_err(|_| ReplError::InvalidNumber(answer))
    }

    fn show_header(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", RULE)?;
        writeln!(self.output, " Welcome to Riba (v{})", env!("CARGO_PKG_VERSION"))?;
        writeln!(self.output, " Type 'q' or 'quit' to exit.")?;
        writeln!(self.output, " Type '?' or 'help' to list the commands.")?;
        writeln!(self.output, "{}", RULE)
    }

    fn show_commands(&mut self) -> io::Result<()> {
        writeln!(self.output, " Commands")?;
        writeln!(self.output, "{}", RULE)?;
        for kind in CommandKind::ALL {
            writeln!(self.output, " {}", kind)?;
        }
        Ok(())
    }

    fn show_outcome(&mut self, outcome: Outcome) -> io::Result<()> {
        let start_date = self.config.start_date;
        match outcome {
            Outcome::MonthAdvanced { month, finished } => {
                writeln!(
                    self.output,
                    "{}Month Counter: {} ({})",
                    PADDING,
                    month,
                    table::month_label(start_date, month)
                )?;
                for name in finished {
                    writeln!(self.output, "{}Loan {} is finished", PADDING, name)?;
                }
            }
            Outcome::UserCreated(user) => {
                writeln!(self.output, "{}Created user {}", PADDING, user.name)?;
            }
            Outcome::Users(users) => write!(self.output, "{}", table::users_table(&users))?,
            Outcome::LoanCreated(loan) => {
                writeln!(
                    self.output,
                    "{}Created loan {} ({} interest)",
                    PADDING,
                    loan.name,
                    loan.policy()
                )?;
            }
            Outcome::Loans(loans) => {
                write!(self.output, "{}", table::loans_table(&loans, start_date))?
            }
            Outcome::PaymentMade(payment) => {
                writeln!(
                    self.output,
                    "{}Recorded payment {:03} of {:.2} to {}",
                    PADDING, payment.id, payment.amount, payment.loan_name
                )?;
            }
            Outcome::Payments(payments) => {
                write!(self.output, "{}", table::payments_table(&payments, start_date))?
            }
            Outcome::Balances(rows) => write!(self.output, "{}", table::balances_table(&rows))?,
            Outcome::Prediction { observed, series } => {
                let projected: Vec<String> = series[observed..]
                    .iter()
                    .map(|value| format!("{:.2}", value))
                    .collect();
                writeln!(
                    self.output,
                    "{}Projected totals from {}: {}",
                    PADDING,
                    table::month_label(start_date, observed as u32),
                    projected.join(", ")
                )?;
                write!(
                    self.output,
                    "{}",
                    chart::render(
                        &series,
                        observed,
                        self.config.chart_width,
                        self.config.chart_height
                    )
                )?;
            }
        }
        Ok(())
    }
}
