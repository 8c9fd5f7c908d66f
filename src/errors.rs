use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("unknown loan: {name}")]
    UnknownLoan { name: String },

    #[error("a loan named {name} already exists")]
    DuplicateLoan { name: String },

    #[error("payment {id} made in month {month} is outside loan periods {first_month}..{current_month}")]
    PaymentOutOfRange {
        id: u64,
        month: u32,
        first_month: u32,
        current_month: u32,
    },

    #[error("payment {id} made in month {month} is after the month counter {month_counter}")]
    PaymentAfterCounter {
        id: u64,
        month: u32,
        month_counter: u32,
    },

    #[error("insufficient data: a linear fit needs at least 2 points, got {points}")]
    InsufficientData { points: usize },

    #[error("forecast horizon of {horizon} months exceeds the limit of {max}")]
    HorizonTooLarge { horizon: usize, max: usize },

    #[error("{quantity} must be a finite number, got {value}")]
    NonFiniteAmount { quantity: &'static str, value: f64 },

    #[error("division by zero computing {quantity}")]
    ZeroDenominator { quantity: &'static str },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
