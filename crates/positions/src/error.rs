use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PositionError {
    #[error("Amount tolerance must be between 0 and 100 percent, got {0}")]
    InvalidTolerance(Decimal),

    #[error("A position needs at least 2 payments to infer a frequency, min_payments is {0}")]
    InvalidMinPayments(usize),
}
