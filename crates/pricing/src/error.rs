use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("Invalid pricing input '{field}': {value} must not be negative")]
    InvalidInput { field: &'static str, value: Decimal },
}
