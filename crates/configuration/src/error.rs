use rust_decimal::Decimal;
use thiserror::Error;

/// Raised while loading or validating reference tables. Always fatal: the
/// shell must not start scoring with a table that failed here.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from file: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Classification rule set is empty")]
    EmptyRuleSet,

    #[error("Rule '{rule}' has an invalid memo pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("Component weights must sum to 100, got {0}")]
    WeightsSum(Decimal),

    #[error("Grade table coverage error: {0}")]
    GradeCoverage(String),

    #[error("Invalid {table} table: {reason}")]
    InvalidTable { table: &'static str, reason: String },

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

impl ConfigError {
    pub(crate) fn table(table: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidTable {
            table,
            reason: reason.into(),
        }
    }
}
