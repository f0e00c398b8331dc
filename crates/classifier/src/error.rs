use configuration::error::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Rule '{0}' matches on lender aliases but the lender directory is empty")]
    MissingLenderDirectory(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
