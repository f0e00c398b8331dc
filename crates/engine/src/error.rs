use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Classification error: {0}")]
    Classifier(#[from] classifier::ClassifierError),

    #[error("Cash-flow analysis error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Position detection error: {0}")]
    Positions(#[from] positions::PositionError),

    #[error(transparent)]
    Validation(#[from] risk::ValidationError),

    #[error("Pricing error: {0}")]
    Pricing(#[from] pricing::PricingError),
}
