//! # Position Detector
//!
//! Finds recurring financing obligations (merchant cash advances and
//! short-term loans) in the financing-payment debits of a statement, and
//! reports how many are being serviced at the same time.
//!
//! Payments are grouped by lender, clustered by amount, split into lanes
//! when one lender draws the same amount more than once a day, and each lane
//! with enough payments becomes one `FinancingPosition`. A payment belongs to
//! at most one position.

pub mod detector;
pub mod error;
pub mod frequency;

pub use detector::{FinancingPosition, PositionDetector, StackingAnalysis};
pub use error::PositionError;
pub use frequency::PaymentFrequency;

use configuration::UnderwritingConfig;
use core_types::ClassifiedTransaction;

/// Detects positions with the settings and lender directory in `config`.
#[tracing::instrument(name = "detect_positions", skip_all, fields(transactions = classified.len()))]
pub fn detect(
    classified: &[ClassifiedTransaction],
    config: &UnderwritingConfig,
) -> Result<StackingAnalysis, PositionError> {
    let detector = PositionDetector::new(&config.positions, &config.lenders)?;
    Ok(detector.detect(classified))
}
