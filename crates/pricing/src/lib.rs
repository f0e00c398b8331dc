//! # Pricing Calculator
//!
//! Turns a letter grade into an offer: factor rate, maximum advance, term
//! range, total repayment and the statement history the deal size requires.
//! Pricing never overrides scoring; a grade that is not approvable stays
//! unapprovable here, and an advance below the minimum deal size is declined.

pub mod calculator;
pub mod error;

pub use calculator::{DeclineReason, PricingCalculator, PricingRecommendation};
pub use error::PricingError;

use configuration::{GradeDefinition, IndustryRiskEntry, PricingSettings};
use rust_decimal::Decimal;

/// Prices one deal with the given pricing settings.
pub fn price(
    grade: &GradeDefinition,
    industry: &IndustryRiskEntry,
    monthly_revenue: Decimal,
    requested_amount: Decimal,
    settings: &PricingSettings,
) -> Result<PricingRecommendation, PricingError> {
    PricingCalculator::new(settings).price(grade, industry, monthly_revenue, requested_amount)
}
