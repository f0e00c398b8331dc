//! # Risk Scoring Engine
//!
//! Scores an application in two stages. The pre-check applies hard floors
//! (credit score, time in business, monthly true revenue, NSF count,
//! prohibited industry tier); any failure blocks the deal and zeroes every
//! component. A deal that passes is scored on eleven weighted components
//! that sum to at most 100, adjusted by its industry, and graded.
//!
//! ## Architectural Principles
//!
//! - **Validate Once:** a `ScoringRequest` can only be built when every
//!   required input is present, and construction reports all missing
//!   fields together.
//! - **Configuration-Driven:** floors, curves and thresholds all come from
//!   `UnderwritingConfig`; nothing here hardcodes policy.
//! - **Warnings Never Block:** risk warnings are advisory and are collected
//!   even for blocked deals.

pub mod error;
pub mod precheck;
pub mod request;
pub mod scorecard;
pub mod warnings;

pub use error::ValidationError;
pub use precheck::{Blocker, PreCheckOutcome, run_precheck};
pub use request::ScoringRequest;
pub use scorecard::{Scorecard, ScoringResult};
pub use warnings::{RiskWarning, collect_warnings};

use configuration::UnderwritingConfig;

/// The contract for anything that turns a validated request into a result.
pub trait RiskModel: Send + Sync {
    fn score(&self, request: &ScoringRequest<'_>) -> ScoringResult;
}

/// Scores `request` with the stock `Scorecard` over `config`.
pub fn score(request: &ScoringRequest<'_>, config: &UnderwritingConfig) -> ScoringResult {
    Scorecard::new(config).score(request)
}
