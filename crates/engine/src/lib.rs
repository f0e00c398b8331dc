//! # Underwriting Engine
//!
//! The orchestrator that runs one deal through every stage:
//! classify -> analyze + detect positions -> score -> grade -> price.
//!
//! ## Architectural Principles
//!
//! - **Shared, Frozen Configuration:** the engine holds an
//!   `Arc<UnderwritingConfig>` and never mutates it. Cloning the engine is
//!   cheap and clones may evaluate deals on separate threads.
//! - **Stage Isolation:** each stage consumes the previous stage's output by
//!   reference and produces a new value; nothing is patched in place.
//! - **Blockers Are Data:** a deal that fails the pre-check still produces a
//!   full `UnderwritingDecision`. Only missing inputs and malformed data are
//!   errors.

pub mod decision;
pub mod error;

pub use decision::{DealRequest, UnderwritingDecision};
pub use error::EngineError;

use configuration::UnderwritingConfig;
use risk::{RiskModel, Scorecard, ScoringRequest};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct UnderwritingEngine {
    config: Arc<UnderwritingConfig>,
}

impl UnderwritingEngine {
    pub fn new(config: Arc<UnderwritingConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UnderwritingConfig {
        &self.config
    }

    /// Runs the full pipeline for one deal.
    #[tracing::instrument(
        name = "evaluate",
        skip_all,
        fields(business = %request.application.business_name, transactions = request.transactions.len())
    )]
    pub fn evaluate(&self, request: &DealRequest) -> Result<UnderwritingDecision, EngineError> {
        let config = self.config.as_ref();

        let classified = classifier::classify(&request.transactions, config)?;
        let category_counts = classifier::category_counts(&classified);

        let cashflow = analytics::analyze(&classified, &config.analytics)?;
        let stacking = positions::detect(&classified, config)?;
        tracing::info!(
            monthly_true_revenue = %cashflow.lookback.monthly_true_revenue,
            active_positions = stacking.active_count,
            "Cash flow and positions analyzed"
        );

        let scoring_request = ScoringRequest::new(&request.application, &cashflow, &stacking)?;
        let scoring = Scorecard::new(config).score(&scoring_request);

        let industry = config
            .industries
            .get(&scoring.industry_code)
            .unwrap_or_else(|| config.industries.unclassified());
        let pricing = pricing::price(
            &scoring.grade,
            industry,
            cashflow.lookback.monthly_true_revenue,
            request.requested_amount,
            &config.pricing,
        )?;

        let is_approvable = scoring.is_approvable && pricing.is_approvable;
        tracing::info!(
            score = %scoring.adjusted_score,
            grade = %scoring.grade.grade,
            max_advance = %pricing.max_advance,
            is_approvable,
            "Deal evaluated"
        );

        Ok(UnderwritingDecision {
            category_counts,
            cashflow,
            stacking,
            scoring,
            pricing,
            is_approvable,
        })
    }
}
