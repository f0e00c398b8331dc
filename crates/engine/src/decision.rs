use analytics::CashFlowSummary;
use core_types::{ApplicationData, Transaction, TransactionCategory};
use positions::StackingAnalysis;
use pricing::PricingRecommendation;
use risk::ScoringResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One deal to underwrite: the application, its bank statement, and the
/// amount the merchant asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealRequest {
    pub application: ApplicationData,
    pub transactions: Vec<Transaction>,
    pub requested_amount: Decimal,
}

impl DealRequest {
    pub fn new(application: ApplicationData, transactions: Vec<Transaction>, requested_amount: Decimal) -> Self {
        Self {
            application,
            transactions,
            requested_amount,
        }
    }
}

/// Everything the pipeline derived for one deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingDecision {
    pub category_counts: BTreeMap<TransactionCategory, usize>,
    pub cashflow: CashFlowSummary,
    pub stacking: StackingAnalysis,
    pub scoring: ScoringResult,
    pub pricing: PricingRecommendation,
    /// Scoring and pricing must both approve.
    pub is_approvable: bool,
}

impl UnderwritingDecision {
    /// Blockers and the pricing decline reason, as display strings.
    pub fn decline_reasons(&self) -> Vec<String> {
        self.scoring
            .precheck
            .blockers
            .iter()
            .map(ToString::to_string)
            .chain(self.pricing.decline_reason.iter().map(ToString::to_string))
            .collect()
    }
}
