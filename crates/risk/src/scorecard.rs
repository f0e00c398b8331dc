use crate::precheck::{PreCheckOutcome, run_precheck};
use crate::request::ScoringRequest;
use crate::warnings::{RiskWarning, collect_warnings};
use crate::RiskModel;
use analytics::Dispersion;
use configuration::{Component, GradeDefinition, UnderwritingConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The full outcome of scoring one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub precheck: PreCheckOutcome,
    /// Points per component; all eleven present, all zero when blocked.
    pub components: BTreeMap<Component, Decimal>,
    /// Sum of `components`.
    pub total_score: Decimal,
    pub industry_adjustment: Decimal,
    /// `total_score + industry_adjustment`, clamped to `[0, 100]`. Graded.
    pub adjusted_score: Decimal,
    pub grade: GradeDefinition,
    pub industry_code: String,
    pub industry_tier: u8,
    pub debt_service_pct: Option<Decimal>,
    pub is_approvable: bool,
    pub warnings: Vec<RiskWarning>,
}

/// The two-stage scorecard: hard floors first, then eleven weighted components.
#[derive(Debug, Clone, Copy)]
pub struct Scorecard<'a> {
    config: &'a UnderwritingConfig,
}

impl<'a> Scorecard<'a> {
    pub fn new(config: &'a UnderwritingConfig) -> Self {
        Self { config }
    }

    fn component_points(&self, request: &ScoringRequest<'_>, industry_tier: u8) -> BTreeMap<Component, Decimal> {
        let weights = &self.config.weights;
        let lookback = &request.cashflow().lookback;

        Component::ALL
            .iter()
            .map(|&component| {
                let points = match component {
                    Component::MonthlyRevenue => weights.points_for(component, request.monthly_true_revenue()),
                    Component::AverageDailyBalance => {
                        weights.points_for(component, request.average_daily_balance())
                    }
                    Component::NsfOverdraft => weights.points_for(component, Decimal::from(lookback.nsf_count)),
                    Component::NegativeDays => {
                        weights.points_for(component, Decimal::from(lookback.negative_balance_days))
                    }
                    Component::DepositConsistency => match request.deposit_variance() {
                        Dispersion::Coefficient(v) => weights.points_for(component, v),
                        Dispersion::ZeroMean | Dispersion::Unavailable => Decimal::ZERO,
                    },
                    Component::CreditScore => weights.points_for(component, Decimal::from(request.credit_score())),
                    Component::TimeInBusiness => {
                        weights.points_for(component, Decimal::from(request.time_in_business_months()))
                    }
                    Component::IndustryRisk => weights.points_for(component, Decimal::from(industry_tier)),
                    Component::PositionStacking => {
                        weights.points_for(component, Decimal::from(request.stacking().active_count))
                    }
                    // No revenue to service debt from scores as the worst case.
                    Component::DebtService => request
                        .debt_service_pct()
                        .map_or(Decimal::ZERO, |pct| weights.points_for(component, pct)),
                    Component::MerchantProcessing => {
                        let tenure = request.application().processor_tenure_months.unwrap_or(0);
                        weights.points_for(component, Decimal::from(tenure))
                    }
                };
                (component, points)
            })
            .collect()
    }
}

impl RiskModel for Scorecard<'_> {
    #[tracing::instrument(name = "score", skip_all, fields(industry = request.industry_code()))]
    fn score(&self, request: &ScoringRequest<'_>) -> ScoringResult {
        let industry = grading::resolve_industry(Some(request.industry_code()), &self.config.industries);
        let precheck = run_precheck(request, &self.config.floors, industry);
        let warnings = collect_warnings(request, &self.config.warnings, industry);

        let (components, industry_adjustment) = if precheck.passed {
            (self.component_points(request, industry.tier), industry.score_adjustment)
        } else {
            tracing::info!(blockers = precheck.blockers.len(), "Pre-check blocked scoring");
            let zeroed = Component::ALL.iter().map(|c| (*c, Decimal::ZERO)).collect();
            (zeroed, Decimal::ZERO)
        };

        let total_score: Decimal = components.values().copied().sum();
        let adjusted_score = (total_score + industry_adjustment).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
        let grade = grading::grade(adjusted_score, &self.config.grades).clone();
        let is_approvable = precheck.passed && grade.approvable;

        tracing::debug!(
            %total_score,
            %adjusted_score,
            grade = %grade.grade,
            warnings = warnings.len(),
            "Scoring finished"
        );

        ScoringResult {
            precheck,
            components,
            total_score,
            industry_adjustment,
            adjusted_score,
            grade,
            industry_code: industry.code.clone(),
            industry_tier: industry.tier,
            debt_service_pct: request.debt_service_pct(),
            is_approvable,
            warnings,
        }
    }
}
