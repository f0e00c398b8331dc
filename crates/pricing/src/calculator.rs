use crate::error::PricingError;
use configuration::{DealSizeTier, GradeDefinition, IndustryRiskEntry, MonthRange, PricingSettings};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an otherwise priced deal cannot be funded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclineReason {
    GradeNotApprovable { grade: String },
    BelowMinimumDeal { max_advance: Decimal, minimum: Decimal },
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclineReason::GradeNotApprovable { grade } => write!(f, "grade {grade} is not approvable"),
            DeclineReason::BelowMinimumDeal { max_advance, minimum } => {
                write!(f, "maximum advance {max_advance} is below the minimum deal size of {minimum}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRecommendation {
    pub grade: String,
    pub factor_rate: Decimal,
    pub max_advance_pct: Decimal,
    pub max_advance: Decimal,
    pub term_months: MonthRange,
    /// `factor_rate * max_advance`, in cents.
    pub total_repayment: Decimal,
    pub deal_tier: String,
    pub required_statement_months: u32,
    pub is_approvable: bool,
    pub decline_reason: Option<DeclineReason>,
}

#[derive(Debug, Clone, Copy)]
pub struct PricingCalculator<'a> {
    settings: &'a PricingSettings,
}

impl<'a> PricingCalculator<'a> {
    pub fn new(settings: &'a PricingSettings) -> Self {
        Self { settings }
    }

    #[tracing::instrument(name = "price", skip_all, fields(grade = %grade.grade, industry = %industry.code))]
    pub fn price(
        &self,
        grade: &GradeDefinition,
        industry: &IndustryRiskEntry,
        monthly_revenue: Decimal,
        requested_amount: Decimal,
    ) -> Result<PricingRecommendation, PricingError> {
        if monthly_revenue.is_sign_negative() && !monthly_revenue.is_zero() {
            return Err(PricingError::InvalidInput {
                field: "monthly_revenue",
                value: monthly_revenue,
            });
        }
        if requested_amount.is_sign_negative() && !requested_amount.is_zero() {
            return Err(PricingError::InvalidInput {
                field: "requested_amount",
                value: requested_amount,
            });
        }

        let range = grade.factor_rate;
        let factor_rate = (grading::factor_at(grade, self.settings.factor_position) + industry.factor_modifier)
            .clamp(range.min, range.max);

        let ceiling = grade.max_advance_pct * monthly_revenue / Decimal::ONE_HUNDRED;
        let max_advance = ceiling.min(requested_amount).round_dp(2);
        let total_repayment = (factor_rate * max_advance).round_dp(2);
        let tier = self.deal_tier(max_advance);

        let decline_reason = if !grade.approvable {
            Some(DeclineReason::GradeNotApprovable {
                grade: grade.grade.clone(),
            })
        } else if max_advance < self.settings.min_deal_size {
            Some(DeclineReason::BelowMinimumDeal {
                max_advance,
                minimum: self.settings.min_deal_size,
            })
        } else {
            None
        };

        tracing::debug!(%factor_rate, %max_advance, approvable = decline_reason.is_none(), "Deal priced");

        Ok(PricingRecommendation {
            grade: grade.grade.clone(),
            factor_rate,
            max_advance_pct: grade.max_advance_pct,
            max_advance,
            term_months: grade.term_months,
            total_repayment,
            deal_tier: tier.map_or_else(String::new, |t| t.label.clone()),
            required_statement_months: tier.map_or(0, |t| t.required_statement_months),
            is_approvable: decline_reason.is_none(),
            decline_reason,
        })
    }

    /// The first tier whose ceiling covers `amount`; the open-ended last tier
    /// catches everything else.
    fn deal_tier(&self, amount: Decimal) -> Option<&'a DealSizeTier> {
        self.settings
            .deal_tiers
            .iter()
            .find(|tier| tier.max_amount.is_none_or(|max| amount <= max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::UnderwritingConfig;
    use rust_decimal_macros::dec;

    fn config() -> UnderwritingConfig {
        UnderwritingConfig::builtin().unwrap()
    }

    #[test]
    fn test_restaurant_a_minus_pricing() {
        let config = config();
        let grade = config.grades.by_label("A-").unwrap();
        let industry = config.industries.get("restaurant").unwrap();

        let rec = PricingCalculator::new(&config.pricing)
            .price(grade, industry, dec!(45000), dec!(10000))
            .unwrap();

        assert_eq!(rec.factor_rate, dec!(1.175));
        assert_eq!(rec.max_advance_pct, dec!(16));
        assert_eq!(rec.max_advance, dec!(7200));
        assert_eq!(rec.total_repayment, dec!(8460));
        assert_eq!(rec.deal_tier, "micro");
        assert_eq!(rec.required_statement_months, 3);
        assert_eq!(rec.term_months, MonthRange { min: 3, max: 6 });
        assert!(rec.is_approvable);
        assert!(rec.decline_reason.is_none());
    }

    #[test]
    fn test_requested_amount_caps_the_advance() {
        let config = config();
        let grade = config.grades.by_label("A+").unwrap();
        let industry = config.industries.unclassified();

        let rec = PricingCalculator::new(&config.pricing)
            .price(grade, industry, dec!(200000), dec!(12500.554))
            .unwrap();

        assert_eq!(rec.max_advance, dec!(12500.55));
    }

    #[test]
    fn test_industry_modifier_is_clamped_to_the_grade_range() {
        let config = config();
        let grade = config.grades.by_label("B+").unwrap();
        let high_risk = config.industries.get("trucking").unwrap();
        let low_risk = config.industries.get("medical").unwrap();
        let calculator = PricingCalculator::new(&config.pricing);

        let up = calculator.price(grade, high_risk, dec!(80000), dec!(50000)).unwrap();
        assert_eq!(up.factor_rate, dec!(1.24));

        let down = calculator.price(grade, low_risk, dec!(80000), dec!(50000)).unwrap();
        assert_eq!(down.factor_rate, dec!(1.19));
    }

    #[test]
    fn test_f_grade_is_never_approvable() {
        let config = config();
        let grade = config.grades.by_label("F").unwrap();
        let industry = config.industries.unclassified();

        let rec = PricingCalculator::new(&config.pricing)
            .price(grade, industry, dec!(500000), dec!(100000))
            .unwrap();

        assert!(rec.max_advance > Decimal::ZERO);
        assert!(!rec.is_approvable);
        assert_eq!(
            rec.decline_reason,
            Some(DeclineReason::GradeNotApprovable { grade: "F".to_string() })
        );
    }

    #[test]
    fn test_below_minimum_deal_size() {
        let config = config();
        let grade = config.grades.by_label("B").unwrap();
        let industry = config.industries.unclassified();

        let rec = PricingCalculator::new(&config.pricing)
            .price(grade, industry, dec!(20000), dec!(50000))
            .unwrap();

        assert_eq!(rec.max_advance, dec!(2800));
        assert!(!rec.is_approvable);
        assert!(matches!(rec.decline_reason, Some(DeclineReason::BelowMinimumDeal { .. })));
    }

    #[test]
    fn test_deal_tiers_follow_the_advance() {
        let config = config();
        let grade = config.grades.by_label("A").unwrap();
        let industry = config.industries.unclassified();
        let calculator = PricingCalculator::new(&config.pricing);

        let standard = calculator.price(grade, industry, dec!(500000), dec!(100000)).unwrap();
        assert_eq!(standard.deal_tier, "standard");
        assert_eq!(standard.required_statement_months, 4);

        let jumbo = calculator.price(grade, industry, dec!(5000000), dec!(400000)).unwrap();
        assert_eq!(jumbo.deal_tier, "jumbo");
        assert_eq!(jumbo.required_statement_months, 12);
    }

    #[test]
    fn test_negative_inputs_are_rejected() {
        let config = config();
        let grade = config.grades.by_label("A").unwrap();
        let industry = config.industries.unclassified();
        let calculator = PricingCalculator::new(&config.pricing);

        assert_eq!(
            calculator.price(grade, industry, dec!(-1), dec!(10000)),
            Err(PricingError::InvalidInput {
                field: "monthly_revenue",
                value: dec!(-1)
            })
        );
        assert!(calculator.price(grade, industry, dec!(50000), dec!(-0.01)).is_err());
    }
}
