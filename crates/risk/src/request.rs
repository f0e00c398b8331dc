use crate::error::ValidationError;
use analytics::{CashFlowSummary, Dispersion};
use core_types::ApplicationData;
use positions::StackingAnalysis;
use rust_decimal::Decimal;

/// Everything the scorecard needs, validated as a whole.
///
/// Built once with `new`; there is no way to obtain a request with a missing
/// prerequisite.
#[derive(Debug, Clone, Copy)]
pub struct ScoringRequest<'a> {
    application: &'a ApplicationData,
    cashflow: &'a CashFlowSummary,
    stacking: &'a StackingAnalysis,
    credit_score: u16,
    time_in_business_months: u32,
    industry_code: &'a str,
    average_daily_balance: Decimal,
    deposit_variance: Dispersion,
}

impl<'a> ScoringRequest<'a> {
    pub fn new(
        application: &'a ApplicationData,
        cashflow: &'a CashFlowSummary,
        stacking: &'a StackingAnalysis,
    ) -> Result<Self, ValidationError> {
        let mut missing = Vec::new();

        let credit_score = application.credit_score;
        if credit_score.is_none() {
            missing.push("credit_score");
        }
        let time_in_business_months = application.time_in_business_months;
        if time_in_business_months.is_none() {
            missing.push("time_in_business_months");
        }
        let industry_code = application
            .industry_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty());
        if industry_code.is_none() {
            missing.push("industry_code");
        }
        let average_daily_balance = cashflow.lookback.average_daily_balance;
        if average_daily_balance.is_none() {
            missing.push("average_daily_balance");
        }
        let deposit_variance = cashflow.lookback.deposit_variance;
        if deposit_variance == Dispersion::Unavailable {
            missing.push("deposit_variance");
        }

        match (credit_score, time_in_business_months, industry_code, average_daily_balance) {
            (Some(credit_score), Some(time_in_business_months), Some(industry_code), Some(average_daily_balance))
                if missing.is_empty() =>
            {
                Ok(Self {
                    application,
                    cashflow,
                    stacking,
                    credit_score,
                    time_in_business_months,
                    industry_code,
                    average_daily_balance,
                    deposit_variance,
                })
            }
            _ => Err(ValidationError::MissingFields(missing)),
        }
    }

    pub fn application(&self) -> &'a ApplicationData {
        self.application
    }

    pub fn cashflow(&self) -> &'a CashFlowSummary {
        self.cashflow
    }

    pub fn stacking(&self) -> &'a StackingAnalysis {
        self.stacking
    }

    pub fn credit_score(&self) -> u16 {
        self.credit_score
    }

    pub fn time_in_business_months(&self) -> u32 {
        self.time_in_business_months
    }

    pub fn industry_code(&self) -> &'a str {
        self.industry_code
    }

    pub fn average_daily_balance(&self) -> Decimal {
        self.average_daily_balance
    }

    pub fn deposit_variance(&self) -> Dispersion {
        self.deposit_variance
    }

    pub fn monthly_true_revenue(&self) -> Decimal {
        self.cashflow.lookback.monthly_true_revenue
    }

    /// Active monthly financing obligations as a percentage of monthly true
    /// revenue. `None` when there is no revenue to service them from.
    pub fn debt_service_pct(&self) -> Option<Decimal> {
        let revenue = self.monthly_true_revenue();
        if revenue <= Decimal::ZERO {
            return None;
        }
        Some((self.stacking.total_monthly_obligation / revenue * Decimal::ONE_HUNDRED).round_dp(2))
    }
}
