use crate::request::ScoringRequest;
use analytics::{Dispersion, TrendDirection};
use configuration::{IndustryRiskEntry, WarningThresholds};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A soft risk signal for the underwriter. Never changes the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskWarning {
    StackedPositions { active: usize },
    HighDebtService { pct: Decimal },
    DecliningRevenue { change_pct: Option<Decimal> },
    /// `variance` is `None` when the revenue slices averaged zero.
    HighDepositVariance { variance: Option<Decimal> },
    ElevatedIndustryTier { tier: u8 },
    NegativeNetCashFlow { net: Decimal },
    PeerToPeerDeposits { count: usize },
}

impl fmt::Display for RiskWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskWarning::StackedPositions { active } => write!(f, "{active} concurrent financing positions"),
            RiskWarning::HighDebtService { pct } => write!(f, "debt service at {pct}% of revenue"),
            RiskWarning::DecliningRevenue { change_pct: Some(pct) } => write!(f, "revenue declining ({pct}%)"),
            RiskWarning::DecliningRevenue { change_pct: None } => f.write_str("revenue declining"),
            RiskWarning::HighDepositVariance { variance: Some(v) } => write!(f, "deposit variance {v}"),
            RiskWarning::HighDepositVariance { variance: None } => f.write_str("no revenue deposits in lookback"),
            RiskWarning::ElevatedIndustryTier { tier } => write!(f, "industry tier {tier}"),
            RiskWarning::NegativeNetCashFlow { net } => write!(f, "net cash flow {net} in lookback"),
            RiskWarning::PeerToPeerDeposits { count } => {
                write!(f, "{count} peer-to-peer transactions need review")
            }
        }
    }
}

pub fn collect_warnings(
    request: &ScoringRequest<'_>,
    thresholds: &WarningThresholds,
    industry: &IndustryRiskEntry,
) -> Vec<RiskWarning> {
    let mut warnings = Vec::new();
    let cashflow = request.cashflow();
    let lookback = &cashflow.lookback;

    let active = request.stacking().active_count;
    if active >= thresholds.stacked_positions {
        warnings.push(RiskWarning::StackedPositions { active });
    }
    if let Some(pct) = request.debt_service_pct() {
        if pct > thresholds.debt_service_pct {
            warnings.push(RiskWarning::HighDebtService { pct });
        }
    }
    if cashflow.trend.direction == TrendDirection::Declining {
        warnings.push(RiskWarning::DecliningRevenue {
            change_pct: cashflow.trend.change_pct,
        });
    }
    match request.deposit_variance() {
        Dispersion::Coefficient(v) if v > thresholds.deposit_variance => {
            warnings.push(RiskWarning::HighDepositVariance { variance: Some(v) });
        }
        Dispersion::ZeroMean => warnings.push(RiskWarning::HighDepositVariance { variance: None }),
        _ => {}
    }
    if industry.tier >= thresholds.industry_tier {
        warnings.push(RiskWarning::ElevatedIndustryTier { tier: industry.tier });
    }
    let net = lookback.net_cash_flow();
    if net.is_sign_negative() && !net.is_zero() {
        warnings.push(RiskWarning::NegativeNetCashFlow { net });
    }
    if lookback.peer_to_peer_review_count > 0 {
        warnings.push(RiskWarning::PeerToPeerDeposits {
            count: lookback.peer_to_peer_review_count,
        });
    }

    warnings
}
