use crate::request::ScoringRequest;
use configuration::{IndustryRiskEntry, PreCheckFloors};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A hard eligibility failure. Any blocker makes the deal unapprovable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Blocker {
    CreditScoreBelowMinimum { score: u16, minimum: u16 },
    TimeInBusinessBelowMinimum { months: u32, minimum: u32 },
    RevenueBelowMinimum { monthly_revenue: Decimal, minimum: Decimal },
    ExcessiveNsf { count: usize, maximum: usize },
    ProhibitedIndustry { code: String, tier: u8 },
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blocker::CreditScoreBelowMinimum { score, minimum } => {
                write!(f, "credit score {score} is below the minimum of {minimum}")
            }
            Blocker::TimeInBusinessBelowMinimum { months, minimum } => {
                write!(f, "{months} months in business is below the minimum of {minimum}")
            }
            Blocker::RevenueBelowMinimum { monthly_revenue, minimum } => {
                write!(f, "monthly true revenue {monthly_revenue} is below the minimum of {minimum}")
            }
            Blocker::ExcessiveNsf { count, maximum } => {
                write!(f, "{count} NSF events exceed the maximum of {maximum}")
            }
            Blocker::ProhibitedIndustry { code, tier } => {
                write!(f, "industry '{code}' is tier {tier} and not fundable")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreCheckOutcome {
    pub passed: bool,
    /// In floor order: credit, time in business, revenue, NSF, industry.
    pub blockers: Vec<Blocker>,
}

/// Evaluates every floor; all violations are reported, not just the first.
pub fn run_precheck(
    request: &ScoringRequest<'_>,
    floors: &PreCheckFloors,
    industry: &IndustryRiskEntry,
) -> PreCheckOutcome {
    let mut blockers = Vec::new();

    if request.credit_score() < floors.min_credit_score {
        blockers.push(Blocker::CreditScoreBelowMinimum {
            score: request.credit_score(),
            minimum: floors.min_credit_score,
        });
    }
    if request.time_in_business_months() < floors.min_time_in_business_months {
        blockers.push(Blocker::TimeInBusinessBelowMinimum {
            months: request.time_in_business_months(),
            minimum: floors.min_time_in_business_months,
        });
    }
    if request.monthly_true_revenue() < floors.min_monthly_true_revenue {
        blockers.push(Blocker::RevenueBelowMinimum {
            monthly_revenue: request.monthly_true_revenue(),
            minimum: floors.min_monthly_true_revenue,
        });
    }
    let nsf = request.cashflow().lookback.nsf_count;
    if nsf > floors.max_nsf_count {
        blockers.push(Blocker::ExcessiveNsf {
            count: nsf,
            maximum: floors.max_nsf_count,
        });
    }
    if industry.tier >= floors.prohibited_tier {
        blockers.push(Blocker::ProhibitedIndustry {
            code: industry.code.clone(),
            tier: industry.tier,
        });
    }

    PreCheckOutcome {
        passed: blockers.is_empty(),
        blockers,
    }
}
