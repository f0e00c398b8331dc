use crate::grades::GradeDefinition;
use crate::industries::IndustryRiskEntry;
use crate::rules::{LenderAlias, RuleSpec};
use crate::weights::ComponentSpec;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure, as read from `underwriting.toml`.
///
/// Every section falls back to the built-in tables in `defaults.rs`, so an
/// empty file (or no file at all) yields the stock underwriting policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub classification: ClassificationSettings,
    pub lenders: Vec<LenderAlias>,
    pub analytics: AnalyticsSettings,
    pub positions: PositionSettings,
    pub scoring: ScoringSettings,
    pub grades: Vec<GradeDefinition>,
    pub industries: IndustrySettings,
    pub pricing: PricingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs also go to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassificationSettings {
    pub rules: Vec<RuleSpec>,
}

/// Parameters for the cash-flow analytics engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Trailing-average window lengths in months.
    pub window_months: Vec<u32>,
    /// Percentage change beyond which the trend is improving or declining.
    pub trend_threshold_pct: Decimal,
    /// The single fixed lookback used for NSF, negative days, ADB and variance.
    pub lookback_days: u32,
    /// Length of the slices the lookback is cut into for deposit variance.
    pub variance_slice_days: u32,
    /// How far inside a month the statement may start or end and still
    /// count that month as complete.
    pub edge_tolerance_days: u32,
}

/// Parameters for recurring financing-payment detection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PositionSettings {
    /// Payments within this percentage of a cluster's mean join the cluster.
    pub amount_tolerance_pct: Decimal,
    /// A cluster needs at least this many payments to count as a position.
    pub min_payments: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub floors: PreCheckFloors,
    pub components: Vec<ComponentSpec>,
    pub warnings: WarningThresholds,
}

/// Hard eligibility floors evaluated before any component is scored.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreCheckFloors {
    pub min_credit_score: u16,
    pub min_time_in_business_months: u32,
    pub min_monthly_true_revenue: Decimal,
    /// NSF events in the lookback above this count block the deal.
    pub max_nsf_count: usize,
    /// Industries at or above this tier are not funded.
    pub prohibited_tier: u8,
}

/// Soft limits that add a warning without blocking.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarningThresholds {
    pub stacked_positions: usize,
    pub debt_service_pct: Decimal,
    pub deposit_variance: Decimal,
    pub industry_tier: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndustrySettings {
    /// Applied to any industry code that is not in `entries`.
    pub unclassified: IndustryRiskEntry,
    pub entries: Vec<IndustryRiskEntry>,
}

/// Where inside a grade's factor range the quoted rate sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorPosition {
    Low,
    Mid,
    High,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub factor_position: FactorPosition,
    /// Advances below this amount are not worth funding.
    pub min_deal_size: Decimal,
    /// Ordered by `max_amount`; the last tier is open-ended.
    pub deal_tiers: Vec<DealSizeTier>,
}

/// Documentation required for an advance up to `max_amount`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DealSizeTier {
    pub label: String,
    pub max_amount: Option<Decimal>,
    pub required_statement_months: u32,
}
