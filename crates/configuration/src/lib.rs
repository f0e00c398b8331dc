//! Reference tables for the underwriting pipeline.
//!
//! `load_settings` reads the raw, serde-shaped `Settings` from a TOML file and
//! `UNDERWRITING__*` environment variables. `UnderwritingConfig::from_settings`
//! validates every table and freezes the result; after that the config is
//! only ever shared read-only (usually behind an `Arc`).

use crate::error::ConfigError;
use rust_decimal::Decimal;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod defaults;
pub mod error;
pub mod grades;
pub mod industries;
pub mod logging;
pub mod rules;
pub mod settings;
pub mod weights;

// Re-export the core types to provide a clean public API.
pub use grades::{DecimalRange, GradeDefinition, GradeTable, MonthRange};
pub use industries::{IndustryRiskEntry, IndustryTable, normalize_code};
pub use rules::{ClassificationRule, LenderAlias, LenderDirectory, RuleMatcher, RuleSet, RuleStage};
pub use settings::{
    AnalyticsSettings, DealSizeTier, FactorPosition, LoggingSettings, PositionSettings,
    PreCheckFloors, PricingSettings, Settings, WarningThresholds,
};
pub use weights::{Component, CurveDirection, WeightTable};

/// Loads `Settings` from an optional TOML file, then applies environment
/// overrides such as `UNDERWRITING__PRICING__MIN_DEAL_SIZE=7500`.
///
/// Sections missing from both sources take their built-in defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }
    let settings = builder
        .add_source(config::Environment::with_prefix("UNDERWRITING").separator("__"))
        .build()?
        .try_deserialize::<Settings>()?;

    Ok(settings)
}

/// The validated, immutable reference tables every pipeline stage reads.
#[derive(Debug, Clone)]
pub struct UnderwritingConfig {
    pub rules: RuleSet,
    pub lenders: LenderDirectory,
    pub analytics: AnalyticsSettings,
    pub positions: PositionSettings,
    pub floors: PreCheckFloors,
    pub weights: WeightTable,
    pub warnings: WarningThresholds,
    pub grades: GradeTable,
    pub industries: IndustryTable,
    pub pricing: PricingSettings,
}

impl UnderwritingConfig {
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let rules = RuleSet::compile(&settings.classification.rules)?;
        let lenders = LenderDirectory::new(&settings.lenders)?;
        if rules.uses_lender_aliases() && lenders.is_empty() {
            return Err(ConfigError::table(
                "lender alias",
                "lender rules are configured but the lender directory is empty",
            ));
        }

        validate_analytics(&settings.analytics)?;
        validate_positions(&settings.positions)?;
        validate_floors(&settings.scoring.floors)?;
        validate_pricing(&settings.pricing)?;

        let weights = WeightTable::new(&settings.scoring.components)?;
        let grades = GradeTable::new(settings.grades)?;
        let industries =
            IndustryTable::new(settings.industries.entries, settings.industries.unclassified)?;

        tracing::debug!(
            rules = rules.len(),
            lenders = lenders.len(),
            industries = industries.len(),
            "Reference tables validated"
        );

        Ok(Self {
            rules,
            lenders,
            analytics: settings.analytics,
            positions: settings.positions,
            floors: settings.scoring.floors,
            weights,
            warnings: settings.scoring.warnings,
            grades,
            industries,
            pricing: settings.pricing,
        })
    }

    /// The stock policy with no file and no overrides.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_settings(Settings::default())
    }

    /// Reads and validates in one step.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_settings(load_settings(path)?)
    }
}

/// Roughly ten years of statement history.
pub const MAX_LOOKBACK_DAYS: u32 = 3660;

fn validate_analytics(analytics: &AnalyticsSettings) -> Result<(), ConfigError> {
    if analytics.window_months.is_empty() || analytics.window_months.contains(&0) {
        return Err(ConfigError::table(
            "analytics",
            "window_months must list at least one non-zero length",
        ));
    }
    if analytics.lookback_days == 0 || analytics.variance_slice_days == 0 {
        return Err(ConfigError::table(
            "analytics",
            "lookback_days and variance_slice_days must be positive",
        ));
    }
    if analytics.lookback_days > MAX_LOOKBACK_DAYS {
        return Err(ConfigError::table(
            "analytics",
            format!("lookback_days cannot exceed {MAX_LOOKBACK_DAYS}"),
        ));
    }
    if analytics.variance_slice_days > analytics.lookback_days {
        return Err(ConfigError::table(
            "analytics",
            "variance_slice_days cannot exceed lookback_days",
        ));
    }
    if analytics.trend_threshold_pct.is_sign_negative() {
        return Err(ConfigError::table("analytics", "trend_threshold_pct must be >= 0"));
    }
    Ok(())
}

fn validate_positions(positions: &PositionSettings) -> Result<(), ConfigError> {
    if positions.amount_tolerance_pct.is_sign_negative()
        || positions.amount_tolerance_pct >= Decimal::ONE_HUNDRED
    {
        return Err(ConfigError::table(
            "positions",
            format!("amount_tolerance_pct {} outside 0..100", positions.amount_tolerance_pct),
        ));
    }
    if positions.min_payments < 2 {
        return Err(ConfigError::table(
            "positions",
            "min_payments must be at least 2 to infer a frequency",
        ));
    }
    Ok(())
}

fn validate_floors(floors: &PreCheckFloors) -> Result<(), ConfigError> {
    if !(1..=5).contains(&floors.prohibited_tier) {
        return Err(ConfigError::table(
            "scoring floor",
            format!("prohibited_tier {} outside 1..=5", floors.prohibited_tier),
        ));
    }
    if floors.min_monthly_true_revenue.is_sign_negative() {
        return Err(ConfigError::table("scoring floor", "negative revenue floor"));
    }
    Ok(())
}

fn validate_pricing(pricing: &PricingSettings) -> Result<(), ConfigError> {
    if pricing.min_deal_size.is_sign_negative() {
        return Err(ConfigError::table("pricing", "negative min_deal_size"));
    }
    let Some((last, bounded)) = pricing.deal_tiers.split_last() else {
        return Err(ConfigError::table("pricing", "no deal-size tiers"));
    };
    if last.max_amount.is_some() {
        return Err(ConfigError::table(
            "pricing",
            format!("last deal tier '{}' must be open-ended", last.label),
        ));
    }

    let mut previous = Decimal::ZERO;
    for tier in bounded {
        let Some(max) = tier.max_amount else {
            return Err(ConfigError::table(
                "pricing",
                format!("only the last deal tier may be open-ended, not '{}'", tier.label),
            ));
        };
        if max <= previous {
            return Err(ConfigError::table(
                "pricing",
                format!("deal tier '{}' is not above the previous tier", tier.label),
            ));
        }
        previous = max;
    }
    Ok(())
}
