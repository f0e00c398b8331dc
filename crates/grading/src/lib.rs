//! # Grade & Industry Lookup
//!
//! Maps a numeric score onto the letter-grade table and an industry code
//! onto its risk entry. Both tables are validated when the configuration is
//! built, so lookups here cannot fail: every score in `[0, 100]` has exactly
//! one grade, and an unknown industry falls back to the `unclassified` entry.

use configuration::{FactorPosition, GradeDefinition, GradeTable, IndustryRiskEntry, IndustryTable};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Returns the highest grade whose minimum the score reaches.
///
/// Scores outside `[0, 100]` are clamped first, so the lowest grade always
/// matches.
pub fn grade(score: Decimal, table: &GradeTable) -> &GradeDefinition {
    let score = score.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    table
        .rows()
        .iter()
        .find(|row| row.min_score <= score)
        .unwrap_or_else(|| table.lowest())
}

/// Looks up an industry code after normalising it.
pub fn industry_risk<'t>(code: &str, table: &'t IndustryTable) -> Option<&'t IndustryRiskEntry> {
    table.get(code)
}

/// Like `industry_risk`, but falls back to the `unclassified` entry.
pub fn resolve_industry<'t>(code: Option<&str>, table: &'t IndustryTable) -> &'t IndustryRiskEntry {
    match code {
        Some(code) => industry_risk(code, table).unwrap_or_else(|| {
            tracing::warn!(industry = code, "Industry code not in the risk table, using unclassified");
            table.unclassified()
        }),
        None => table.unclassified(),
    }
}

pub fn is_tier_one(grade: &GradeDefinition) -> bool {
    grade.tier == 1
}

/// The factor rate at `position` inside the grade's factor range.
pub fn factor_at(grade: &GradeDefinition, position: FactorPosition) -> Decimal {
    let range = grade.factor_rate;
    match position {
        FactorPosition::Low => range.min,
        FactorPosition::Mid => ((range.min + range.max) / dec!(2)).round_dp(4),
        FactorPosition::High => range.max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::UnderwritingConfig;

    fn config() -> UnderwritingConfig {
        UnderwritingConfig::builtin().unwrap()
    }

    #[test]
    fn test_lower_bound_is_inclusive() {
        let config = config();
        assert_eq!(grade(dec!(80), &config.grades).grade, "B+");
        assert_eq!(grade(dec!(79.99), &config.grades).grade, "B");
        assert_eq!(grade(dec!(95), &config.grades).grade, "A+");
        assert_eq!(grade(dec!(89), &config.grades).grade, "A-");
        assert_eq!(grade(dec!(39.5), &config.grades).grade, "F");
    }

    #[test]
    fn test_out_of_range_scores_are_clamped() {
        let config = config();
        assert_eq!(grade(dec!(140), &config.grades).grade, "A+");
        assert_eq!(grade(dec!(-12), &config.grades).grade, "F");
    }

    #[test]
    fn test_grade_is_monotonic_and_covers_range() {
        let config = config();
        let mut previous_min = Decimal::ZERO;
        let mut score = Decimal::ZERO;
        while score <= Decimal::ONE_HUNDRED {
            let row = grade(score, &config.grades);
            assert!(row.min_score <= score);
            assert!(row.min_score >= previous_min, "grade fell at {score}");
            previous_min = row.min_score;
            score += dec!(0.5);
        }
    }

    #[test]
    fn test_only_f_is_unapprovable() {
        let config = config();
        assert!(!grade(dec!(10), &config.grades).approvable);
        assert!(grade(dec!(40), &config.grades).approvable);
    }

    #[test]
    fn test_industry_lookup_and_fallback() {
        let config = config();
        let restaurant = industry_risk("Restaurant", &config.industries).unwrap();
        assert_eq!(restaurant.tier, 2);

        let unknown = resolve_industry(Some("asteroid-mining"), &config.industries);
        assert_eq!(unknown.code, "unclassified");
        assert_eq!(unknown.tier, 3);

        assert_eq!(resolve_industry(None, &config.industries).tier, 3);
    }

    #[test]
    fn test_factor_positions() {
        let config = config();
        let b_plus = grade(dec!(82), &config.grades);
        assert_eq!(factor_at(b_plus, FactorPosition::Low), dec!(1.18));
        assert_eq!(factor_at(b_plus, FactorPosition::Mid), dec!(1.21));
        assert_eq!(factor_at(b_plus, FactorPosition::High), dec!(1.24));
        assert!(!is_tier_one(b_plus));
        assert!(is_tier_one(grade(dec!(97), &config.grades)));
    }
}
