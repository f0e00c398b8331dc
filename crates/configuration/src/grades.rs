use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalRange {
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    pub min: u32,
    pub max: u32,
}

/// One row of the letter-grade table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeDefinition {
    pub grade: String,
    /// Inclusive lower bound of the score band.
    pub min_score: Decimal,
    pub factor_rate: DecimalRange,
    /// Maximum advance as a percentage of monthly true revenue.
    pub max_advance_pct: Decimal,
    pub term_months: MonthRange,
    pub tier: u8,
    pub approvable: bool,
}

/// The validated grade table, sorted by descending `min_score`.
#[derive(Debug, Clone)]
pub struct GradeTable {
    rows: Vec<GradeDefinition>,
}

impl GradeTable {
    pub const EXPECTED_ROWS: usize = 13;

    pub fn new(mut rows: Vec<GradeDefinition>) -> Result<Self, ConfigError> {
        if rows.len() != Self::EXPECTED_ROWS {
            return Err(ConfigError::GradeCoverage(format!(
                "expected {} grades, found {}",
                Self::EXPECTED_ROWS,
                rows.len()
            )));
        }
        rows.sort_by(|a, b| b.min_score.cmp(&a.min_score));

        for pair in rows.windows(2) {
            if pair[0].min_score == pair[1].min_score {
                return Err(ConfigError::GradeCoverage(format!(
                    "grades {} and {} share minimum score {}",
                    pair[0].grade, pair[1].grade, pair[0].min_score
                )));
            }
        }

        // Non-empty: the row count was checked above.
        let top = &rows[0];
        let bottom = &rows[rows.len() - 1];
        if top.min_score > Decimal::ONE_HUNDRED {
            return Err(ConfigError::GradeCoverage(format!(
                "top grade {} starts above 100 at {}",
                top.grade, top.min_score
            )));
        }
        if !bottom.min_score.is_zero() {
            return Err(ConfigError::GradeCoverage(format!(
                "bottom grade {} starts at {}, leaving scores below it ungraded",
                bottom.grade, bottom.min_score
            )));
        }

        for row in &rows {
            let fail = |reason: String| ConfigError::table("grade", format!("{}: {reason}", row.grade));
            if row.grade.trim().is_empty() {
                return Err(ConfigError::table("grade", "row with an empty grade label"));
            }
            if row.factor_rate.min > row.factor_rate.max || row.factor_rate.min < Decimal::ONE {
                return Err(fail(format!(
                    "factor range {}..{} is not an ordered range of rates >= 1",
                    row.factor_rate.min, row.factor_rate.max
                )));
            }
            if row.term_months.min == 0 || row.term_months.min > row.term_months.max {
                return Err(fail(format!(
                    "term range {}..{} is not ordered",
                    row.term_months.min, row.term_months.max
                )));
            }
            if row.max_advance_pct <= Decimal::ZERO || row.max_advance_pct > Decimal::ONE_HUNDRED {
                return Err(fail(format!("max advance {}% out of range", row.max_advance_pct)));
            }
            if !(1..=5).contains(&row.tier) {
                return Err(fail(format!("tier {} outside 1..=5", row.tier)));
            }
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[GradeDefinition] {
        &self.rows
    }

    pub fn by_label(&self, grade: &str) -> Option<&GradeDefinition> {
        self.rows.iter().find(|r| r.grade == grade)
    }

    /// The row covering score 0.
    pub fn lowest(&self) -> &GradeDefinition {
        &self.rows[self.rows.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use rust_decimal_macros::dec;

    fn default_rows() -> Vec<GradeDefinition> {
        Settings::default().grades
    }

    #[test]
    fn test_default_table_is_valid_and_sorted() {
        let table = GradeTable::new(default_rows()).unwrap();
        assert_eq!(table.rows().len(), 13);
        assert_eq!(table.rows()[0].grade, "A+");
        assert_eq!(table.lowest().grade, "F");
        assert!(!table.lowest().approvable);
        assert!(table.rows().windows(2).all(|w| w[0].min_score > w[1].min_score));
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let mut rows = default_rows();
        rows.reverse();
        let table = GradeTable::new(rows).unwrap();
        assert_eq!(table.rows()[0].min_score, dec!(95));
    }

    #[test]
    fn test_gap_at_zero_rejected() {
        let mut rows = default_rows();
        let last = rows.len() - 1;
        rows[last].min_score = dec!(10);
        assert!(matches!(GradeTable::new(rows), Err(ConfigError::GradeCoverage(_))));
    }

    #[test]
    fn test_wrong_row_count_rejected() {
        let mut rows = default_rows();
        rows.remove(3);
        assert!(matches!(GradeTable::new(rows), Err(ConfigError::GradeCoverage(_))));
    }

    #[test]
    fn test_inverted_factor_range_rejected() {
        let mut rows = default_rows();
        rows[0].factor_rate = DecimalRange { min: dec!(1.20), max: dec!(1.10) };
        assert!(matches!(GradeTable::new(rows), Err(ConfigError::InvalidTable { .. })));
    }

    #[test]
    fn test_duplicate_minimum_rejected() {
        let mut rows = default_rows();
        rows[1].min_score = rows[0].min_score;
        assert!(matches!(GradeTable::new(rows), Err(ConfigError::GradeCoverage(_))));
    }
}
