use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryRiskEntry {
    pub code: String,
    pub name: String,
    /// 1 (lowest risk) to 5 (prohibited).
    pub tier: u8,
    /// Points added to the total score.
    pub score_adjustment: Decimal,
    /// Added to the grade's factor rate.
    pub factor_modifier: Decimal,
}

/// Lower-cases an industry code and folds spaces and hyphens into `_`.
pub fn normalize_code(code: &str) -> String {
    code.trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct IndustryTable {
    entries: HashMap<String, IndustryRiskEntry>,
    unclassified: IndustryRiskEntry,
}

impl IndustryTable {
    pub fn new(
        entries: Vec<IndustryRiskEntry>,
        unclassified: IndustryRiskEntry,
    ) -> Result<Self, ConfigError> {
        validate_entry(&unclassified)?;
        if !unclassified.score_adjustment.is_zero() {
            return Err(ConfigError::table(
                "industry",
                "the unclassified entry must not adjust the score",
            ));
        }

        let mut map = HashMap::with_capacity(entries.len());
        for mut entry in entries {
            validate_entry(&entry)?;
            entry.code = normalize_code(&entry.code);
            if entry.code.is_empty() {
                return Err(ConfigError::table("industry", "entry with an empty code"));
            }
            if map.contains_key(&entry.code) {
                return Err(ConfigError::table(
                    "industry",
                    format!("code '{}' listed twice", entry.code),
                ));
            }
            map.insert(entry.code.clone(), entry);
        }

        Ok(Self {
            entries: map,
            unclassified,
        })
    }

    pub fn get(&self, code: &str) -> Option<&IndustryRiskEntry> {
        self.entries.get(&normalize_code(code))
    }

    pub fn unclassified(&self) -> &IndustryRiskEntry {
        &self.unclassified
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_entry(entry: &IndustryRiskEntry) -> Result<(), ConfigError> {
    if !(1..=5).contains(&entry.tier) {
        return Err(ConfigError::table(
            "industry",
            format!("'{}' has tier {} outside 1..=5", entry.code, entry.tier),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::IndustrySettings;
    use rust_decimal_macros::dec;

    fn default_table() -> IndustryTable {
        let settings = IndustrySettings::default();
        IndustryTable::new(settings.entries, settings.unclassified).unwrap()
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" Auto-Repair "), "auto_repair");
        assert_eq!(normalize_code("Check Cashing"), "check_cashing");
    }

    #[test]
    fn test_lookup_is_normalised() {
        let table = default_table();
        let entry = table.get("Gas Station").unwrap();
        assert_eq!(entry.tier, 3);
        assert_eq!(entry.factor_modifier, dec!(0.02));
        assert!(table.get("space_mining").is_none());
    }

    #[test]
    fn test_unclassified_defaults_to_tier_three() {
        let table = default_table();
        assert_eq!(table.unclassified().tier, 3);
        assert!(table.unclassified().score_adjustment.is_zero());
    }

    #[test]
    fn test_bad_tier_rejected() {
        let mut settings = IndustrySettings::default();
        settings.entries[0].tier = 9;
        assert!(IndustryTable::new(settings.entries, settings.unclassified).is_err());
    }
}
