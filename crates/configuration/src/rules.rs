//! The ordered classification rule table and the lender alias directory.
//!
//! Rules are data: the classifier walks `RuleSet::rules()` in order and the
//! first rule carrying a category decides it. Ordering is by stage, then by
//! position in the configuration file.

use crate::error::ConfigError;
use core_types::{Direction, FlagSet, TransactionCategory, TransactionFlag};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

/// Evaluation stage. Rules of an earlier stage always run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStage {
    FinancingPayment,
    PeerToPeer,
    Pattern,
    Fallback,
}

/// A rule as written in the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub id: String,
    pub stage: RuleStage,
    /// Restricts the rule to credits or debits.
    #[serde(default)]
    pub direction: Option<Direction>,
    /// Match the memo against the lender alias directory.
    #[serde(default)]
    pub match_lender: bool,
    /// Case-insensitive regular expressions; any one matching is enough.
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub category: Option<TransactionCategory>,
    #[serde(default)]
    pub flags: Vec<TransactionFlag>,
}

#[derive(Debug, Clone)]
pub enum RuleMatcher {
    LenderAlias,
    Patterns(Vec<Regex>),
}

/// A compiled, validated rule.
#[derive(Debug, Clone)]
pub struct ClassificationRule {
    pub id: String,
    pub stage: RuleStage,
    pub direction: Option<Direction>,
    pub matcher: RuleMatcher,
    pub category: Option<TransactionCategory>,
    pub flags: FlagSet,
}

impl ClassificationRule {
    fn compile(spec: &RuleSpec) -> Result<Self, ConfigError> {
        if spec.id.trim().is_empty() {
            return Err(ConfigError::table("classification", "rule with an empty id"));
        }
        if spec.category.is_none() && spec.flags.is_empty() {
            return Err(ConfigError::table(
                "classification",
                format!("rule '{}' assigns neither a category nor flags", spec.id),
            ));
        }

        let matcher = match (spec.match_lender, spec.patterns.is_empty()) {
            (true, true) => RuleMatcher::LenderAlias,
            (true, false) => {
                return Err(ConfigError::table(
                    "classification",
                    format!("rule '{}' mixes match_lender with patterns", spec.id),
                ));
            }
            (false, true) => {
                return Err(ConfigError::table(
                    "classification",
                    format!("rule '{}' has nothing to match on", spec.id),
                ));
            }
            (false, false) => {
                let compiled = spec
                    .patterns
                    .iter()
                    .map(|p| {
                        RegexBuilder::new(p)
                            .case_insensitive(true)
                            .build()
                            .map_err(|source| ConfigError::InvalidPattern {
                                rule: spec.id.clone(),
                                source,
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                RuleMatcher::Patterns(compiled)
            }
        };

        Ok(Self {
            id: spec.id.clone(),
            stage: spec.stage,
            direction: spec.direction,
            matcher,
            category: spec.category,
            flags: spec.flags.iter().copied().collect(),
        })
    }

    /// Whether the rule applies to a transaction moving in `direction`.
    pub fn accepts(&self, direction: Direction) -> bool {
        self.direction.is_none_or(|d| d == direction)
    }
}

#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<ClassificationRule>,
}

impl RuleSet {
    pub fn compile(specs: &[RuleSpec]) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::EmptyRuleSet);
        }

        let mut rules = specs
            .iter()
            .map(ClassificationRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].iter().any(|r| r.id == rule.id) {
                return Err(ConfigError::table(
                    "classification",
                    format!("duplicate rule id '{}'", rule.id),
                ));
            }
        }

        // Stable: declaration order is the tie-break within a stage.
        rules.sort_by_key(|r| r.stage);
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn uses_lender_aliases(&self) -> bool {
        self.rules
            .iter()
            .any(|r| matches!(r.matcher, RuleMatcher::LenderAlias))
    }
}

/// One funder and the names it shows up under on statements.
#[derive(Debug, Clone, Deserialize)]
pub struct LenderAlias {
    pub lender: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Resolves statement memos to canonical lender names.
#[derive(Debug, Clone, Default)]
pub struct LenderDirectory {
    // (canonical name, upper-cased needles)
    entries: Vec<(String, Vec<String>)>,
}

impl LenderDirectory {
    pub fn new(aliases: &[LenderAlias]) -> Result<Self, ConfigError> {
        let mut entries = Vec::with_capacity(aliases.len());
        for alias in aliases {
            let lender = alias.lender.trim();
            if lender.is_empty() {
                return Err(ConfigError::table("lender alias", "entry with an empty lender name"));
            }
            if entries.iter().any(|(name, _): &(String, Vec<String>)| name.eq_ignore_ascii_case(lender)) {
                return Err(ConfigError::table(
                    "lender alias",
                    format!("lender '{lender}' listed twice"),
                ));
            }

            let mut needles = vec![lender.to_uppercase()];
            for a in &alias.aliases {
                let needle = a.trim().to_uppercase();
                if needle.is_empty() {
                    return Err(ConfigError::table(
                        "lender alias",
                        format!("empty alias for lender '{lender}'"),
                    ));
                }
                if !needles.contains(&needle) {
                    needles.push(needle);
                }
            }
            entries.push((lender.to_string(), needles));
        }
        Ok(Self { entries })
    }

    /// Returns the canonical lender for the first entry with an alias
    /// contained in `memo` (case-insensitive).
    pub fn resolve(&self, memo: &str) -> Option<&str> {
        let memo = memo.to_uppercase();
        self.entries
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| memo.contains(n.as_str())))
            .map(|(lender, _)| lender.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
