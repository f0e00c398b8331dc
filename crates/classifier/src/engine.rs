use crate::error::ClassifierError;
use configuration::{ClassificationRule, LenderDirectory, RuleMatcher, RuleSet};
use core_types::{ClassifiedTransaction, FlagSet, Transaction, TransactionCategory};

/// Walks the ordered rule table over each transaction.
///
/// The first matching rule that carries a category decides the category.
/// Every matching rule contributes its flags, before or after that point.
/// A transaction no rule categorises falls back to `Other`.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationEngine<'a> {
    rules: &'a RuleSet,
    lenders: &'a LenderDirectory,
}

impl<'a> ClassificationEngine<'a> {
    pub fn new(rules: &'a RuleSet, lenders: &'a LenderDirectory) -> Result<Self, ClassifierError> {
        if lenders.is_empty() {
            if let Some(rule) = rules
                .rules()
                .iter()
                .find(|r| matches!(r.matcher, RuleMatcher::LenderAlias))
            {
                return Err(ClassifierError::MissingLenderDirectory(rule.id.clone()));
            }
        }
        Ok(Self { rules, lenders })
    }

    pub fn classify<T: AsRef<Transaction>>(&self, transactions: &[T]) -> Vec<ClassifiedTransaction> {
        transactions
            .iter()
            .map(|t| self.classify_one(t.as_ref()))
            .collect()
    }

    pub fn classify_one(&self, transaction: &Transaction) -> ClassifiedTransaction {
        let mut category: Option<TransactionCategory> = None;
        let mut rule_id: Option<String> = None;
        let mut lender: Option<String> = None;
        let mut flags = FlagSet::empty();

        for rule in self.rules.rules() {
            if !rule.accepts(transaction.direction) {
                continue;
            }
            let Some(hit) = self.matches(rule, &transaction.memo) else {
                continue;
            };

            flags.extend(rule.flags.iter());
            if lender.is_none() {
                lender = hit.map(str::to_string);
            }
            if category.is_none() {
                if let Some(decided) = rule.category {
                    category = Some(decided);
                    rule_id = Some(rule.id.clone());
                }
            }
        }

        ClassifiedTransaction {
            transaction: transaction.clone(),
            category: category.unwrap_or(TransactionCategory::Other),
            flags,
            lender,
            rule_id,
        }
    }

    /// `None` when the rule does not match. `Some(lender)` otherwise, where
    /// `lender` is set only for alias matches.
    fn matches(&self, rule: &ClassificationRule, memo: &str) -> Option<Option<&'a str>> {
        match &rule.matcher {
            RuleMatcher::LenderAlias => self.lenders.resolve(memo).map(Some),
            RuleMatcher::Patterns(patterns) => patterns.iter().any(|p| p.is_match(memo)).then_some(None),
        }
    }
}
