//! # Transaction Classification
//!
//! Assigns every statement line exactly one `TransactionCategory` and any
//! number of `TransactionFlag`s by walking the ordered rule table held in
//! `UnderwritingConfig`. Classification is pure: the same transactions and
//! the same rules always produce the same output, and feeding classified
//! output back in changes nothing.

pub mod engine;
pub mod error;

pub use engine::ClassificationEngine;
pub use error::ClassifierError;

use configuration::UnderwritingConfig;
use core_types::{ClassifiedTransaction, Transaction, TransactionCategory};
use std::collections::BTreeMap;

/// Classifies `transactions` with the rule table and lender directory in `config`.
#[tracing::instrument(name = "classify", skip_all, fields(transactions = transactions.len()))]
pub fn classify<T: AsRef<Transaction>>(
    transactions: &[T],
    config: &UnderwritingConfig,
) -> Result<Vec<ClassifiedTransaction>, ClassifierError> {
    let engine = ClassificationEngine::new(&config.rules, &config.lenders)?;
    let classified = engine.classify(transactions);

    tracing::debug!(
        categorised = classified.iter().filter(|c| c.rule_id.is_some()).count(),
        "Classification finished"
    );
    Ok(classified)
}

/// How many transactions landed in each category. Every category is present.
pub fn category_counts(classified: &[ClassifiedTransaction]) -> BTreeMap<TransactionCategory, usize> {
    let mut counts: BTreeMap<_, _> = TransactionCategory::ALL.iter().map(|c| (*c, 0)).collect();
    for c in classified {
        *counts.entry(c.category).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_classify_and_count() {
        let config = UnderwritingConfig::builtin().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let raw = vec![
            Transaction::credit(date, dec!(900), "CLOVER SETTLEMENT").unwrap(),
            Transaction::credit(date, dec!(400), "TOAST DEP").unwrap(),
            Transaction::debit(date, dec!(350), "CREDIBLY ACH PMT").unwrap(),
            Transaction::debit(date, dec!(60), "UTILITY CO").unwrap(),
        ];

        let classified = classify(&raw, &config).unwrap();
        let counts = category_counts(&classified);

        assert_eq!(counts.len(), TransactionCategory::ALL.len());
        assert_eq!(counts[&TransactionCategory::TrueRevenue], 2);
        assert_eq!(counts[&TransactionCategory::FinancingPayment], 1);
        assert_eq!(counts[&TransactionCategory::Other], 1);
        assert_eq!(counts[&TransactionCategory::Transfer], 0);
    }
}
