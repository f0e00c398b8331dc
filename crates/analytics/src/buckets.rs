use crate::error::AnalyticsError;
use chrono::{Datelike, Months, NaiveDate};
use core_types::ClassifiedTransaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Totals for one calendar month of the statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    /// First day of the month.
    pub month: NaiveDate,
    pub deposits: Decimal,
    pub withdrawals: Decimal,
    pub true_revenue: Decimal,
    pub transaction_count: usize,
    /// False for an edge month the statement only partly covers.
    pub complete: bool,
}

impl MonthlyBucket {
    fn empty(month: NaiveDate) -> Self {
        Self {
            month,
            deposits: Decimal::ZERO,
            withdrawals: Decimal::ZERO,
            true_revenue: Decimal::ZERO,
            transaction_count: 0,
            complete: true,
        }
    }
}

/// Calendar-month buckets from the first to the last transaction month,
/// including months with no activity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyBuckets {
    buckets: Vec<MonthlyBucket>,
}

impl MonthlyBuckets {
    /// Groups `transactions` by month. The first and last month are complete
    /// only when the statement edge falls within `edge_tolerance_days` of the
    /// month boundary.
    pub fn from_transactions(
        transactions: &[ClassifiedTransaction],
        edge_tolerance_days: u32,
    ) -> Result<Self, AnalyticsError> {
        let (Some(first), Some(last)) = (
            transactions.iter().map(|t| t.date()).min(),
            transactions.iter().map(|t| t.date()).max(),
        ) else {
            return Err(AnalyticsError::NotEnoughData(
                "no transactions to bucket".to_string(),
            ));
        };

        let first_month = month_start(first)?;
        let last_month = month_start(last)?;

        let mut buckets = Vec::new();
        let mut month = first_month;
        while month <= last_month {
            buckets.push(MonthlyBucket::empty(month));
            month = next_month(month)?;
        }

        for t in transactions {
            let index = months_between(first_month, t.date());
            let bucket = &mut buckets[index];
            bucket.transaction_count += 1;
            if t.is_credit() {
                bucket.deposits += t.amount();
                if t.is_true_revenue() {
                    bucket.true_revenue += t.amount();
                }
            } else {
                bucket.withdrawals += t.amount();
            }
        }

        let tolerance = i64::from(edge_tolerance_days);
        if (first - first_month).num_days() > tolerance {
            buckets[0].complete = false;
        }
        let last_day = month_end(last_month)?;
        if (last_day - last).num_days() > tolerance {
            let end = buckets.len() - 1;
            buckets[end].complete = false;
        }

        Ok(Self { buckets })
    }

    pub fn all(&self) -> &[MonthlyBucket] {
        &self.buckets
    }

    /// Complete months in chronological order.
    pub fn complete(&self) -> impl Iterator<Item = &MonthlyBucket> {
        self.buckets.iter().filter(|b| b.complete)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

fn month_start(date: NaiveDate) -> Result<NaiveDate, AnalyticsError> {
    date.with_day(1)
        .ok_or_else(|| AnalyticsError::Calculation(format!("no first day for {date}")))
}

fn next_month(month: NaiveDate) -> Result<NaiveDate, AnalyticsError> {
    month
        .checked_add_months(Months::new(1))
        .ok_or_else(|| AnalyticsError::Calculation(format!("month after {month} out of range")))
}

fn month_end(month: NaiveDate) -> Result<NaiveDate, AnalyticsError> {
    next_month(month)?
        .pred_opt()
        .ok_or_else(|| AnalyticsError::Calculation(format!("no last day for {month}")))
}

fn months_between(from: NaiveDate, to: NaiveDate) -> usize {
    let months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    months.max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{FlagSet, Transaction, TransactionCategory};
    use rust_decimal_macros::dec;

    fn revenue(y: i32, m: u32, d: u32, amount: Decimal) -> ClassifiedTransaction {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        ClassifiedTransaction {
            transaction: Transaction::credit(date, amount, "SQUARE").unwrap(),
            category: TransactionCategory::TrueRevenue,
            flags: FlagSet::empty(),
            lender: None,
            rule_id: Some("card-settlement".to_string()),
        }
    }

    #[test]
    fn test_empty_months_are_included() {
        let txs = vec![revenue(2024, 1, 1, dec!(100)), revenue(2024, 4, 30, dec!(50))];
        let buckets = MonthlyBuckets::from_transactions(&txs, 3).unwrap();

        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets.all()[1].transaction_count, 0);
        assert_eq!(buckets.all()[1].deposits, Decimal::ZERO);
        assert!(buckets.all().iter().all(|b| b.complete));
    }

    #[test]
    fn test_partial_edge_months_are_incomplete() {
        let txs = vec![revenue(2024, 1, 15, dec!(100)), revenue(2024, 3, 10, dec!(50))];
        let buckets = MonthlyBuckets::from_transactions(&txs, 3).unwrap();

        let complete: Vec<_> = buckets.complete().map(|b| b.month).collect();
        assert_eq!(complete, vec![NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()]);
    }

    #[test]
    fn test_edge_within_tolerance_counts_as_complete() {
        let txs = vec![revenue(2024, 1, 4, dec!(100)), revenue(2024, 2, 26, dec!(50))];
        let buckets = MonthlyBuckets::from_transactions(&txs, 3).unwrap();
        // Feb 2024 has 29 days: the 26th is exactly three days short.
        assert_eq!(buckets.complete().count(), 2);
    }

    #[test]
    fn test_year_boundary() {
        let txs = vec![revenue(2023, 12, 1, dec!(10)), revenue(2024, 1, 31, dec!(20))];
        let buckets = MonthlyBuckets::from_transactions(&txs, 3).unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets.all()[1].true_revenue, dec!(20));
    }

    #[test]
    fn test_no_transactions_is_not_enough_data() {
        assert!(matches!(
            MonthlyBuckets::from_transactions(&[], 3),
            Err(AnalyticsError::NotEnoughData(_))
        ));
    }
}
