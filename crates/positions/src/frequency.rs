use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// How often a funder debits the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Irregular,
}

impl PaymentFrequency {
    /// Infers the schedule from the median number of days between payments.
    pub fn from_median_interval(days: Decimal) -> Self {
        if days <= dec!(2) {
            PaymentFrequency::Daily
        } else if (dec!(5)..=dec!(9)).contains(&days) {
            PaymentFrequency::Weekly
        } else if (dec!(12)..=dec!(16)).contains(&days) {
            PaymentFrequency::Biweekly
        } else if (dec!(26)..=dec!(35)).contains(&days) {
            PaymentFrequency::Monthly
        } else {
            PaymentFrequency::Irregular
        }
    }

    /// Business-day payments per month for the regular schedules; `None`
    /// for `Irregular`, which is extrapolated from the observed span instead.
    pub fn payments_per_month(&self) -> Option<Decimal> {
        match self {
            PaymentFrequency::Daily => Some(dec!(21)),
            PaymentFrequency::Weekly => Some(dec!(4.33)),
            PaymentFrequency::Biweekly => Some(dec!(2.17)),
            PaymentFrequency::Monthly => Some(Decimal::ONE),
            PaymentFrequency::Irregular => None,
        }
    }

    /// Gaps, in days, a payment on this schedule can land after the previous
    /// one once weekends and holidays shift it. `None` for `Irregular`.
    pub fn interval_window(&self) -> Option<RangeInclusive<i64>> {
        match self {
            PaymentFrequency::Daily => Some(1..=4),
            PaymentFrequency::Weekly => Some(5..=9),
            PaymentFrequency::Biweekly => Some(12..=16),
            PaymentFrequency::Monthly => Some(26..=35),
            PaymentFrequency::Irregular => None,
        }
    }

    /// Longest silence, in days, after which the position is no longer active.
    pub fn max_gap_days(&self) -> i64 {
        match self {
            PaymentFrequency::Daily => 5,
            PaymentFrequency::Weekly => 10,
            PaymentFrequency::Biweekly => 20,
            PaymentFrequency::Monthly => 40,
            PaymentFrequency::Irregular => 45,
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentFrequency::Daily => "daily",
            PaymentFrequency::Weekly => "weekly",
            PaymentFrequency::Biweekly => "biweekly",
            PaymentFrequency::Monthly => "monthly",
            PaymentFrequency::Irregular => "irregular",
        };
        f.write_str(label)
    }
}

/// Median of the gaps between consecutive dates, in days.
pub(crate) fn median_interval(days_between: &[i64]) -> Option<Decimal> {
    if days_between.is_empty() {
        return None;
    }
    let mut sorted = days_between.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        Decimal::from(sorted[mid - 1] + sorted[mid]) / dec!(2)
    } else {
        Decimal::from(sorted[mid])
    };
    Some(median)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_bands() {
        assert_eq!(PaymentFrequency::from_median_interval(dec!(1)), PaymentFrequency::Daily);
        assert_eq!(PaymentFrequency::from_median_interval(dec!(7)), PaymentFrequency::Weekly);
        assert_eq!(PaymentFrequency::from_median_interval(dec!(14)), PaymentFrequency::Biweekly);
        assert_eq!(PaymentFrequency::from_median_interval(dec!(31)), PaymentFrequency::Monthly);
        assert_eq!(PaymentFrequency::from_median_interval(dec!(3.5)), PaymentFrequency::Irregular);
        assert_eq!(PaymentFrequency::from_median_interval(dec!(60)), PaymentFrequency::Irregular);
    }

    #[test]
    fn test_interval_window_allows_weekend_shift() {
        let daily = PaymentFrequency::Daily.interval_window().unwrap();
        assert!(daily.contains(&3) && daily.contains(&4));
        assert!(PaymentFrequency::Weekly.interval_window().unwrap().contains(&8));
        assert!(!PaymentFrequency::Biweekly.interval_window().unwrap().contains(&17));
        assert_eq!(PaymentFrequency::Irregular.interval_window(), None);
    }

    #[test]
    fn test_median_interval_ignores_weekend_gaps() {
        // Mon..Fri debits with a weekend in between.
        assert_eq!(median_interval(&[1, 1, 1, 1, 3, 1, 1, 1, 1]), Some(dec!(1)));
        assert_eq!(median_interval(&[7, 7, 14, 14]), Some(dec!(10.5)));
        assert_eq!(median_interval(&[]), None);
    }
}
