use crate::buckets::{MonthlyBucket, MonthlyBuckets};
use crate::error::AnalyticsError;
use crate::report::{
    CashFlowSummary, Dispersion, LookbackMetrics, Trend, TrendDirection, Volatility, WindowAverage,
};
use crate::stats::{coefficient_of_variation, mean};
use chrono::{Duration, NaiveDate};
use configuration::AnalyticsSettings;
use core_types::{ClassifiedTransaction, TransactionFlag};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// A stateless calculator for deriving cash-flow metrics from classified transactions.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsEngine<'a> {
    settings: &'a AnalyticsSettings,
}

impl<'a> AnalyticsEngine<'a> {
    pub fn new(settings: &'a AnalyticsSettings) -> Self {
        Self { settings }
    }

    /// The main entry point for calculating cash-flow metrics.
    ///
    /// # Arguments
    ///
    /// * `classified` - Every classified transaction of the statement.
    /// * `buckets` - The same transactions grouped by calendar month.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `CashFlowSummary` or an `AnalyticsError`.
    pub fn analyze(
        &self,
        classified: &[ClassifiedTransaction],
        buckets: &MonthlyBuckets,
    ) -> Result<CashFlowSummary, AnalyticsError> {
        if classified.is_empty() || buckets.is_empty() {
            return Err(AnalyticsError::NotEnoughData(
                "cash-flow analysis needs at least one transaction".to_string(),
            ));
        }

        let complete: Vec<&MonthlyBucket> = buckets.complete().collect();
        let windows = self.window_lengths();

        let window_averages = windows
            .iter()
            .map(|&n| window_average(&complete, n))
            .collect();
        let trend = self.trend(&complete, windows[0]);
        let volatility = volatility(&complete, &windows)?;
        let lookback = self.lookback_metrics(classified)?;

        let highest_revenue_month = complete
            .iter()
            .max_by(|a, b| a.true_revenue.cmp(&b.true_revenue).then(b.month.cmp(&a.month)))
            .map(|b| b.month);
        let lowest_revenue_month = complete
            .iter()
            .min_by(|a, b| a.true_revenue.cmp(&b.true_revenue).then(a.month.cmp(&b.month)))
            .map(|b| b.month);

        tracing::debug!(
            months = buckets.len(),
            complete = complete.len(),
            trend = ?trend.direction,
            "Cash-flow summary computed"
        );

        Ok(CashFlowSummary {
            months: buckets.all().to_vec(),
            window_averages,
            trend,
            volatility,
            lookback,
            highest_revenue_month,
            lowest_revenue_month,
        })
    }

    /// Configured window lengths, ascending and de-duplicated.
    fn window_lengths(&self) -> Vec<u32> {
        let mut windows = self.settings.window_months.clone();
        windows.sort_unstable();
        windows.dedup();
        if windows.is_empty() {
            windows.push(3);
        }
        windows
    }

    /// Compares the most recent `n` complete months with the `n` before them.
    fn trend(&self, complete: &[&MonthlyBucket], n: u32) -> Trend {
        let insufficient = Trend {
            window_months: n,
            direction: TrendDirection::InsufficientData,
            change_pct: None,
        };

        let len = n as usize;
        if complete.len() < 2 * len {
            return insufficient;
        }
        let revenue: Vec<Decimal> = complete.iter().map(|b| b.true_revenue).collect();
        let split = revenue.len() - len;
        let (Some(recent), Some(prior)) = (
            mean(&revenue[split..]),
            mean(&revenue[split - len..split]),
        ) else {
            return insufficient;
        };
        if prior.is_zero() {
            return insufficient;
        }

        let change_pct = ((recent - prior) / prior * Decimal::ONE_HUNDRED).round_dp(2);
        let threshold = self.settings.trend_threshold_pct;
        let direction = if change_pct > threshold {
            TrendDirection::Improving
        } else if change_pct < -threshold {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        };

        Trend {
            window_months: n,
            direction,
            change_pct: Some(change_pct),
        }
    }

    fn lookback_metrics(&self, classified: &[ClassifiedTransaction]) -> Result<LookbackMetrics, AnalyticsError> {
        // Stable sort keeps statement order within a day.
        let mut ordered: Vec<&ClassifiedTransaction> = classified.iter().collect();
        ordered.sort_by_key(|c| c.date());

        let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
            return Err(AnalyticsError::NotEnoughData("empty lookback".to_string()));
        };
        let end = last.date();
        let window_start = end - Duration::days(i64::from(self.settings.lookback_days.max(1)) - 1);
        let start = window_start.max(first.date());
        let covered_days = (end - start).num_days() + 1;

        let mut nsf_count = 0;
        let mut peer_to_peer_review_count = 0;
        let mut total_deposits = Decimal::ZERO;
        let mut total_withdrawals = Decimal::ZERO;
        let mut true_revenue = Decimal::ZERO;

        for c in ordered.iter().filter(|c| c.date() >= start) {
            if c.has_flag(TransactionFlag::NonSufficientFunds) || c.has_flag(TransactionFlag::Overdraft) {
                nsf_count += 1;
            }
            if c.has_flag(TransactionFlag::PeerToPeerReview) {
                peer_to_peer_review_count += 1;
            }
            if c.is_credit() {
                total_deposits += c.amount();
                if c.is_true_revenue() {
                    true_revenue += c.amount();
                }
            } else {
                total_withdrawals += c.amount();
            }
        }

        let monthly_true_revenue =
            (true_revenue * Decimal::from(30) / Decimal::from(covered_days)).round_dp(2);

        let daily = daily_balances(&ordered, start, end);
        let negative_balance_days = daily
            .as_ref()
            .map_or(0, |balances| balances.iter().filter(|b| b.is_sign_negative() && !b.is_zero()).count());
        let average_daily_balance = daily
            .as_ref()
            .and_then(|balances| mean(balances))
            .map(|adb| adb.round_dp(2));

        let deposit_variance = self.deposit_variance(&ordered, start, end)?;

        Ok(LookbackMetrics {
            start,
            end,
            covered_days: covered_days as u32,
            nsf_count,
            negative_balance_days,
            average_daily_balance,
            deposit_variance,
            total_deposits,
            total_withdrawals,
            true_revenue,
            monthly_true_revenue,
            peer_to_peer_review_count,
        })
    }

    /// Coefficient of variation of true revenue over whole slices counted
    /// back from `end`. A trailing partial slice is ignored.
    fn deposit_variance(
        &self,
        ordered: &[&ClassifiedTransaction],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Dispersion, AnalyticsError> {
        let slice_days = i64::from(self.settings.variance_slice_days.max(1));
        let slices = ((end - start).num_days() + 1) / slice_days;

        let totals: Vec<Decimal> = (0..slices)
            .map(|k| {
                let slice_end = end - Duration::days(k * slice_days);
                let slice_start = slice_end - Duration::days(slice_days - 1);
                ordered
                    .iter()
                    .filter(|c| c.is_true_revenue() && c.date() >= slice_start && c.date() <= slice_end)
                    .map(|c| c.amount())
                    .sum()
            })
            .collect();

        coefficient_of_variation(&totals)
    }
}

fn window_average(complete: &[&MonthlyBucket], n: u32) -> WindowAverage {
    let len = n as usize;
    if complete.len() < len {
        return WindowAverage {
            window_months: n,
            avg_deposits: None,
            avg_withdrawals: None,
            avg_true_revenue: None,
        };
    }
    let recent = &complete[complete.len() - len..];
    let avg = |f: fn(&MonthlyBucket) -> Decimal| {
        let values: Vec<Decimal> = recent.iter().map(|b| f(b)).collect();
        mean(&values).map(|v| v.round_dp(2))
    };

    WindowAverage {
        window_months: n,
        avg_deposits: avg(|b| b.deposits),
        avg_withdrawals: avg(|b| b.withdrawals),
        avg_true_revenue: avg(|b| b.true_revenue),
    }
}

/// Uses the longest configured window that has enough complete months.
fn volatility(complete: &[&MonthlyBucket], windows: &[u32]) -> Result<Volatility, AnalyticsError> {
    let Some(&n) = windows
        .iter()
        .rev()
        .find(|&&n| n >= 2 && complete.len() >= n as usize)
    else {
        return Ok(Volatility::Unavailable);
    };

    let deposits: Vec<Decimal> = complete[complete.len() - n as usize..]
        .iter()
        .map(|b| b.deposits)
        .collect();

    Ok(match coefficient_of_variation(&deposits)? {
        Dispersion::Coefficient(value) => Volatility::Coefficient { window_months: n, value },
        Dispersion::ZeroMean => Volatility::ZeroMean { window_months: n },
        Dispersion::Unavailable => Volatility::Unavailable,
    })
}

/// End-of-day balances for every day in `start..=end`, forward-filled.
///
/// Days before the first printed balance use the opening balance implied by
/// it. Returns `None` when no transaction carries a balance.
fn daily_balances(ordered: &[&ClassifiedTransaction], start: NaiveDate, end: NaiveDate) -> Option<Vec<Decimal>> {
    let mut end_of_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut opening: Option<Decimal> = None;

    for c in ordered {
        if let Some(balance) = c.transaction.balance {
            if opening.is_none() {
                opening = Some(balance - c.transaction.signed_amount());
            }
            end_of_day.insert(c.date(), balance);
        }
    }
    let opening = opening?;

    Some(
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .map(|day| {
                end_of_day
                    .range(..=day)
                    .next_back()
                    .map_or(opening, |(_, balance)| *balance)
            })
            .collect(),
    )
}
