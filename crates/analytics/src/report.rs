use crate::buckets::MonthlyBucket;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trailing averages over the N most recent complete months.
///
/// The averages are `None` when fewer than `window_months` complete months
/// exist; a window is never computed over a shorter span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowAverage {
    pub window_months: u32,
    pub avg_deposits: Option<Decimal>,
    pub avg_withdrawals: Option<Decimal>,
    pub avg_true_revenue: Option<Decimal>,
}

impl WindowAverage {
    pub fn is_available(&self) -> bool {
        self.avg_true_revenue.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
    InsufficientData,
}

/// Recent window of true revenue against the window before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub window_months: u32,
    pub direction: TrendDirection,
    /// Percentage change of the recent average over the prior average.
    pub change_pct: Option<Decimal>,
}

/// Sample coefficient of variation of monthly deposit totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Volatility {
    Coefficient { window_months: u32, value: Decimal },
    /// Every deposit total in the window was zero.
    ZeroMean { window_months: u32 },
    /// No configured window has enough complete months.
    Unavailable,
}

impl Volatility {
    pub fn window_months(&self) -> Option<u32> {
        match self {
            Volatility::Coefficient { window_months, .. } | Volatility::ZeroMean { window_months } => {
                Some(*window_months)
            }
            Volatility::Unavailable => None,
        }
    }
}

/// Spread of a series that has no window length of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Dispersion {
    Coefficient(Decimal),
    ZeroMean,
    /// Fewer than two observations.
    Unavailable,
}

impl Dispersion {
    pub fn coefficient(&self) -> Option<Decimal> {
        match self {
            Dispersion::Coefficient(value) => Some(*value),
            _ => None,
        }
    }
}

/// Metrics taken over the single fixed lookback ending at the latest transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookbackMetrics {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Calendar days actually covered; shorter than the lookback when the
    /// statement itself is shorter.
    pub covered_days: u32,
    /// Transactions flagged NSF or overdraft.
    pub nsf_count: usize,
    /// Days whose end-of-day balance was below zero.
    pub negative_balance_days: usize,
    /// `None` when the statement printed no running balance at all.
    pub average_daily_balance: Option<Decimal>,
    /// Coefficient of variation of true revenue across fixed-length slices.
    pub deposit_variance: Dispersion,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub true_revenue: Decimal,
    /// `true_revenue` scaled to a 30-day month.
    pub monthly_true_revenue: Decimal,
    pub peer_to_peer_review_count: usize,
}

impl LookbackMetrics {
    pub fn net_cash_flow(&self) -> Decimal {
        self.total_deposits - self.total_withdrawals
    }
}

/// The output of the cash-flow analytics stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSummary {
    pub months: Vec<MonthlyBucket>,
    pub window_averages: Vec<WindowAverage>,
    pub trend: Trend,
    pub volatility: Volatility,
    pub lookback: LookbackMetrics,
    /// First day of the complete month with the most true revenue.
    pub highest_revenue_month: Option<NaiveDate>,
    pub lowest_revenue_month: Option<NaiveDate>,
}

impl CashFlowSummary {
    pub fn window(&self, window_months: u32) -> Option<&WindowAverage> {
        self.window_averages
            .iter()
            .find(|w| w.window_months == window_months)
    }

    pub fn complete_months(&self) -> usize {
        self.months.iter().filter(|m| m.complete).count()
    }
}
