//! # Cash-Flow Analytics Engine
//!
//! Turns classified transactions into a `CashFlowSummary`: calendar-month
//! buckets, trailing-window averages, a revenue trend, deposit volatility,
//! and a block of metrics over one fixed lookback (NSF events, negative
//! balance days, average daily balance, deposit variance, revenue).
//!
//! ## Architectural Principles
//!
//! - **Pure Calculation:** no I/O and no state between calls. The
//!   `AnalyticsEngine` borrows its settings and returns a fresh summary.
//! - **Explicit Windows:** every trailing metric names the window length it
//!   was computed over. A window without enough complete months is reported
//!   as unavailable, never silently shortened.
//! - **Sentinels, not Faults:** zero-mean series yield `ZeroMean` variants
//!   instead of dividing by zero.

pub mod buckets;
pub mod engine;
pub mod error;
pub mod report;
mod stats;

pub use buckets::{MonthlyBucket, MonthlyBuckets};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::{
    CashFlowSummary, Dispersion, LookbackMetrics, Trend, TrendDirection, Volatility, WindowAverage,
};

use configuration::AnalyticsSettings;
use core_types::ClassifiedTransaction;

/// Buckets `classified` by month and analyzes it in one step.
#[tracing::instrument(name = "analyze", skip_all, fields(transactions = classified.len()))]
pub fn analyze(
    classified: &[ClassifiedTransaction],
    settings: &AnalyticsSettings,
) -> Result<CashFlowSummary, AnalyticsError> {
    let buckets = MonthlyBuckets::from_transactions(classified, settings.edge_tolerance_days)?;
    AnalyticsEngine::new(settings).analyze(classified, &buckets)
}
