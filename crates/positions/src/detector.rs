use crate::error::PositionError;
use crate::frequency::{PaymentFrequency, median_interval};
use chrono::{Datelike, NaiveDate};
use configuration::{LenderDirectory, PositionSettings};
use core_types::{ClassifiedTransaction, TransactionCategory};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One recurring obligation to a funder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingPosition {
    pub lender: String,
    /// Mean payment amount of the lane.
    pub payment_amount: Decimal,
    pub frequency: PaymentFrequency,
    pub monthly_obligation: Decimal,
    pub payment_count: usize,
    pub first_seen: NaiveDate,
    pub last_seen: NaiveDate,
    pub is_active: bool,
}

/// Every detected position, plus the concurrent exposure as of the latest
/// transaction on the statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackingAnalysis {
    pub positions: Vec<FinancingPosition>,
    pub active_count: usize,
    /// Sum of `monthly_obligation` over the active positions.
    pub total_monthly_obligation: Decimal,
    pub as_of: Option<NaiveDate>,
    /// Financing payments no lender could be resolved for.
    pub unattributed_payments: usize,
}

impl StackingAnalysis {
    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            active_count: 0,
            total_monthly_obligation: Decimal::ZERO,
            as_of: None,
            unattributed_payments: 0,
        }
    }

    pub fn active(&self) -> impl Iterator<Item = &FinancingPosition> {
        self.positions.iter().filter(|p| p.is_active)
    }
}

#[derive(Debug, Clone, Copy)]
struct Payment {
    date: NaiveDate,
    amount: Decimal,
}

/// Payments of one lender whose amounts sit within tolerance of their mean.
#[derive(Debug)]
struct AmountCluster {
    total: Decimal,
    payments: Vec<Payment>,
}

impl AmountCluster {
    fn mean(&self) -> Decimal {
        self.total / Decimal::from(self.payments.len())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PositionDetector<'a> {
    settings: &'a PositionSettings,
    lenders: &'a LenderDirectory,
}

impl<'a> PositionDetector<'a> {
    pub fn new(settings: &'a PositionSettings, lenders: &'a LenderDirectory) -> Result<Self, PositionError> {
        let tolerance = settings.amount_tolerance_pct;
        if tolerance.is_sign_negative() || tolerance >= Decimal::ONE_HUNDRED {
            return Err(PositionError::InvalidTolerance(tolerance));
        }
        if settings.min_payments < 2 {
            return Err(PositionError::InvalidMinPayments(settings.min_payments));
        }
        Ok(Self { settings, lenders })
    }

    pub fn detect(&self, classified: &[ClassifiedTransaction]) -> StackingAnalysis {
        let Some(as_of) = classified.iter().map(|c| c.date()).max() else {
            return StackingAnalysis::empty();
        };

        let (by_lender, unattributed_payments) = self.payments_by_lender(classified);

        let mut positions = Vec::new();
        for (lender, payments) in &by_lender {
            for cluster in self.cluster_by_amount(payments) {
                for lane in split_into_lanes(&cluster.payments).into_iter().flat_map(split_by_phase) {
                    if lane.len() < self.settings.min_payments {
                        tracing::debug!(lender = %lender, payments = lane.len(), "Too few payments for a position");
                        continue;
                    }
                    if let Some(position) = build_position(lender, &lane, as_of) {
                        positions.push(position);
                    }
                }
            }
        }

        positions.sort_by(|a, b| {
            a.lender
                .cmp(&b.lender)
                .then(a.first_seen.cmp(&b.first_seen))
                .then(a.payment_amount.cmp(&b.payment_amount))
        });

        let active_count = positions.iter().filter(|p| p.is_active).count();
        let total_monthly_obligation = positions
            .iter()
            .filter(|p| p.is_active)
            .map(|p| p.monthly_obligation)
            .sum();

        tracing::debug!(
            positions = positions.len(),
            active = active_count,
            %total_monthly_obligation,
            "Stacking analysis computed"
        );

        StackingAnalysis {
            positions,
            active_count,
            total_monthly_obligation,
            as_of: Some(as_of),
            unattributed_payments,
        }
    }

    /// Financing-payment debits grouped by canonical lender, in date order.
    fn payments_by_lender(&self, classified: &[ClassifiedTransaction]) -> (BTreeMap<String, Vec<Payment>>, usize) {
        let mut by_lender: BTreeMap<String, Vec<Payment>> = BTreeMap::new();
        let mut unattributed = 0;

        for c in classified
            .iter()
            .filter(|c| c.category == TransactionCategory::FinancingPayment && !c.is_credit())
        {
            let lender = c
                .lender
                .clone()
                .or_else(|| self.lenders.resolve(&c.transaction.memo).map(str::to_string));
            let Some(lender) = lender else {
                tracing::debug!(memo = %c.transaction.memo, "Financing payment with no known lender skipped");
                unattributed += 1;
                continue;
            };
            by_lender.entry(lender).or_default().push(Payment {
                date: c.date(),
                amount: c.amount(),
            });
        }

        for payments in by_lender.values_mut() {
            payments.sort_by_key(|p| p.date);
        }
        (by_lender, unattributed)
    }

    /// Each payment joins the first cluster whose running mean it is within
    /// tolerance of, or starts a new one.
    fn cluster_by_amount(&self, payments: &[Payment]) -> Vec<AmountCluster> {
        let tolerance = self.settings.amount_tolerance_pct / Decimal::ONE_HUNDRED;
        let mut clusters: Vec<AmountCluster> = Vec::new();

        for payment in payments {
            let home = clusters.iter_mut().find(|cluster| {
                let mean = cluster.mean();
                (payment.amount - mean).abs() <= mean * tolerance
            });
            match home {
                Some(cluster) => {
                    cluster.total += payment.amount;
                    cluster.payments.push(*payment);
                }
                None => clusters.push(AmountCluster {
                    total: payment.amount,
                    payments: vec![*payment],
                }),
            }
        }
        clusters
    }
}

/// The n-th payment on any date goes to lane n, so two same-size advances
/// from one funder drawn on the same days become two positions.
fn split_into_lanes(payments: &[Payment]) -> Vec<Vec<Payment>> {
    let mut lanes: Vec<Vec<Payment>> = Vec::new();
    let mut index_on_day = 0;
    let mut current_day: Option<NaiveDate> = None;

    for payment in payments {
        if current_day == Some(payment.date) {
            index_on_day += 1;
        } else {
            current_day = Some(payment.date);
            index_on_day = 0;
        }
        if lanes.len() <= index_on_day {
            lanes.push(Vec::new());
        }
        lanes[index_on_day].push(*payment);
    }
    lanes
}

/// Groups payments by weekday, then by day of month.
const PHASES: [fn(&Payment) -> u32; 2] = [
    |p| p.date.weekday().num_days_from_monday(),
    |p| p.date.day(),
];

/// A lane that interleaves several schedules of the same amount, such as
/// one debit every Monday and another every Thursday, is split into one
/// lane per schedule. The phase grouping with the fewest groups wins, and
/// only when every group is itself weekly, biweekly or monthly. Otherwise
/// the lane is kept whole, so every payment still lands in exactly one lane.
fn split_by_phase(lane: Vec<Payment>) -> Vec<Vec<Payment>> {
    if holds_cadence(&lane) {
        return vec![lane];
    }

    let mut best: Option<Vec<Vec<Payment>>> = None;
    for phase in PHASES {
        let mut groups: BTreeMap<u32, Vec<Payment>> = BTreeMap::new();
        for payment in &lane {
            groups.entry(phase(payment)).or_default().push(*payment);
        }
        if groups.len() < 2 || !groups.values().all(|group| is_periodic(group)) {
            continue;
        }
        if best.as_ref().is_none_or(|b| groups.len() < b.len()) {
            best = Some(groups.into_values().collect());
        }
    }

    match best {
        Some(schedules) => {
            tracing::debug!(schedules = schedules.len(), "Interleaved schedules split by phase");
            schedules
        }
        None => vec![lane],
    }
}

fn intervals(payments: &[Payment]) -> Vec<i64> {
    payments
        .windows(2)
        .map(|w| (w[1].date - w[0].date).num_days())
        .collect()
}

/// Daily lanes, and regular lanes whose every gap fits their schedule.
fn holds_cadence(lane: &[Payment]) -> bool {
    let gaps = intervals(lane);
    match median_interval(&gaps).map(PaymentFrequency::from_median_interval) {
        None | Some(PaymentFrequency::Daily) => true,
        Some(frequency) => frequency
            .interval_window()
            .is_some_and(|window| gaps.iter().all(|gap| window.contains(gap))),
    }
}

fn is_periodic(group: &[Payment]) -> bool {
    matches!(
        median_interval(&intervals(group)).map(PaymentFrequency::from_median_interval),
        Some(PaymentFrequency::Weekly | PaymentFrequency::Biweekly | PaymentFrequency::Monthly)
    )
}

fn build_position(lender: &str, lane: &[Payment], as_of: NaiveDate) -> Option<FinancingPosition> {
    let first_seen = lane.first()?.date;
    let last_seen = lane.last()?.date;

    let gaps = intervals(lane);
    let frequency = PaymentFrequency::from_median_interval(median_interval(&gaps)?);

    let count = Decimal::from(lane.len());
    let payment_amount = (lane.iter().map(|p| p.amount).sum::<Decimal>() / count).round_dp(2);

    let per_month = match frequency.payments_per_month() {
        Some(per_month) => per_month,
        None => {
            let span = (last_seen - first_seen).num_days().max(1);
            Decimal::from(gaps.len()) * Decimal::from(30) / Decimal::from(span)
        }
    };
    let monthly_obligation = (payment_amount * per_month).round_dp(2);
    let is_active = (as_of - last_seen).num_days() <= frequency.max_gap_days();

    Some(FinancingPosition {
        lender: lender.to_string(),
        payment_amount,
        frequency,
        monthly_obligation,
        payment_count: lane.len(),
        first_seen,
        last_seen,
        is_active,
    })
}
