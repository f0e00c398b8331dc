use chrono::NaiveDate;
use configuration::{Component, UnderwritingConfig};
use core_types::{ApplicationData, Direction, Transaction, TransactionCategory};
use engine::{DealRequest, EngineError, UnderwritingEngine};
use risk::{Blocker, ValidationError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Builds a statement with a correct running balance from unordered entries.
fn statement(opening: Decimal, mut entries: Vec<(NaiveDate, Decimal, Direction, &str)>) -> Vec<Transaction> {
    entries.sort_by_key(|e| e.0);
    let mut balance = opening;
    entries
        .into_iter()
        .map(|(date, amount, direction, memo)| {
            let tx = Transaction::new(date, amount, direction, memo, None).unwrap();
            balance += tx.signed_amount();
            tx.with_balance(balance)
        })
        .collect()
}

/// Six months of card settlements for a restaurant. The 90-day lookback
/// ending 2024-06-30 holds $135,000 of revenue in three 30-day slices of
/// $37,000, $45,000 and $53,000, and one NSF fee.
fn restaurant_entries() -> Vec<(NaiveDate, Decimal, Direction, &'static str)> {
    let plan = [
        (1, dec!(8000)),
        (2, dec!(8000)),
        (3, dec!(8000)),
        (4, dec!(7400)),
        (5, dec!(9000)),
        (6, dec!(10600)),
    ];
    let mut entries = Vec::new();
    for (month, amount) in plan {
        for day in [5, 11, 17, 23, 29] {
            entries.push((date(2024, month, day), amount, Direction::Credit, "CLOVER SETTLEMENT"));
            entries.push((date(2024, month, day), amount, Direction::Debit, "PAYROLL ADP"));
        }
    }
    entries.push((date(2024, 5, 12), dec!(35), Direction::Debit, "NSF FEE"));
    entries.push((date(2024, 6, 30), dec!(400), Direction::Debit, "CITY UTILITIES"));
    entries
}

fn restaurant_application() -> ApplicationData {
    ApplicationData {
        business_name: "Harbor Grill LLC".to_string(),
        credit_score: Some(680),
        time_in_business_months: Some(36),
        industry_code: Some("restaurant".to_string()),
        processing_volume: Some(dec!(41000)),
        processor_tenure_months: Some(24),
        state: Some("NJ".to_string()),
    }
}

fn engine() -> UnderwritingEngine {
    UnderwritingEngine::new(Arc::new(UnderwritingConfig::builtin().unwrap()))
}

fn restaurant_deal() -> DealRequest {
    DealRequest::new(
        restaurant_application(),
        statement(dec!(15000), restaurant_entries()),
        dec!(10000),
    )
}

#[test]
fn test_restaurant_deal_is_approved_at_a_minus() {
    let decision = engine().evaluate(&restaurant_deal()).unwrap();

    let lookback = &decision.cashflow.lookback;
    assert_eq!(lookback.start, date(2024, 4, 2));
    assert_eq!(lookback.covered_days, 90);
    assert_eq!(lookback.monthly_true_revenue, dec!(45000));
    assert_eq!(lookback.nsf_count, 1);
    assert_eq!(lookback.negative_balance_days, 0);

    assert_eq!(decision.category_counts[&TransactionCategory::TrueRevenue], 30);
    assert_eq!(decision.stacking.active_count, 0);

    let scoring = &decision.scoring;
    assert!(scoring.precheck.passed);
    assert_eq!(scoring.total_score, dec!(89));
    assert_eq!(scoring.grade.grade, "A-");
    assert_eq!(scoring.grade.tier, 1);
    assert_eq!(scoring.industry_tier, 2);

    assert_eq!(decision.pricing.max_advance, dec!(7200));
    assert!(decision.pricing.max_advance > Decimal::ZERO);
    assert!(decision.is_approvable);
    assert!(decision.decline_reasons().is_empty());
}

#[test]
fn test_low_credit_deal_is_blocked() {
    let mut deal = restaurant_deal();
    deal.application.credit_score = Some(450);

    let decision = engine().evaluate(&deal).unwrap();

    assert!(!decision.scoring.precheck.passed);
    assert!(matches!(
        decision.scoring.precheck.blockers.as_slice(),
        [Blocker::CreditScoreBelowMinimum { score: 450, .. }]
    ));
    assert_eq!(decision.scoring.total_score, Decimal::ZERO);
    assert_eq!(decision.scoring.grade.grade, "F");
    assert!(!decision.pricing.is_approvable);
    assert!(!decision.is_approvable);
    assert_eq!(decision.decline_reasons().len(), 2);
}

#[test]
fn test_incomplete_application_is_a_validation_error() {
    let mut deal = restaurant_deal();
    deal.application.credit_score = None;
    deal.application.industry_code = Some("  ".to_string());

    let err = engine().evaluate(&deal).unwrap_err();
    match err {
        EngineError::Validation(ValidationError::MissingFields(fields)) => {
            assert_eq!(fields, vec!["credit_score", "industry_code"]);
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn test_statement_without_balances_cannot_be_scored() {
    let mut deal = restaurant_deal();
    for tx in &mut deal.transactions {
        tx.balance = None;
    }

    let err = engine().evaluate(&deal).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ref v) if v.missing_fields() == ["average_daily_balance"]
    ));
}

#[test]
fn test_empty_statement_is_an_analytics_error() {
    let deal = DealRequest::new(restaurant_application(), Vec::new(), dec!(10000));
    assert!(matches!(engine().evaluate(&deal), Err(EngineError::Analytics(_))));
}

#[test]
fn test_weekly_funder_is_detected_and_priced_in() {
    let mut entries = restaurant_entries();
    let mut day = date(2024, 4, 1);
    while day <= date(2024, 6, 24) {
        entries.push((day, dec!(1500), Direction::Debit, "KAPITUS ACH DEBIT"));
        day += chrono::Duration::days(7);
    }
    let deal = DealRequest::new(restaurant_application(), statement(dec!(40000), entries), dec!(10000));

    let decision = engine().evaluate(&deal).unwrap();

    assert_eq!(decision.stacking.active_count, 1);
    let position = &decision.stacking.positions[0];
    assert_eq!(position.lender, "Kapitus");
    assert_eq!(position.payment_count, 13);
    assert_eq!(decision.category_counts[&TransactionCategory::FinancingPayment], 13);
    assert_eq!(decision.scoring.debt_service_pct, Some(dec!(14.43)));
    assert_eq!(decision.scoring.components[&Component::PositionStacking], dec!(5));
    assert_eq!(decision.scoring.components[&Component::DebtService], dec!(3));
}

#[test]
fn test_evaluations_share_config_across_threads() {
    let engine = engine();
    let deal = restaurant_deal();
    let expected = engine.evaluate(&deal).unwrap();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let engine = engine.clone();
                let deal = &deal;
                scope.spawn(move || engine.evaluate(deal).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for decision in results {
        assert_eq!(decision, expected);
    }
}

#[test]
fn test_decision_serializes_to_json() {
    let decision = engine().evaluate(&restaurant_deal()).unwrap();
    let json = serde_json::to_value(&decision).unwrap();

    assert_eq!(json["scoring"]["grade"]["grade"], "A-");
    assert!(json["scoring"]["components"]["credit_score"].is_string());
    assert_eq!(json["is_approvable"], true);
}

#[test]
fn test_deal_request_round_trips_and_rejects_negative_lines() {
    let deal = restaurant_deal();
    let mut json = serde_json::to_value(&deal).unwrap();
    let decoded: DealRequest = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(decoded, deal);

    json["transactions"][0]["amount"] = serde_json::Value::String("-8000".to_string());
    assert!(serde_json::from_value::<DealRequest>(json).is_err());
}
