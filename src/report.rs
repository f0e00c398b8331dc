//! Terminal tables for decisions and the grade table.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use configuration::{GradeTable, WeightTable};
use engine::UnderwritingDecision;

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub fn render_decision(decision: &UnderwritingDecision, weights: &WeightTable) -> String {
    let scoring = &decision.scoring;
    let pricing = &decision.pricing;
    let lookback = &decision.cashflow.lookback;

    let mut summary = table(vec!["Decision", "Value"]);
    summary
        .add_row(vec!["Approvable".to_string(), decision.is_approvable.to_string()])
        .add_row(vec!["Grade".to_string(), format!("{} (tier {})", scoring.grade.grade, scoring.grade.tier)])
        .add_row(vec![
            "Score".to_string(),
            format!(
                "{} total, {} industry, {} adjusted",
                scoring.total_score, scoring.industry_adjustment, scoring.adjusted_score
            ),
        ])
        .add_row(vec![
            "Industry".to_string(),
            format!("{} (tier {})", scoring.industry_code, scoring.industry_tier),
        ])
        .add_row(vec![
            "Lookback".to_string(),
            format!("{} to {} ({} days)", lookback.start, lookback.end, lookback.covered_days),
        ])
        .add_row(vec!["Monthly true revenue".to_string(), lookback.monthly_true_revenue.to_string()])
        .add_row(vec!["Average daily balance".to_string(), or_dash(lookback.average_daily_balance)])
        .add_row(vec!["NSF events".to_string(), lookback.nsf_count.to_string()])
        .add_row(vec!["Negative days".to_string(), lookback.negative_balance_days.to_string()])
        .add_row(vec!["Deposit variance".to_string(), or_dash(lookback.deposit_variance.coefficient())])
        .add_row(vec!["Active positions".to_string(), decision.stacking.active_count.to_string()])
        .add_row(vec!["Debt service %".to_string(), or_dash(scoring.debt_service_pct)])
        .add_row(vec!["Factor rate".to_string(), pricing.factor_rate.to_string()])
        .add_row(vec!["Max advance".to_string(), pricing.max_advance.to_string()])
        .add_row(vec!["Total repayment".to_string(), pricing.total_repayment.to_string()])
        .add_row(vec![
            "Term".to_string(),
            format!("{}-{} months", pricing.term_months.min, pricing.term_months.max),
        ])
        .add_row(vec![
            "Statements required".to_string(),
            format!("{} months ({})", pricing.required_statement_months, pricing.deal_tier),
        ]);

    let mut components = table(vec!["Component", "Points", "Max"]);
    for (component, points) in &scoring.components {
        components.add_row(vec![
            Cell::new(component),
            Cell::new(points),
            Cell::new(weights.get(*component).max_points),
        ]);
    }

    let mut out = format!("{summary}\n{components}\n");
    let reasons = decision.decline_reasons();
    if !reasons.is_empty() {
        out.push_str("\nDeclined:\n");
        for reason in reasons {
            out.push_str(&format!("  - {reason}\n"));
        }
    }
    if !scoring.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for warning in &scoring.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }
    out
}

pub fn render_grades(grades: &GradeTable) -> String {
    let mut grid = table(vec!["Grade", "Min score", "Factor rate", "Max advance %", "Term (months)", "Tier", "Approvable"]);
    for row in grades.rows() {
        grid.add_row(vec![
            row.grade.clone(),
            row.min_score.to_string(),
            format!("{}-{}", row.factor_rate.min, row.factor_rate.max),
            row.max_advance_pct.to_string(),
            format!("{}-{}", row.term_months.min, row.term_months.max),
            row.tier.to_string(),
            row.approvable.to_string(),
        ]);
    }
    grid.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration::UnderwritingConfig;

    #[test]
    fn test_grade_table_lists_every_grade() {
        let config = UnderwritingConfig::builtin().unwrap();
        let rendered = render_grades(&config.grades);
        for row in config.grades.rows() {
            assert!(rendered.contains(&row.grade));
        }
        assert!(rendered.contains("1.15-1.20"));
    }
}
