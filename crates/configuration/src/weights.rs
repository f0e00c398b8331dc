use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The eleven scored components. The declaration order is the reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    MonthlyRevenue,
    AverageDailyBalance,
    NsfOverdraft,
    NegativeDays,
    DepositConsistency,
    CreditScore,
    TimeInBusiness,
    IndustryRisk,
    PositionStacking,
    DebtService,
    MerchantProcessing,
}

impl Component {
    pub const ALL: [Component; 11] = [
        Component::MonthlyRevenue,
        Component::AverageDailyBalance,
        Component::NsfOverdraft,
        Component::NegativeDays,
        Component::DepositConsistency,
        Component::CreditScore,
        Component::TimeInBusiness,
        Component::IndustryRisk,
        Component::PositionStacking,
        Component::DebtService,
        Component::MerchantProcessing,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Component::MonthlyRevenue => "monthly_revenue",
            Component::AverageDailyBalance => "average_daily_balance",
            Component::NsfOverdraft => "nsf_overdraft",
            Component::NegativeDays => "negative_days",
            Component::DepositConsistency => "deposit_consistency",
            Component::CreditScore => "credit_score",
            Component::TimeInBusiness => "time_in_business",
            Component::IndustryRisk => "industry_risk",
            Component::PositionStacking => "position_stacking",
            Component::DebtService => "debt_service",
            Component::MerchantProcessing => "merchant_processing",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveDirection {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Breakpoint {
    pub threshold: Decimal,
    pub points: Decimal,
}

/// One component's entry in the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentSpec {
    pub component: Component,
    pub max_points: Decimal,
    pub direction: CurveDirection,
    pub breakpoints: Vec<Breakpoint>,
}

/// A monotonic step function from a metric to points.
///
/// * `HigherIsBetter`: the points of the highest threshold the value reaches;
///   zero below the first threshold.
/// * `LowerIsBetter`: the points of the lowest threshold the value does not
///   exceed; zero above the last threshold.
#[derive(Debug, Clone)]
pub struct BreakpointCurve {
    direction: CurveDirection,
    // Ascending by threshold.
    breakpoints: Vec<Breakpoint>,
}

impl BreakpointCurve {
    fn new(
        component: Component,
        direction: CurveDirection,
        mut breakpoints: Vec<Breakpoint>,
        max_points: Decimal,
    ) -> Result<Self, ConfigError> {
        let fail = |reason: String| ConfigError::table("weight", format!("{component}: {reason}"));

        if breakpoints.is_empty() {
            return Err(fail("no breakpoints".to_string()));
        }
        breakpoints.sort_by(|a, b| a.threshold.cmp(&b.threshold));

        for pair in breakpoints.windows(2) {
            if pair[0].threshold == pair[1].threshold {
                return Err(fail(format!("threshold {} listed twice", pair[0].threshold)));
            }
            let monotonic = match direction {
                CurveDirection::HigherIsBetter => pair[0].points <= pair[1].points,
                CurveDirection::LowerIsBetter => pair[0].points >= pair[1].points,
            };
            if !monotonic {
                return Err(fail(format!(
                    "points are not monotonic between thresholds {} and {}",
                    pair[0].threshold, pair[1].threshold
                )));
            }
        }

        if let Some(bp) = breakpoints
            .iter()
            .find(|bp| bp.points.is_sign_negative() || bp.points > max_points)
        {
            return Err(fail(format!(
                "breakpoint {} awards {} outside 0..={max_points}",
                bp.threshold, bp.points
            )));
        }

        let curve = Self {
            direction,
            breakpoints,
        };
        if curve.best() != max_points {
            return Err(fail(format!(
                "best breakpoint awards {} but the component maximum is {max_points}",
                curve.best()
            )));
        }
        Ok(curve)
    }

    pub fn points_for(&self, value: Decimal) -> Decimal {
        match self.direction {
            CurveDirection::HigherIsBetter => self
                .breakpoints
                .iter()
                .take_while(|bp| value >= bp.threshold)
                .last()
                .map_or(Decimal::ZERO, |bp| bp.points),
            CurveDirection::LowerIsBetter => self
                .breakpoints
                .iter()
                .find(|bp| value <= bp.threshold)
                .map_or(Decimal::ZERO, |bp| bp.points),
        }
    }

    /// The most points this curve can award.
    pub fn best(&self) -> Decimal {
        match self.direction {
            CurveDirection::HigherIsBetter => self.breakpoints.last(),
            CurveDirection::LowerIsBetter => self.breakpoints.first(),
        }
        .map_or(Decimal::ZERO, |bp| bp.points)
    }

    pub fn direction(&self) -> CurveDirection {
        self.direction
    }
}

#[derive(Debug, Clone)]
pub struct ComponentWeight {
    pub max_points: Decimal,
    pub curve: BreakpointCurve,
}

/// The validated eleven-component weight table. Maxima always sum to 100.
#[derive(Debug, Clone)]
pub struct WeightTable {
    components: BTreeMap<Component, ComponentWeight>,
}

impl WeightTable {
    pub const TOTAL_POINTS: Decimal = Decimal::ONE_HUNDRED;

    pub fn new(specs: &[ComponentSpec]) -> Result<Self, ConfigError> {
        let mut components = BTreeMap::new();

        for spec in specs {
            if spec.max_points.is_sign_negative() {
                return Err(ConfigError::table(
                    "weight",
                    format!("{}: negative maximum {}", spec.component, spec.max_points),
                ));
            }
            let curve = BreakpointCurve::new(
                spec.component,
                spec.direction,
                spec.breakpoints.clone(),
                spec.max_points,
            )?;
            let weight = ComponentWeight {
                max_points: spec.max_points,
                curve,
            };
            if components.insert(spec.component, weight).is_some() {
                return Err(ConfigError::table(
                    "weight",
                    format!("{} configured twice", spec.component),
                ));
            }
        }

        let missing: Vec<&str> = Component::ALL
            .iter()
            .filter(|c| !components.contains_key(*c))
            .map(|c| c.name())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::table(
                "weight",
                format!("missing components: {}", missing.join(", ")),
            ));
        }

        let table = Self { components };
        let total = table.total_max_points();
        if total != Self::TOTAL_POINTS {
            return Err(ConfigError::WeightsSum(total));
        }
        Ok(table)
    }

    pub fn get(&self, component: Component) -> &ComponentWeight {
        // Construction guarantees every component is present.
        &self.components[&component]
    }

    pub fn points_for(&self, component: Component, value: Decimal) -> Decimal {
        self.get(component).curve.points_for(value)
    }

    pub fn total_max_points(&self) -> Decimal {
        self.components.values().map(|w| w.max_points).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Component, &ComponentWeight)> {
        self.components.iter().map(|(c, w)| (*c, w))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use rust_decimal_macros::dec;

    fn default_specs() -> Vec<ComponentSpec> {
        Settings::default().scoring.components
    }

    #[test]
    fn test_default_weights_sum_to_100() {
        let table = WeightTable::new(&default_specs()).unwrap();
        assert_eq!(table.total_max_points(), dec!(100));
        assert_eq!(table.iter().count(), 11);
    }

    #[test]
    fn test_weights_not_summing_to_100_rejected() {
        let mut specs = default_specs();
        specs[0].max_points += dec!(1);
        let last = specs[0].breakpoints.len() - 1;
        specs[0].breakpoints[last].points += dec!(1);

        match WeightTable::new(&specs) {
            Err(ConfigError::WeightsSum(total)) => assert_eq!(total, dec!(101)),
            other => panic!("expected WeightsSum error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_component_rejected() {
        let mut specs = default_specs();
        specs.retain(|s| s.component != Component::DebtService);
        assert!(matches!(
            WeightTable::new(&specs),
            Err(ConfigError::InvalidTable { .. })
        ));
    }

    #[test]
    fn test_non_monotonic_curve_rejected() {
        let spec = ComponentSpec {
            component: Component::CreditScore,
            max_points: dec!(12),
            direction: CurveDirection::HigherIsBetter,
            breakpoints: vec![
                Breakpoint { threshold: dec!(500), points: dec!(8) },
                Breakpoint { threshold: dec!(600), points: dec!(4) },
                Breakpoint { threshold: dec!(700), points: dec!(12) },
            ],
        };
        assert!(BreakpointCurve::new(spec.component, spec.direction, spec.breakpoints, spec.max_points).is_err());
    }

    #[test]
    fn test_higher_is_better_steps() {
        let curve = BreakpointCurve::new(
            Component::TimeInBusiness,
            CurveDirection::HigherIsBetter,
            vec![
                Breakpoint { threshold: dec!(12), points: dec!(6) },
                Breakpoint { threshold: dec!(3), points: dec!(2) },
                Breakpoint { threshold: dec!(60), points: dec!(10) },
            ],
            dec!(10),
        )
        .unwrap();

        assert_eq!(curve.points_for(dec!(0)), dec!(0));
        assert_eq!(curve.points_for(dec!(3)), dec!(2));
        assert_eq!(curve.points_for(dec!(36)), dec!(6));
        assert_eq!(curve.points_for(dec!(600)), dec!(10));
    }

    #[test]
    fn test_lower_is_better_steps() {
        let curve = BreakpointCurve::new(
            Component::NsfOverdraft,
            CurveDirection::LowerIsBetter,
            vec![
                Breakpoint { threshold: dec!(0), points: dec!(10) },
                Breakpoint { threshold: dec!(2), points: dec!(6) },
                Breakpoint { threshold: dec!(5), points: dec!(2) },
            ],
            dec!(10),
        )
        .unwrap();

        assert_eq!(curve.points_for(dec!(0)), dec!(10));
        assert_eq!(curve.points_for(dec!(1)), dec!(6));
        assert_eq!(curve.points_for(dec!(5)), dec!(2));
        assert_eq!(curve.points_for(dec!(6)), dec!(0));
    }

    #[test]
    fn test_every_default_curve_is_monotonic() {
        let table = WeightTable::new(&default_specs()).unwrap();
        for (component, weight) in table.iter() {
            let mut previous: Option<Decimal> = None;
            for step in 0..=2000 {
                let value = Decimal::from(step) * dec!(50);
                let points = weight.curve.points_for(value);
                if let Some(prev) = previous {
                    match weight.curve.direction() {
                        CurveDirection::HigherIsBetter => assert!(points >= prev, "{component} at {value}"),
                        CurveDirection::LowerIsBetter => assert!(points <= prev, "{component} at {value}"),
                    }
                }
                previous = Some(points);
            }
        }
    }
}
