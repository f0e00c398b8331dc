// --- Default Implementations ---
// The stock underwriting policy. Any section left out of `underwriting.toml`
// falls back to the values below.

use crate::grades::{DecimalRange, GradeDefinition, MonthRange};
use crate::industries::IndustryRiskEntry;
use crate::rules::{LenderAlias, RuleSpec, RuleStage};
use crate::settings::{
    AnalyticsSettings, ClassificationSettings, DealSizeTier, FactorPosition, IndustrySettings,
    LoggingSettings, PositionSettings, PreCheckFloors, PricingSettings, ScoringSettings, Settings,
    WarningThresholds,
};
use crate::weights::{Breakpoint, Component, ComponentSpec, CurveDirection};
use core_types::{Direction, TransactionCategory, TransactionFlag};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

impl Default for Settings {
    fn default() -> Self {
        Self {
            logging: LoggingSettings::default(),
            classification: ClassificationSettings::default(),
            lenders: default_lenders(),
            analytics: AnalyticsSettings::default(),
            positions: PositionSettings::default(),
            scoring: ScoringSettings::default(),
            grades: default_grades(),
            industries: IndustrySettings::default(),
            pricing: PricingSettings::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "underwriter.log".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

const P2P_PATTERNS: &[&str] = &[r"\bZELLE\b", r"\bVENMO\b", r"CASH\s?APP", r"PAYPAL\s+FRIENDS"];

fn rule(
    id: &str,
    stage: RuleStage,
    direction: Option<Direction>,
    patterns: &[&str],
    category: Option<TransactionCategory>,
    flags: &[TransactionFlag],
) -> RuleSpec {
    RuleSpec {
        id: id.to_string(),
        stage,
        direction,
        match_lender: false,
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
        category,
        flags: flags.to_vec(),
    }
}

fn lender_rule(id: &str, direction: Direction, category: TransactionCategory) -> RuleSpec {
    RuleSpec {
        id: id.to_string(),
        stage: RuleStage::FinancingPayment,
        direction: Some(direction),
        match_lender: true,
        patterns: Vec::new(),
        category: Some(category),
        flags: vec![TransactionFlag::LenderMatch],
    }
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        use RuleStage::{Fallback, Pattern};
        use TransactionCategory as Category;
        use TransactionFlag::*;

        let credit = Some(Direction::Credit);

        Self {
            rules: vec![
                lender_rule("lender-payment", Direction::Debit, Category::FinancingPayment),
                lender_rule("lender-funding", Direction::Credit, Category::LoanProceeds),
                rule("p2p-channel", RuleStage::PeerToPeer, None, P2P_PATTERNS, None, &[PeerToPeerReview]),
                rule(
                    "nsf",
                    Pattern,
                    None,
                    &[
                        r"\bNSF\b",
                        r"NON.?SUFFICIENT",
                        r"INSUFFICIENT",
                        r"RETURNED.?ITEM",
                        r"RETURN.?CHECK",
                        r"UNCOLLECTED",
                    ],
                    None,
                    &[NonSufficientFunds],
                ),
                rule("overdraft", Pattern, None, &[r"OVERDRAFT", r"\bOD FEE\b"], None, &[Overdraft]),
                rule(
                    "wire",
                    Pattern,
                    None,
                    &[r"\bWIRE\b", r"FED\s?WIRE", r"\bORIG:", r"\bCHIPS\b"],
                    None,
                    &[Wire],
                ),
                rule(
                    "internal-transfer",
                    Pattern,
                    None,
                    &[
                        r"TRANSFER",
                        r"\bXFER\b",
                        r"DEPOSIT\s+FROM\s+SAVINGS",
                        r"\bOWNER\b",
                        r"CONTRIBUTION",
                    ],
                    Some(Category::Transfer),
                    &[],
                ),
                rule(
                    "loan-proceeds",
                    Pattern,
                    credit,
                    &[r"\bLOAN\b", r"\bADVANCE\b", r"\bFUNDING\b", r"\bSBA\b"],
                    Some(Category::LoanProceeds),
                    &[],
                ),
                rule(
                    "card-settlement",
                    Pattern,
                    credit,
                    &[
                        r"\bPOS\b",
                        r"\bCARD\b",
                        r"MERCHANT",
                        r"SQUARE",
                        r"STRIPE",
                        r"PAYPAL",
                        r"CLOVER",
                        r"TOAST",
                        r"CUSTOMER",
                        r"\bSALES\b",
                        r"INVOICE",
                        r"MOBILE\s+DEPOSIT",
                        r"ACH\s+CREDIT",
                        r"REMOTE\s+DEPOSIT",
                    ],
                    Some(Category::TrueRevenue),
                    &[],
                ),
                rule(
                    "customer-wire",
                    Pattern,
                    credit,
                    &[r"\bWIRE\b", r"\bORIG:"],
                    Some(Category::TrueRevenue),
                    &[],
                ),
                rule("p2p-unresolved", Fallback, credit, P2P_PATTERNS, Some(Category::PeerToPeer), &[]),
            ],
        }
    }
}

fn default_lenders() -> Vec<LenderAlias> {
    let lender = |name: &str, aliases: &[&str]| LenderAlias {
        lender: name.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    };
    vec![
        lender("Fora Financial", &[]),
        lender("Kapitus", &[]),
        lender("Credibly", &[]),
        lender("Fundbox", &[]),
        lender("Bluevine", &[]),
        lender("OnDeck", &["ON DECK CAPITAL", "ODK CAPITAL"]),
        lender("Kabbage", &[]),
        lender("Rapid Finance", &["RAPID FUNDING"]),
        lender("CAN Capital", &[]),
        lender("Forward Financing", &[]),
        lender("Libertas Funding", &["LIBERTAS"]),
        lender("Yellowstone Capital", &[]),
    ]
}

// ---------------------------------------------------------------------------
// Analytics & positions
// ---------------------------------------------------------------------------

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            window_months: vec![3, 6, 12],
            trend_threshold_pct: dec!(10),
            lookback_days: 90,
            variance_slice_days: 30,
            edge_tolerance_days: 3,
        }
    }
}

impl Default for PositionSettings {
    fn default() -> Self {
        Self {
            amount_tolerance_pct: dec!(5),
            min_payments: 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            floors: PreCheckFloors::default(),
            components: default_components(),
            warnings: WarningThresholds::default(),
        }
    }
}

impl Default for PreCheckFloors {
    fn default() -> Self {
        Self {
            min_credit_score: 500,
            min_time_in_business_months: 3,
            min_monthly_true_revenue: dec!(10000),
            max_nsf_count: 10,
            prohibited_tier: 5,
        }
    }
}

impl Default for WarningThresholds {
    fn default() -> Self {
        Self {
            stacked_positions: 2,
            debt_service_pct: dec!(25),
            deposit_variance: dec!(0.40),
            industry_tier: 4,
        }
    }
}

fn component(
    component: Component,
    max_points: Decimal,
    direction: CurveDirection,
    steps: &[(Decimal, Decimal)],
) -> ComponentSpec {
    ComponentSpec {
        component,
        max_points,
        direction,
        breakpoints: steps
            .iter()
            .map(|&(threshold, points)| Breakpoint { threshold, points })
            .collect(),
    }
}

fn default_components() -> Vec<ComponentSpec> {
    use Component::*;
    use CurveDirection::*;

    vec![
        component(
            MonthlyRevenue,
            dec!(15),
            HigherIsBetter,
            &[
                (dec!(10000), dec!(5)),
                (dec!(20000), dec!(9)),
                (dec!(30000), dec!(12)),
                (dec!(40000), dec!(14)),
                (dec!(75000), dec!(15)),
            ],
        ),
        component(
            AverageDailyBalance,
            dec!(10),
            HigherIsBetter,
            &[
                (dec!(1000), dec!(2)),
                (dec!(2500), dec!(4)),
                (dec!(5000), dec!(6)),
                (dec!(10000), dec!(8)),
                (dec!(25000), dec!(10)),
            ],
        ),
        component(
            NsfOverdraft,
            dec!(10),
            LowerIsBetter,
            &[
                (dec!(0), dec!(10)),
                (dec!(1), dec!(8)),
                (dec!(2), dec!(6)),
                (dec!(3), dec!(4)),
                (dec!(5), dec!(2)),
            ],
        ),
        component(
            NegativeDays,
            dec!(8),
            LowerIsBetter,
            &[
                (dec!(0), dec!(8)),
                (dec!(2), dec!(6)),
                (dec!(5), dec!(3)),
                (dec!(10), dec!(1)),
            ],
        ),
        component(
            DepositConsistency,
            dec!(8),
            LowerIsBetter,
            &[
                (dec!(0.10), dec!(8)),
                (dec!(0.20), dec!(7)),
                (dec!(0.30), dec!(5)),
                (dec!(0.45), dec!(3)),
                (dec!(0.60), dec!(1)),
            ],
        ),
        component(
            CreditScore,
            dec!(12),
            HigherIsBetter,
            &[
                (dec!(500), dec!(2)),
                (dec!(550), dec!(4)),
                (dec!(600), dec!(6)),
                (dec!(650), dec!(8)),
                (dec!(680), dec!(10)),
                (dec!(720), dec!(11)),
                (dec!(750), dec!(12)),
            ],
        ),
        component(
            TimeInBusiness,
            dec!(10),
            HigherIsBetter,
            &[
                (dec!(3), dec!(2)),
                (dec!(6), dec!(4)),
                (dec!(12), dec!(6)),
                (dec!(24), dec!(8)),
                (dec!(60), dec!(10)),
            ],
        ),
        component(
            IndustryRisk,
            dec!(7),
            LowerIsBetter,
            &[
                (dec!(1), dec!(7)),
                (dec!(2), dec!(6)),
                (dec!(3), dec!(4)),
                (dec!(4), dec!(2)),
                (dec!(5), dec!(0)),
            ],
        ),
        component(
            PositionStacking,
            dec!(8),
            LowerIsBetter,
            &[
                (dec!(0), dec!(8)),
                (dec!(1), dec!(5)),
                (dec!(2), dec!(3)),
                (dec!(3), dec!(1)),
            ],
        ),
        component(
            DebtService,
            dec!(7),
            LowerIsBetter,
            &[
                (dec!(0), dec!(7)),
                (dec!(10), dec!(5)),
                (dec!(20), dec!(3)),
                (dec!(30), dec!(1)),
            ],
        ),
        component(
            MerchantProcessing,
            dec!(5),
            HigherIsBetter,
            &[(dec!(6), dec!(2)), (dec!(12), dec!(3)), (dec!(24), dec!(5))],
        ),
    ]
}

// ---------------------------------------------------------------------------
// Grades & industries
// ---------------------------------------------------------------------------

fn default_grades() -> Vec<GradeDefinition> {
    let row = |grade: &str,
               min_score: Decimal,
               factor: (Decimal, Decimal),
               max_advance_pct: Decimal,
               term: (u32, u32),
               tier: u8| GradeDefinition {
        grade: grade.to_string(),
        min_score,
        factor_rate: DecimalRange {
            min: factor.0,
            max: factor.1,
        },
        max_advance_pct,
        term_months: MonthRange {
            min: term.0,
            max: term.1,
        },
        tier,
        approvable: tier < 5,
    };

    vec![
        row("A+", dec!(95), (dec!(1.10), dec!(1.15)), dec!(20), (3, 6), 1),
        row("A", dec!(90), (dec!(1.13), dec!(1.18)), dec!(18), (3, 6), 1),
        row("A-", dec!(85), (dec!(1.15), dec!(1.20)), dec!(16), (3, 6), 1),
        row("B+", dec!(80), (dec!(1.18), dec!(1.24)), dec!(15), (3, 6), 2),
        row("B", dec!(75), (dec!(1.22), dec!(1.28)), dec!(14), (3, 5), 2),
        row("B-", dec!(70), (dec!(1.25), dec!(1.32)), dec!(12), (3, 5), 2),
        row("C+", dec!(65), (dec!(1.28), dec!(1.36)), dec!(11), (2, 5), 3),
        row("C", dec!(60), (dec!(1.32), dec!(1.40)), dec!(10), (2, 5), 3),
        row("C-", dec!(55), (dec!(1.36), dec!(1.44)), dec!(9), (2, 4), 3),
        row("D+", dec!(50), (dec!(1.40), dec!(1.48)), dec!(8), (2, 4), 4),
        row("D", dec!(45), (dec!(1.44), dec!(1.52)), dec!(7), (2, 4), 4),
        row("D-", dec!(40), (dec!(1.47), dec!(1.58)), dec!(6), (2, 4), 4),
        row("F", dec!(0), (dec!(1.50), dec!(1.65)), dec!(5), (2, 4), 5),
    ]
}

impl Default for IndustrySettings {
    fn default() -> Self {
        let tiers: [(u8, Decimal, Decimal, &[&str]); 5] = [
            (
                1,
                dec!(2),
                dec!(-0.02),
                &["medical", "dental", "veterinary", "pharmacy", "accounting", "legal", "insurance"],
            ),
            (
                2,
                dec!(0),
                dec!(0),
                &[
                    "restaurant",
                    "retail",
                    "grocery",
                    "construction",
                    "salon",
                    "fitness",
                    "auto_repair",
                    "auto_dealer",
                    "real_estate",
                    "hotel",
                    "laundry",
                    "storage",
                    "jewelry",
                ],
            ),
            (
                3,
                dec!(-3),
                dec!(0.02),
                &["bar", "convenience", "gas_station", "liquor", "auto_service", "travel"],
            ),
            (
                4,
                dec!(-6),
                dec!(0.05),
                &["trucking", "used_cars", "towing", "pawn", "hookah", "tobacco", "vape"],
            ),
            (
                5,
                dec!(-10),
                dec!(0.10),
                &[
                    "cannabis",
                    "cbd",
                    "gambling",
                    "firearms",
                    "adult_entertainment",
                    "check_cashing",
                    "bail_bonds",
                    "crypto",
                    "money_services",
                ],
            ),
        ];

        let entries = tiers
            .iter()
            .flat_map(|&(tier, score_adjustment, factor_modifier, codes)| {
                codes.iter().map(move |code| IndustryRiskEntry {
                    code: code.to_string(),
                    name: display_name(code),
                    tier,
                    score_adjustment,
                    factor_modifier,
                })
            })
            .collect();

        Self {
            unclassified: IndustryRiskEntry {
                code: "unclassified".to_string(),
                name: "Unclassified".to_string(),
                tier: 3,
                score_adjustment: Decimal::ZERO,
                factor_modifier: Decimal::ZERO,
            },
            entries,
        }
    }
}

/// `auto_repair` -> `Auto Repair`.
fn display_name(code: &str) -> String {
    code.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

impl Default for PricingSettings {
    fn default() -> Self {
        let tier = |label: &str, max_amount: Option<Decimal>, months: u32| DealSizeTier {
            label: label.to_string(),
            max_amount,
            required_statement_months: months,
        };
        Self {
            factor_position: FactorPosition::Mid,
            min_deal_size: dec!(5000),
            deal_tiers: vec![
                tier("micro", Some(dec!(25000)), 3),
                tier("standard", Some(dec!(100000)), 4),
                tier("large", Some(dec!(250000)), 6),
                tier("jumbo", None, 12),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("adult_entertainment"), "Adult Entertainment");
        assert_eq!(display_name("bar"), "Bar");
    }

    #[test]
    fn test_f_is_the_only_unapprovable_grade() {
        let grades = default_grades();
        let unapprovable: Vec<_> = grades.iter().filter(|g| !g.approvable).map(|g| g.grade.as_str()).collect();
        assert_eq!(unapprovable, vec!["F"]);
    }

    #[test]
    fn test_default_component_maxima() {
        let total: Decimal = default_components().iter().map(|c| c.max_points).sum();
        assert_eq!(total, dec!(100));
    }
}
