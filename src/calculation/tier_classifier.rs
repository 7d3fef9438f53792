//! Tier classification.
//!
//! This module assigns each employee's total absence days to one of three
//! bands, given the deductible and the coverage width:
//!
//! - `d <= deductible` is below-deductible and contributes nothing
//! - `deductible < d <= ceiling` is coverage-range and contributes
//!   `min(d - deductible, coverage_days)` chargeable days
//! - `d > ceiling` is high-claimant and contributes `d - ceiling` excess days
//!
//! where `ceiling = deductible + coverage_days`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::config::RatingParameters;
use crate::models::{AuditStep, EmployeeTier, Tier, TierSummary};

/// The result of classifying every employee, including the audit step.
#[derive(Debug, Clone)]
pub struct TierClassification {
    /// Per-employee tier detail, ordered by employee id.
    pub employees: Vec<EmployeeTier>,
    /// Tier populations and day totals.
    pub summary: TierSummary,
    /// The audit step recording this classification.
    pub audit_step: AuditStep,
}

/// Classifies a single employee's total absence days.
///
/// Boundaries are inclusive on the lower tier: a total equal to the
/// deductible is below-deductible, and a total equal to the ceiling is
/// coverage-range.
///
/// # Examples
///
/// ```
/// use absence_rating::calculation::classify_employee;
/// use absence_rating::config::RatingParameters;
/// use absence_rating::models::Tier;
/// use rust_decimal::Decimal;
///
/// let params = RatingParameters {
///     deductible_days: 20,
///     coverage_days: 60,
///     cost_per_day: Decimal::from(150),
///     commission_rate_a: Decimal::new(15, 2),
///     commission_rate_b: Decimal::new(15, 2),
///     period_length_days: None,
/// };
///
/// let tier = classify_employee("B", Decimal::from(50), &params);
/// assert_eq!(tier.tier, Tier::CoverageRange);
/// assert_eq!(tier.chargeable_days, Decimal::from(30));
///
/// let tier = classify_employee("D", Decimal::from(100), &params);
/// assert_eq!(tier.tier, Tier::HighClaimant);
/// assert_eq!(tier.excess_days, Decimal::from(20));
/// ```
pub fn classify_employee(
    employee_id: &str,
    total_days: Decimal,
    params: &RatingParameters,
) -> EmployeeTier {
    let deductible = Decimal::from(params.deductible_days);
    let coverage = Decimal::from(params.coverage_days);
    let ceiling = deductible + coverage;

    let (tier, chargeable_days, excess_days) = if total_days <= deductible {
        (Tier::BelowDeductible, Decimal::ZERO, Decimal::ZERO)
    } else if total_days <= ceiling {
        (
            Tier::CoverageRange,
            (total_days - deductible).min(coverage),
            Decimal::ZERO,
        )
    } else {
        (Tier::HighClaimant, Decimal::ZERO, total_days - ceiling)
    };

    EmployeeTier {
        employee_id: employee_id.to_string(),
        total_days,
        tier,
        chargeable_days,
        excess_days,
    }
}

/// Classifies every employee and totals each tier.
///
/// # Arguments
///
/// * `employee_totals` - Total absence days per employee across all periods
/// * `params` - The rating thresholds
/// * `step_number` - The step number for audit trail sequencing
///
/// # Returns
///
/// Returns a `TierClassification` whose tier populations sum to the number
/// of employees in `employee_totals`.
pub fn classify_tiers(
    employee_totals: &BTreeMap<String, Decimal>,
    params: &RatingParameters,
    step_number: u32,
) -> TierClassification {
    let mut summary = TierSummary::default();
    let mut employees = Vec::with_capacity(employee_totals.len());

    for (employee_id, total_days) in employee_totals {
        let classified = classify_employee(employee_id, *total_days, params);
        let totals = match classified.tier {
            Tier::BelowDeductible => {
                summary.below_deductible.days += classified.total_days;
                &mut summary.below_deductible
            }
            Tier::CoverageRange => {
                summary.coverage_range.days += classified.chargeable_days;
                &mut summary.coverage_range
            }
            Tier::HighClaimant => {
                summary.high_claimant.days += classified.excess_days;
                &mut summary.high_claimant
            }
        };
        totals.population += 1;
        employees.push(classified);
    }

    let audit_step = AuditStep {
        step_number,
        rule_id: "tier_classification".to_string(),
        rule_name: "Tier Classification".to_string(),
        input: serde_json::json!({
            "employees": employee_totals.len(),
            "deductible_days": params.deductible_days,
            "coverage_days": params.coverage_days,
            "coverage_ceiling": params.coverage_ceiling()
        }),
        output: serde_json::json!({
            "below_deductible": summary.below_deductible.population,
            "coverage_range": summary.coverage_range.population,
            "high_claimant": summary.high_claimant.population,
            "chargeable_days": summary.coverage_range.days.normalize().to_string(),
            "excess_days": summary.high_claimant.days.normalize().to_string()
        }),
        reasoning: format!(
            "{} employees: {} at or below {} days, {} between {} and {} days ({} chargeable), {} above {} days ({} excess)",
            employee_totals.len(),
            summary.below_deductible.population,
            params.deductible_days,
            summary.coverage_range.population,
            params.deductible_days,
            params.coverage_ceiling(),
            summary.coverage_range.days.normalize(),
            summary.high_claimant.population,
            params.coverage_ceiling(),
            summary.high_claimant.days.normalize()
        ),
    };

    TierClassification {
        employees,
        summary,
        audit_step,
    }
}
