//! Premium calculation.
//!
//! Converts tier totals into cost figures. Only the coverage-range cost feeds
//! the premium; the high-claimant excess cost is computed and reported but
//! never added in.

use rust_decimal::Decimal;

use crate::config::RatingParameters;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, PremiumBreakdown, TierSummary};

/// The result of a premium calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct PremiumResult {
    /// The premium figures.
    pub breakdown: PremiumBreakdown,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates the premium for a tier summary.
///
/// ```text
/// coverage_cost = cost_per_day * chargeable days
/// excess_cost   = cost_per_day * excess days
/// commission_x  = coverage_cost * commission_rate_x
/// total_premium = coverage_cost + commission_a + commission_b
/// ```
///
/// Parameters are assumed to be validated already.
///
/// # Errors
///
/// Returns [`EngineError::Parameter`] for `cost_per_day` when any figure
/// exceeds the decimal range.
///
/// # Examples
///
/// ```
/// use absence_rating::calculation::calculate_premium;
/// use absence_rating::config::RatingParameters;
/// use absence_rating::models::{TierSummary, TierTotals};
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
/// let summary = TierSummary {
///     coverage_range: TierTotals { population: 2, days: Decimal::from(85) },
///     ..TierSummary::default()
/// };
///
/// let result = calculate_premium(&summary, &params, 1).unwrap();
/// assert_eq!(result.breakdown.coverage_cost, Decimal::from(12750));
/// assert_eq!(result.breakdown.total_premium, Decimal::from(16575));
/// ```
pub fn calculate_premium(
    summary: &TierSummary,
    params: &RatingParameters,
    step_number: u32,
) -> EngineResult<PremiumResult> {
    let coverage_cost = cost_of(params.cost_per_day, summary.coverage_range.days)?;
    let excess_cost = cost_of(params.cost_per_day, summary.high_claimant.days)?;
    let commission_a = in_range(coverage_cost.checked_mul(params.commission_rate_a))?;
    let commission_b = in_range(coverage_cost.checked_mul(params.commission_rate_b))?;
    let total_premium = in_range(
        coverage_cost
            .checked_add(commission_a)
            .and_then(|sum| sum.checked_add(commission_b)),
    )?;

    let audit_step = AuditStep {
        step_number,
        rule_id: "premium".to_string(),
        rule_name: "Premium Calculation".to_string(),
        input: serde_json::json!({
            "chargeable_days": summary.coverage_range.days.normalize().to_string(),
            "excess_days": summary.high_claimant.days.normalize().to_string(),
            "cost_per_day": params.cost_per_day.normalize().to_string(),
            "commission_rate_a": params.commission_rate_a.normalize().to_string(),
            "commission_rate_b": params.commission_rate_b.normalize().to_string()
        }),
        output: serde_json::json!({
            "coverage_cost": coverage_cost.normalize().to_string(),
            "excess_cost": excess_cost.normalize().to_string(),
            "commission_a": commission_a.normalize().to_string(),
            "commission_b": commission_b.normalize().to_string(),
            "total_premium": total_premium.normalize().to_string()
        }),
        reasoning: format!(
            "{} days x ${} = ${}; + ${} + ${} commission = ${} (excess ${} not included)",
            summary.coverage_range.days.normalize(),
            params.cost_per_day.normalize(),
            coverage_cost.normalize(),
            commission_a.normalize(),
            commission_b.normalize(),
            total_premium.normalize(),
            excess_cost.normalize()
        ),
    };

    Ok(PremiumResult {
        breakdown: PremiumBreakdown {
            coverage_cost,
            excess_cost,
            commission_a,
            commission_b,
            total_premium,
        },
        audit_step,
    })
}

/// `cost_per_day * days`, failing instead of overflowing.
///
/// # Errors
///
/// Returns [`EngineError::Parameter`] for `cost_per_day` on overflow.
pub(crate) fn cost_of(cost_per_day: Decimal, days: Decimal) -> EngineResult<Decimal> {
    in_range(cost_per_day.checked_mul(days))
}

fn in_range(value: Option<Decimal>) -> EngineResult<Decimal> {
    value.ok_or_else(|| EngineError::Parameter {
        field: "cost_per_day".to_string(),
        message: "cost figures exceed the decimal range".to_string(),
    })
}
