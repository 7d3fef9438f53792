//! Rating result models.
//!
//! This module contains the [`RatingResult`] type and its associated structures
//! capturing every output of a rating run: per-period cost rollups, tier
//! populations, per-employee tier detail, the premium breakdown and an audit
//! trace of the rating decisions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RatingParameters;

/// The band an employee's total absence days fall into.
///
/// # Example
///
/// ```
/// use absence_rating::models::Tier;
///
/// let tier = Tier::CoverageRange;
/// assert_eq!(serde_json::to_string(&tier).unwrap(), "\"coverage_range\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Total days at or below the deductible. Not charged.
    BelowDeductible,
    /// Above the deductible, at or below the coverage ceiling.
    CoverageRange,
    /// Above the coverage ceiling.
    HighClaimant,
}

/// Tier assignment for a single employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeTier {
    /// The employee.
    pub employee_id: String,
    /// Absence days summed across all periods.
    pub total_days: Decimal,
    /// The assigned tier.
    pub tier: Tier,
    /// Days billed in the coverage range. Zero outside that tier.
    pub chargeable_days: Decimal,
    /// Days beyond the coverage ceiling. Zero outside the high-claimant tier.
    pub excess_days: Decimal,
}

/// Population and day total for one tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierTotals {
    /// Employees in the tier.
    pub population: usize,
    /// Day total relevant to the tier.
    pub days: Decimal,
}

/// Tier populations and day totals.
///
/// `below_deductible.days` is the raw total of those employees,
/// `coverage_range.days` the chargeable days and `high_claimant.days`
/// the excess days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSummary {
    /// Employees at or below the deductible.
    pub below_deductible: TierTotals,
    /// Employees in the coverage range.
    pub coverage_range: TierTotals,
    /// Employees above the coverage ceiling.
    pub high_claimant: TierTotals,
}

impl TierSummary {
    /// Employees across all three tiers.
    pub fn total_population(&self) -> usize {
        self.below_deductible.population
            + self.coverage_range.population
            + self.high_claimant.population
    }
}

/// Cost figures and commission-inflated premium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumBreakdown {
    /// `cost_per_day` times the coverage-range chargeable days.
    pub coverage_cost: Decimal,
    /// `cost_per_day` times the high-claimant excess days. Informational only.
    pub excess_cost: Decimal,
    /// First commission on the coverage cost.
    pub commission_a: Decimal,
    /// Second commission on the coverage cost.
    pub commission_b: Decimal,
    /// Coverage cost plus both commissions.
    pub total_premium: Decimal,
}

/// Staff, day and replacement-cost figures for a period or for the whole dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRollup {
    /// The period, or `None` for the all-periods rollup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_id: Option<String>,
    /// Distinct employees.
    pub staff_count: usize,
    /// Summed absence days.
    pub absence_days: Decimal,
    /// `absence_days` times `cost_per_day`.
    pub replacement_cost: Decimal,
}

/// A single step in the audit trace recording a rating decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// The complete result of rating one dataset.
///
/// Computed once from a [`PeriodEmployeeAggregate`](super::PeriodEmployeeAggregate)
/// and [`RatingParameters`]; read-only afterwards. Contains no timestamps or
/// identifiers, so identical inputs serialize to identical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingResult {
    /// The parameters the result was computed with.
    pub parameters: RatingParameters,
    /// `deductible_days + coverage_days`.
    pub coverage_ceiling: u32,
    /// Per-period rollups in period order.
    pub periods: Vec<CostRollup>,
    /// Rollup across every period.
    pub overall: CostRollup,
    /// Tier assignment per employee, ordered by employee id.
    pub employees: Vec<EmployeeTier>,
    /// Tier populations and day totals.
    pub tiers: TierSummary,
    /// Premium figures.
    pub premium: PremiumBreakdown,
    /// Rating decisions in the order they were made.
    pub audit_trace: Vec<AuditStep>,
}
