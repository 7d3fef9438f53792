//! Per-period, per-employee aggregation.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::models::{CleanedRecord, PeriodEmployeeAggregate, PeriodRollup};

/// The aggregate table plus per-period staff and day rollups.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationOutcome {
    /// One row per `(period_id, employee_id)` pair.
    pub aggregate: PeriodEmployeeAggregate,
    /// One rollup per period, in period order.
    pub period_rollups: Vec<PeriodRollup>,
}

/// Sums day values by `(period_id, employee_id)`.
///
/// Pairs with no retained rows are absent, and input order never affects the
/// result. Staff counts are distinct employees with at least one retained
/// absence in the period.
///
/// # Examples
///
/// ```
/// use absence_rating::calculation::aggregate_periods;
///
/// let outcome = aggregate_periods(&[]);
/// assert!(outcome.aggregate.is_empty());
/// assert!(outcome.period_rollups.is_empty());
/// ```
pub fn aggregate_periods(records: &[CleanedRecord]) -> AggregationOutcome {
    let mut totals: BTreeMap<(String, String), Decimal> = BTreeMap::new();
    let mut staff: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut period_days: BTreeMap<&str, Decimal> = BTreeMap::new();

    for cleaned in records {
        let period_id = cleaned.record.period_id.as_str();
        let employee_id = cleaned.record.employee_id.as_str();

        *totals
            .entry((period_id.to_string(), employee_id.to_string()))
            .or_insert(Decimal::ZERO) += cleaned.absence_days;
        staff.entry(period_id).or_default().insert(employee_id);
        *period_days.entry(period_id).or_insert(Decimal::ZERO) += cleaned.absence_days;
    }

    let period_rollups = staff
        .into_iter()
        .map(|(period_id, employees)| PeriodRollup {
            period_id: period_id.to_string(),
            staff_count: employees.len(),
            absence_days: period_days.get(period_id).copied().unwrap_or(Decimal::ZERO),
        })
        .collect();

    AggregationOutcome {
        aggregate: PeriodEmployeeAggregate::from_totals(totals),
        period_rollups,
    }
}
