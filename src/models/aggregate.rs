//! Aggregated absence-day tables.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Total absence days for one employee in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodEmployeeTotal {
    /// The period.
    pub period_id: String,
    /// The employee.
    pub employee_id: String,
    /// Summed absence days, never negative.
    pub total_absence_days: Decimal,
}

/// One row per distinct `(period_id, employee_id)` pair, sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodEmployeeAggregate {
    rows: Vec<PeriodEmployeeTotal>,
}

impl PeriodEmployeeAggregate {
    /// Builds the aggregate from a keyed map; key order becomes row order.
    pub fn from_totals(totals: BTreeMap<(String, String), Decimal>) -> Self {
        let rows = totals
            .into_iter()
            .map(|((period_id, employee_id), total_absence_days)| PeriodEmployeeTotal {
                period_id,
                employee_id,
                total_absence_days,
            })
            .collect();
        Self { rows }
    }

    /// All rows in key order.
    pub fn rows(&self) -> &[PeriodEmployeeTotal] {
        &self.rows
    }

    /// Looks up the total for one pair.
    pub fn get(&self, period_id: &str, employee_id: &str) -> Option<Decimal> {
        self.rows
            .iter()
            .find(|r| r.period_id == period_id && r.employee_id == employee_id)
            .map(|r| r.total_absence_days)
    }

    /// Total days per employee summed across every period present.
    pub fn employee_totals(&self) -> BTreeMap<String, Decimal> {
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for row in &self.rows {
            *totals.entry(row.employee_id.clone()).or_insert(Decimal::ZERO) +=
                row.total_absence_days;
        }
        totals
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no pairs were aggregated.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Per-period rollup independent of the tier thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRollup {
    /// The period.
    pub period_id: String,
    /// Distinct employees with at least one retained absence.
    pub staff_count: usize,
    /// Summed absence days.
    pub absence_days: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn test_employee_totals_sum_across_periods() {
        let mut totals = BTreeMap::new();
        totals.insert(("2020-2021".to_string(), "E1".to_string()), dec(10));
        totals.insert(("2021-2022".to_string(), "E1".to_string()), dec(12));
        totals.insert(("2021-2022".to_string(), "E2".to_string()), dec(3));

        let aggregate = PeriodEmployeeAggregate::from_totals(totals);
        let employee_totals = aggregate.employee_totals();

        assert_eq!(aggregate.len(), 3);
        assert_eq!(employee_totals["E1"], dec(22));
        assert_eq!(employee_totals["E2"], dec(3));
        assert_eq!(aggregate.get("2021-2022", "E2"), Some(dec(3)));
        assert_eq!(aggregate.get("2019-2020", "E2"), None);
    }

    #[test]
    fn test_rows_follow_key_order() {
        let mut totals = BTreeMap::new();
        totals.insert(("2021-2022".to_string(), "B".to_string()), dec(1));
        totals.insert(("2020-2021".to_string(), "Z".to_string()), dec(1));
        totals.insert(("2021-2022".to_string(), "A".to_string()), dec(1));

        let aggregate = PeriodEmployeeAggregate::from_totals(totals);
        let keys: Vec<(&str, &str)> = aggregate
            .rows()
            .iter()
            .map(|r| (r.period_id.as_str(), r.employee_id.as_str()))
            .collect();

        assert_eq!(
            keys,
            vec![("2020-2021", "Z"), ("2021-2022", "A"), ("2021-2022", "B")]
        );
    }
}
