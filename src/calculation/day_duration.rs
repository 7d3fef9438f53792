//! Day-value calculation.
//!
//! Converts each retained absence into a fraction of a standard working day.
//! Any day-value column present in the input has already been discarded by
//! validation, so the value computed here is always the one used downstream.

use rust_decimal::Decimal;

use crate::models::{AbsenceRecord, AbsenceType, CleanedRecord};

/// Length of a standard working day in hours (7.5).
///
/// Custom durations are recorded in hours and divided by this constant.
pub const STANDARD_WORKDAY_HOURS: Decimal = Decimal::from_parts(75, 0, 0, false, 1);

/// Day value of a half-day absence.
const HALF_DAY: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Returns the day value of a single absence.
///
/// | Type            | Value                       |
/// |-----------------|-----------------------------|
/// | Full Day        | 1                           |
/// | AM/PM Half Day  | 0.5                         |
/// | Custom Duration | `duration_hours / 7.5`      |
/// | anything else   | 0                           |
///
/// A custom duration with a missing or negative `duration_hours` is worth 0.
/// The result is never negative.
///
/// # Examples
///
/// ```
/// use absence_rating::calculation::absence_days;
/// use absence_rating::models::AbsenceType;
/// use rust_decimal::Decimal;
///
/// assert_eq!(absence_days(Some(&AbsenceType::FullDay), None), Decimal::ONE);
/// assert_eq!(
///     absence_days(Some(&AbsenceType::CustomDuration), Some(Decimal::new(375, 2))),
///     Decimal::new(5, 1)
/// );
/// assert_eq!(absence_days(None, Some(Decimal::from(8))), Decimal::ZERO);
/// ```
pub fn absence_days(
    absence_type: Option<&AbsenceType>,
    duration_hours: Option<Decimal>,
) -> Decimal {
    match absence_type {
        Some(AbsenceType::FullDay) => Decimal::ONE,
        Some(AbsenceType::AmHalfDay | AbsenceType::PmHalfDay) => HALF_DAY,
        Some(AbsenceType::CustomDuration) => match duration_hours {
            Some(hours) if hours >= Decimal::ZERO => hours / STANDARD_WORKDAY_HOURS,
            _ => Decimal::ZERO,
        },
        Some(AbsenceType::Other(_)) | None => Decimal::ZERO,
    }
}

/// Attaches a day value to every record, preserving order.
pub fn compute_day_values(records: Vec<AbsenceRecord>) -> Vec<CleanedRecord> {
    records
        .into_iter()
        .map(|record| {
            let absence_days = absence_days(record.absence_type.as_ref(), record.duration_hours);
            CleanedRecord {
                record,
                absence_days,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FillStatus, SubstituteNeed};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn record(absence_type: Option<AbsenceType>, duration_hours: Option<&str>) -> AbsenceRecord {
        AbsenceRecord {
            source_row: 0,
            period_id: "2021-2022".to_string(),
            employee_id: "E1".to_string(),
            occurred_on: NaiveDate::from_ymd_opt(2021, 9, 1).unwrap(),
            employee_category: None,
            absence_type,
            duration_hours: duration_hours.map(dec),
            was_filled: FillStatus::Filled,
            needs_substitute: SubstituteNeed::Yes,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_standard_workday_is_seven_and_a_half_hours() {
        assert_eq!(STANDARD_WORKDAY_HOURS, dec("7.5"));
    }

    // ==========================================================================
    // DD-001: fixed-value types
    // ==========================================================================
    #[test]
    fn test_dd_001_full_day_ignores_duration() {
        assert_eq!(
            absence_days(Some(&AbsenceType::FullDay), Some(dec("3"))),
            dec("1")
        );
    }

    #[test]
    fn test_dd_002_half_days() {
        assert_eq!(absence_days(Some(&AbsenceType::AmHalfDay), None), dec("0.5"));
        assert_eq!(absence_days(Some(&AbsenceType::PmHalfDay), None), dec("0.5"));
    }

    // ==========================================================================
    // DD-003: custom durations are hours over the workday
    // ==========================================================================
    #[test]
    fn test_dd_003_custom_duration_divides_by_workday() {
        let custom = Some(&AbsenceType::CustomDuration);
        assert_eq!(absence_days(custom, Some(dec("7.5"))), dec("1"));
        assert_eq!(absence_days(custom, Some(dec("3.75"))), dec("0.5"));
        assert_eq!(absence_days(custom, Some(dec("15"))), dec("2"));
        assert_eq!(absence_days(custom, Some(dec("0"))), dec("0"));
    }

    #[test]
    fn test_dd_004_custom_duration_without_valid_hours_is_zero() {
        let custom = Some(&AbsenceType::CustomDuration);
        assert_eq!(absence_days(custom, None), Decimal::ZERO);
        assert_eq!(absence_days(custom, Some(dec("-2"))), Decimal::ZERO);
    }

    #[test]
    fn test_dd_005_unknown_or_missing_type_is_zero() {
        let other = AbsenceType::Other("Jury Duty".to_string());
        assert_eq!(absence_days(Some(&other), Some(dec("7.5"))), Decimal::ZERO);
        assert_eq!(absence_days(None, Some(dec("7.5"))), Decimal::ZERO);
    }

    #[test]
    fn test_dd_006_compute_day_values_preserves_order() {
        let records = vec![
            record(Some(AbsenceType::FullDay), None),
            record(Some(AbsenceType::CustomDuration), Some("7.5")),
            record(Some(AbsenceType::PmHalfDay), None),
        ];

        let cleaned = compute_day_values(records);

        let days: Vec<Decimal> = cleaned.iter().map(|c| c.absence_days).collect();
        assert_eq!(days, vec![dec("1"), dec("1"), dec("0.5")]);
        assert_eq!(cleaned[1].record.duration_hours, Some(dec("7.5")));
    }
}
