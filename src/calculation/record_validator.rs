//! Record validation.
//!
//! Turns a [`RawTable`] into typed [`AbsenceRecord`]s. Structural problems
//! (a required column missing from the header) are fatal. Everything else
//! degrades deterministically: bad rows are dropped or flagged, and every
//! decision is recorded in the returned [`StageReport`].

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::column_mapping::canonical_column;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AbsenceRecord, AbsenceType, FillStatus, IssueKind, RawTable, Stage, StageReport,
    SubstituteNeed, columns,
};

/// Longest duration a single absence may record.
///
/// Larger values are treated as data-entry errors: flagged and worth 0 days.
pub const MAX_DURATION_HOURS: Decimal = Decimal::from_parts(24, 0, 0, false, 0);

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%b-%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// The typed table produced by validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTable {
    /// Surviving records in input order.
    pub records: Vec<AbsenceRecord>,
    /// Header of the input minus ignored columns.
    pub columns: Vec<String>,
    /// Input columns that were discarded.
    pub ignored_columns: Vec<String>,
}

impl ValidatedTable {
    /// Returns true if the input header contained `name`.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }
}

/// Validation output: the typed table and its report fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    /// The typed table.
    pub table: ValidatedTable,
    /// What validation dropped and flagged.
    pub report: StageReport,
}

/// Validates a raw table and converts its rows into [`AbsenceRecord`]s.
///
/// Per row, in order:
/// - rows blank in every cell are dropped (`empty_row`)
/// - rows with neither an employee nor a period are dropped (`missing_identifier`)
/// - rows whose `occurred_on` is not a date are dropped (`invalid_date`)
/// - negative or non-numeric `duration_hours` is flagged (`invalid_value`)
/// - `duration_hours` above [`MAX_DURATION_HOURS`] is flagged and cleared
/// - `period_id` not shaped `DDDD-DDDD` is flagged (`malformed_period`)
///
/// Every input column whose header maps to `absence_days` is discarded,
/// whatever its spelling; day values are always recomputed downstream.
/// Discarded cells play no part in the blank-row check.
///
/// # Errors
///
/// Returns [`EngineError::Schema`] if any of `occurred_on`, `period_id`,
/// `employee_id` or `absence_type` is absent from the header.
///
/// # Examples
///
/// ```
/// use absence_rating::calculation::validate_records;
/// use absence_rating::models::{IssueKind, RawTable};
/// use serde_json::json;
///
/// let table = RawTable::from_rows(
///     &["period_id", "employee_id", "occurred_on", "absence_type"],
///     vec![
///         vec![json!("2021-2022"), json!("E1"), json!("2021-09-14"), json!("Full Day")],
///         vec![json!("2021-2022"), json!("E2"), json!("not a date"), json!("Full Day")],
///     ],
/// );
///
/// let outcome = validate_records(&table).unwrap();
/// assert_eq!(outcome.table.records.len(), 1);
/// assert_eq!(outcome.report.issues[0].kind, IssueKind::InvalidDate);
/// ```
pub fn validate_records(table: &RawTable) -> EngineResult<ValidationOutcome> {
    let missing_columns: Vec<String> = columns::REQUIRED
        .iter()
        .filter(|c| !table.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if !missing_columns.is_empty() {
        return Err(EngineError::Schema { missing_columns });
    }

    let ignored_columns: Vec<String> = table
        .columns
        .iter()
        .filter(|c| is_day_value_column(c))
        .fold(Vec::new(), |mut ignored, c| {
            if !ignored.contains(c) {
                ignored.push(c.clone());
            }
            ignored
        });
    let kept_columns: Vec<String> = table
        .columns
        .iter()
        .filter(|c| !ignored_columns.contains(c))
        .cloned()
        .collect();

    let mut report = StageReport::new(Stage::Validation, table.len());
    let mut records = Vec::with_capacity(table.len());

    for (row_index, row) in table.rows.iter().enumerate() {
        if let Some(record) = validate_row(row_index, row, &mut report) {
            records.push(record);
        }
    }

    let rows_out = records.len();
    Ok(ValidationOutcome {
        table: ValidatedTable {
            records,
            columns: kept_columns,
            ignored_columns,
        },
        report: report.finish(rows_out),
    })
}

fn validate_row(
    row_index: usize,
    row: &Map<String, Value>,
    report: &mut StageReport,
) -> Option<AbsenceRecord> {
    if row
        .iter()
        .filter(|(key, _)| !is_day_value_column(key))
        .all(|(_, value)| is_blank(value))
    {
        report.record(row_index, IssueKind::EmptyRow, "all cells blank");
        return None;
    }

    let period_id = cell_text(row.get(columns::PERIOD_ID)).unwrap_or_default();
    let employee_id = cell_text(row.get(columns::EMPLOYEE_ID)).unwrap_or_default();
    if period_id.is_empty() && employee_id.is_empty() {
        report.record(
            row_index,
            IssueKind::MissingIdentifier,
            "employee_id and period_id both blank",
        );
        return None;
    }

    let occurred_on = match row.get(columns::OCCURRED_ON).and_then(parse_date) {
        Some(date) => date,
        None => {
            let raw = cell_text(row.get(columns::OCCURRED_ON)).unwrap_or_default();
            report.record(row_index, IssueKind::InvalidDate, raw);
            return None;
        }
    };

    let duration_hours = match row.get(columns::DURATION_HOURS) {
        Some(cell) if !is_blank(cell) => match parse_number(cell) {
            Some(hours) if hours > MAX_DURATION_HOURS => {
                report.record(
                    row_index,
                    IssueKind::InvalidValue,
                    format!("duration_hours {} exceeds {}", hours, MAX_DURATION_HOURS),
                );
                None
            }
            Some(hours) => {
                if hours < Decimal::ZERO {
                    report.record(
                        row_index,
                        IssueKind::InvalidValue,
                        format!("negative duration_hours {}", hours),
                    );
                }
                Some(hours)
            }
            None => {
                report.record(
                    row_index,
                    IssueKind::InvalidValue,
                    format!("non-numeric duration_hours {}", cell),
                );
                None
            }
        },
        _ => None,
    };

    if !is_period_shape(&period_id) {
        report.record(row_index, IssueKind::MalformedPeriod, period_id.clone());
    }

    let extra: BTreeMap<String, Value> = row
        .iter()
        .filter(|(key, _)| !columns::KNOWN.contains(&key.as_str()) && !is_day_value_column(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(AbsenceRecord {
        source_row: row_index,
        period_id,
        employee_id,
        occurred_on,
        employee_category: cell_text(row.get(columns::EMPLOYEE_CATEGORY)),
        absence_type: cell_text(row.get(columns::ABSENCE_TYPE))
            .and_then(|label| AbsenceType::parse(&label)),
        duration_hours,
        was_filled: cell_text(row.get(columns::WAS_FILLED))
            .map_or(FillStatus::Unknown, |label| FillStatus::from_label(&label)),
        needs_substitute: cell_text(row.get(columns::NEEDS_SUBSTITUTE))
            .map_or(SubstituteNeed::Unknown, |label| {
                SubstituteNeed::from_label(&label)
            }),
        extra,
    })
}

fn is_day_value_column(name: &str) -> bool {
    canonical_column(name) == Some(columns::ABSENCE_DAYS)
}

/// Returns true if `period_id` has the `DDDD-DDDD` shape.
///
/// # Examples
///
/// ```
/// use absence_rating::calculation::is_period_shape;
///
/// assert!(is_period_shape("2021-2022"));
/// assert!(!is_period_shape("21-22"));
/// assert!(!is_period_shape("2021/2022"));
/// ```
pub fn is_period_shape(period_id: &str) -> bool {
    let bytes = period_id.as_bytes();
    bytes.len() == 9
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Reads a cell as trimmed text. Blank cells yield `None`.
fn cell_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn parse_number(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
    let text = match value {
        Value::String(s) => s.trim(),
        _ => return None,
    };

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
}
