//! Absence record model and related enumerations.
//!
//! An [`AbsenceRecord`] is one validated row of the input table. A
//! [`CleanedRecord`] pairs it with the absence-day value recomputed by the
//! day duration calculator.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical column names understood by the pipeline.
pub mod columns {
    /// School year the absence is booked against, `"YYYY-YYYY"`.
    pub const PERIOD_ID: &str = "period_id";
    /// Employee key.
    pub const EMPLOYEE_ID: &str = "employee_id";
    /// Calendar date of the absence.
    pub const OCCURRED_ON: &str = "occurred_on";
    /// Employee category (e.g. "Teacher").
    pub const EMPLOYEE_CATEGORY: &str = "employee_category";
    /// Absence type label.
    pub const ABSENCE_TYPE: &str = "absence_type";
    /// Duration of the absence in hours.
    pub const DURATION_HOURS: &str = "duration_hours";
    /// Whether a substitute filled the absence.
    pub const WAS_FILLED: &str = "was_filled";
    /// Whether the absence needed a substitute.
    pub const NEEDS_SUBSTITUTE: &str = "needs_substitute";
    /// Day value column. Never read from input; always recomputed.
    pub const ABSENCE_DAYS: &str = "absence_days";

    /// Columns that must be present for the pipeline to run.
    pub const REQUIRED: [&str; 4] = [OCCURRED_ON, PERIOD_ID, EMPLOYEE_ID, ABSENCE_TYPE];

    /// Columns the validator parses into typed record fields.
    pub const KNOWN: [&str; 8] = [
        PERIOD_ID,
        EMPLOYEE_ID,
        OCCURRED_ON,
        EMPLOYEE_CATEGORY,
        ABSENCE_TYPE,
        DURATION_HOURS,
        WAS_FILLED,
        NEEDS_SUBSTITUTE,
    ];
}

/// The kind of absence, which determines its day value.
///
/// Labels are matched ignoring case, spaces, underscores and hyphens, so
/// `"Full Day"`, `"full_day"` and `"FULLDAY"` are all [`AbsenceType::FullDay`].
///
/// # Example
///
/// ```
/// use absence_rating::models::AbsenceType;
///
/// assert_eq!(AbsenceType::parse("AM Half Day"), Some(AbsenceType::AmHalfDay));
/// assert_eq!(AbsenceType::parse("custom_duration"), Some(AbsenceType::CustomDuration));
/// assert_eq!(AbsenceType::parse("  "), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AbsenceType {
    /// A whole working day.
    FullDay,
    /// Morning half day.
    AmHalfDay,
    /// Afternoon half day.
    PmHalfDay,
    /// Variable length absence measured in hours.
    CustomDuration,
    /// Any other label, kept verbatim.
    Other(String),
}

impl AbsenceType {
    /// Parses an absence type label. Blank labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return None;
        }

        let squashed: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        Some(match squashed.as_str() {
            "fullday" => AbsenceType::FullDay,
            "amhalfday" => AbsenceType::AmHalfDay,
            "pmhalfday" => AbsenceType::PmHalfDay,
            "customduration" => AbsenceType::CustomDuration,
            _ => AbsenceType::Other(trimmed.to_string()),
        })
    }

    /// Returns the display label for this absence type.
    pub fn label(&self) -> &str {
        match self {
            AbsenceType::FullDay => "Full Day",
            AbsenceType::AmHalfDay => "AM Half Day",
            AbsenceType::PmHalfDay => "PM Half Day",
            AbsenceType::CustomDuration => "Custom Duration",
            AbsenceType::Other(label) => label,
        }
    }
}

impl fmt::Display for AbsenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for AbsenceType {
    fn from(label: String) -> Self {
        AbsenceType::parse(&label).unwrap_or(AbsenceType::Other(label))
    }
}

impl From<AbsenceType> for String {
    fn from(absence_type: AbsenceType) -> Self {
        absence_type.label().to_string()
    }
}

/// Whether a substitute was assigned to the absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStatus {
    /// A substitute covered the absence.
    Filled,
    /// No substitute covered the absence.
    Unfilled,
    /// The value was missing or unrecognized.
    Unknown,
}

impl FillStatus {
    /// Parses a fill status label, case-insensitively.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "filled" | "true" => FillStatus::Filled,
            "unfilled" | "false" => FillStatus::Unfilled,
            _ => FillStatus::Unknown,
        }
    }
}

/// Whether the absence required a substitute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstituteNeed {
    /// Coverage was required.
    Yes,
    /// Coverage was not required.
    No,
    /// The value was missing or unrecognized.
    Unknown,
}

impl SubstituteNeed {
    /// Parses a substitute-need label, case-insensitively.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" => SubstituteNeed::Yes,
            "no" | "n" | "false" => SubstituteNeed::No,
            _ => SubstituteNeed::Unknown,
        }
    }
}

/// One validated row of absence data.
///
/// `employee_id` and `period_id` are never both empty, and `occurred_on` is
/// always a real calendar date; rows violating either are dropped during
/// validation. Columns outside the canonical set travel in `extra` and are
/// passed through to the cleaned output untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbsenceRecord {
    /// Zero-based index of the row in the input table.
    pub source_row: usize,
    /// School year, expected as `"YYYY-YYYY"`.
    pub period_id: String,
    /// Employee key.
    pub employee_id: String,
    /// Date of the absence.
    pub occurred_on: NaiveDate,
    /// Employee category, if supplied.
    pub employee_category: Option<String>,
    /// Absence type, if supplied.
    pub absence_type: Option<AbsenceType>,
    /// Duration in hours, if numeric.
    pub duration_hours: Option<Decimal>,
    /// Substitute fill status.
    pub was_filled: FillStatus,
    /// Substitute need.
    pub needs_substitute: SubstituteNeed,
    /// Pass-through columns.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A retained record with its recomputed absence-day value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedRecord {
    /// The underlying record.
    #[serde(flatten)]
    pub record: AbsenceRecord,
    /// Fractional absence days derived from type and duration.
    pub absence_days: Decimal,
}
