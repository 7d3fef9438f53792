//! Core data models for the absence rating engine.
//!
//! This module contains all the domain models used throughout the pipeline.

mod absence_record;
mod aggregate;
mod cleaning_report;
mod rating_result;
mod raw_table;

pub use absence_record::{
    AbsenceRecord, AbsenceType, CleanedRecord, FillStatus, SubstituteNeed, columns,
};
pub use aggregate::{PeriodEmployeeAggregate, PeriodEmployeeTotal, PeriodRollup};
pub use cleaning_report::{CleaningReport, IssueKind, RowIssue, Stage, StageCount, StageReport};
pub use rating_result::{
    AuditStep, CostRollup, EmployeeTier, PremiumBreakdown, RatingResult, Tier, TierSummary,
    TierTotals,
};
pub use raw_table::RawTable;
