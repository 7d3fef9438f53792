//! Cleaning report models.
//!
//! Each pipeline stage produces a [`StageReport`] fragment. The pipeline
//! assembles the fragments into one immutable [`CleaningReport`] once the
//! last filter has run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A data quality issue found on a single row.
///
/// Issues either drop the row or only flag it; see [`IssueKind::drops_row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Every cell in the row was blank.
    EmptyRow,
    /// `occurred_on` could not be read as a calendar date.
    InvalidDate,
    /// Both `employee_id` and `period_id` were blank.
    MissingIdentifier,
    /// `duration_hours` was negative or not numeric. Flag only.
    InvalidValue,
    /// `period_id` did not have the `DDDD-DDDD` shape. Flag only.
    MalformedPeriod,
    /// The row's period was not in the caller's period selection.
    PeriodNotSelected,
    /// Unfilled absence that needed no substitute.
    SubstituteNotNeeded,
    /// Employee category outside the allow-list.
    CategoryExcluded,
    /// `occurred_on` falls outside the July 1 to June 30 window of its period.
    PeriodMismatch,
}

impl IssueKind {
    /// Returns true if rows with this issue are removed from the table.
    pub fn drops_row(&self) -> bool {
        !matches!(self, IssueKind::InvalidValue | IssueKind::MalformedPeriod)
    }
}

/// The pipeline stage that produced a report fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Shape and type validation.
    Validation,
    /// Caller-supplied period selection.
    PeriodSelection,
    /// Drop unfilled absences that needed no substitute.
    SubstituteRule,
    /// Keep only allow-listed employee categories.
    CategoryRule,
    /// Drop rows dated outside their period window.
    PeriodConsistencyRule,
}

/// A single issue together with the row it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    /// Zero-based index of the row in the input table.
    pub row_index: usize,
    /// The issue found.
    pub kind: IssueKind,
    /// Human-readable detail, usually the offending value.
    pub detail: String,
}

/// Report fragment produced by one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// The stage this fragment belongs to.
    pub stage: Stage,
    /// Whether the stage's rule was active.
    pub applied: bool,
    /// Rows entering the stage.
    pub rows_in: usize,
    /// Rows leaving the stage.
    pub rows_out: usize,
    /// Every issue the stage found, in row order.
    pub issues: Vec<RowIssue>,
}

impl StageReport {
    /// Starts a fragment for a stage receiving `rows_in` rows.
    pub fn new(stage: Stage, rows_in: usize) -> Self {
        Self {
            stage,
            applied: true,
            rows_in,
            rows_out: rows_in,
            issues: Vec::new(),
        }
    }

    /// A fragment for a stage that was switched off and passed every row through.
    pub fn skipped(stage: Stage, rows: usize) -> Self {
        Self {
            applied: false,
            ..Self::new(stage, rows)
        }
    }

    /// Records an issue on a row.
    pub fn record(&mut self, row_index: usize, kind: IssueKind, detail: impl Into<String>) {
        self.issues.push(RowIssue {
            row_index,
            kind,
            detail: detail.into(),
        });
    }

    /// Closes the fragment with the number of rows the stage kept.
    pub fn finish(mut self, rows_out: usize) -> Self {
        self.rows_out = rows_out;
        self
    }

    /// Rows removed by this stage.
    pub fn rows_removed(&self) -> usize {
        self.rows_in - self.rows_out
    }
}

/// Row counts for one stage, as published in the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    /// The stage.
    pub stage: Stage,
    /// Whether the stage's rule was active.
    pub applied: bool,
    /// Rows entering the stage.
    pub rows_in: usize,
    /// Rows leaving the stage.
    pub rows_out: usize,
}

/// Counts and bounded samples describing everything the cleaning stages did.
///
/// Counts are always complete; `samples` keeps at most
/// [`CleaningReport::MAX_SAMPLES_PER_KIND`] rows for each issue kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Rows in the raw input table.
    pub input_rows: usize,
    /// Rows surviving every stage.
    pub output_rows: usize,
    /// Per-stage row counts in execution order.
    pub stages: Vec<StageCount>,
    /// Total number of rows hit by each issue kind.
    pub issue_counts: BTreeMap<IssueKind, usize>,
    /// Sample rows for each issue kind.
    pub samples: Vec<RowIssue>,
    /// Input columns that were discarded (e.g. a stale day-value column).
    pub ignored_columns: Vec<String>,
}

impl CleaningReport {
    /// Upper bound on sample rows kept per issue kind.
    pub const MAX_SAMPLES_PER_KIND: usize = 20;

    /// Assembles the final report from stage fragments in execution order.
    pub fn assemble(
        input_rows: usize,
        ignored_columns: Vec<String>,
        fragments: Vec<StageReport>,
    ) -> Self {
        let output_rows = fragments.last().map_or(input_rows, |f| f.rows_out);
        let mut stages = Vec::with_capacity(fragments.len());
        let mut issue_counts: BTreeMap<IssueKind, usize> = BTreeMap::new();
        let mut samples = Vec::new();

        for fragment in fragments {
            stages.push(StageCount {
                stage: fragment.stage,
                applied: fragment.applied,
                rows_in: fragment.rows_in,
                rows_out: fragment.rows_out,
            });

            for issue in fragment.issues {
                let count = issue_counts.entry(issue.kind).or_insert(0);
                *count += 1;
                if *count <= Self::MAX_SAMPLES_PER_KIND {
                    samples.push(issue);
                }
            }
        }

        Self {
            input_rows,
            output_rows,
            stages,
            issue_counts,
            samples,
            ignored_columns,
        }
    }

    /// Number of rows hit by `kind`.
    pub fn count(&self, kind: IssueKind) -> usize {
        self.issue_counts.get(&kind).copied().unwrap_or(0)
    }

    /// Row counts for `stage`, if it ran.
    pub fn stage(&self, stage: Stage) -> Option<&StageCount> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Rows removed across all stages.
    pub fn rows_removed(&self) -> usize {
        self.input_rows - self.output_rows
    }
}
