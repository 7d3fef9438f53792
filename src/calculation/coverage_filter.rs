//! Coverage filtering.
//!
//! Three independent sub-rules decide whether an absence is relevant to a
//! substitute-cost rating:
//!
//! 1. substitute need: unfilled absences that needed no substitute are dropped
//! 2. category: only allow-listed employee categories are kept
//! 3. period consistency: the absence date must fall inside its school year
//!
//! They always run in that order so per-stage counts are reproducible. A
//! caller-supplied period selection runs before all three.

use chrono::NaiveDate;

use crate::config::{CategoryRule, CleaningRules};
use crate::models::{AbsenceRecord, FillStatus, IssueKind, Stage, StageReport, SubstituteNeed};

/// Output of one filter: the kept records and the stage's report fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// Records the filter kept, in input order.
    pub records: Vec<AbsenceRecord>,
    /// Report fragment for the filter.
    pub report: StageReport,
}

/// Runs `keep` over every record, recording an issue for each dropped one.
fn retain_with_report<F>(
    records: Vec<AbsenceRecord>,
    stage: Stage,
    kind: IssueKind,
    mut keep: F,
) -> FilterOutcome
where
    F: FnMut(&AbsenceRecord) -> Result<(), String>,
{
    let mut report = StageReport::new(stage, records.len());
    let mut kept = Vec::with_capacity(records.len());

    for record in records {
        match keep(&record) {
            Ok(()) => kept.push(record),
            Err(detail) => report.record(record.source_row, kind, detail),
        }
    }

    let rows_out = kept.len();
    FilterOutcome {
        records: kept,
        report: report.finish(rows_out),
    }
}

/// Keeps only records whose period is in `selected`. An empty selection keeps everything.
pub fn select_periods(records: Vec<AbsenceRecord>, selected: &[String]) -> FilterOutcome {
    if selected.is_empty() {
        let report = StageReport::skipped(Stage::PeriodSelection, records.len());
        return FilterOutcome { records, report };
    }

    retain_with_report(
        records,
        Stage::PeriodSelection,
        IssueKind::PeriodNotSelected,
        |record| {
            if selected.contains(&record.period_id) {
                Ok(())
            } else {
                Err(record.period_id.clone())
            }
        },
    )
}

/// Drops records that were unfilled and needed no substitute.
///
/// Unknown fill or need values never match, so such rows are kept.
pub fn apply_substitute_rule(records: Vec<AbsenceRecord>, apply: bool) -> FilterOutcome {
    if !apply {
        let report = StageReport::skipped(Stage::SubstituteRule, records.len());
        return FilterOutcome { records, report };
    }

    retain_with_report(
        records,
        Stage::SubstituteRule,
        IssueKind::SubstituteNotNeeded,
        |record| {
            if record.was_filled == FillStatus::Unfilled
                && record.needs_substitute == SubstituteNeed::No
            {
                Err("unfilled, no substitute needed".to_string())
            } else {
                Ok(())
            }
        },
    )
}

/// Keeps only allow-listed employee categories.
///
/// A no-op when the caller already filtered categories, when the allow-list
/// is empty, or when the input had no category column at all. Otherwise a
/// record without a category is dropped.
pub fn apply_category_rule(
    records: Vec<AbsenceRecord>,
    rule: &CategoryRule,
    category_column_present: bool,
) -> FilterOutcome {
    let allowlist = match rule {
        CategoryRule::Unfiltered { allowlist }
            if !allowlist.is_empty() && category_column_present =>
        {
            allowlist
        }
        _ => {
            let report = StageReport::skipped(Stage::CategoryRule, records.len());
            return FilterOutcome { records, report };
        }
    };

    retain_with_report(
        records,
        Stage::CategoryRule,
        IssueKind::CategoryExcluded,
        |record| match &record.employee_category {
            Some(category) if allowlist.contains(category) => Ok(()),
            Some(category) => Err(category.clone()),
            None => Err("no category".to_string()),
        },
    )
}

/// Returns the inclusive date window of a `"start-end"` period:
/// July 1 of the start year through June 30 of the end year.
///
/// Periods that are not two four-digit years yield `None`.
///
/// # Examples
///
/// ```
/// use absence_rating::calculation::period_window;
/// use chrono::NaiveDate;
///
/// let (start, end) = period_window("2021-2022").unwrap();
/// assert_eq!(start, NaiveDate::from_ymd_opt(2021, 7, 1).unwrap());
/// assert_eq!(end, NaiveDate::from_ymd_opt(2022, 6, 30).unwrap());
/// assert!(period_window("FY22").is_none());
/// ```
pub fn period_window(period_id: &str) -> Option<(NaiveDate, NaiveDate)> {
    let (start, end) = period_id.trim().split_once('-')?;
    let start_year = parse_year(start)?;
    let end_year = parse_year(end)?;

    Some((
        NaiveDate::from_ymd_opt(start_year, 7, 1)?,
        NaiveDate::from_ymd_opt(end_year, 6, 30)?,
    ))
}

fn parse_year(text: &str) -> Option<i32> {
    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}

/// Drops records dated outside their period window.
///
/// Records whose period cannot be parsed pass through unfiltered.
pub fn apply_period_consistency_rule(records: Vec<AbsenceRecord>, apply: bool) -> FilterOutcome {
    if !apply {
        let report = StageReport::skipped(Stage::PeriodConsistencyRule, records.len());
        return FilterOutcome { records, report };
    }

    retain_with_report(
        records,
        Stage::PeriodConsistencyRule,
        IssueKind::PeriodMismatch,
        |record| match period_window(&record.period_id) {
            Some((start, end)) if record.occurred_on < start || record.occurred_on > end => Err(
                format!("{} outside {}", record.occurred_on, record.period_id),
            ),
            _ => Ok(()),
        },
    )
}

/// Runs period selection and the three sub-rules in their fixed order.
///
/// Returns the surviving records and one report fragment per stage.
pub fn apply_coverage_filters(
    records: Vec<AbsenceRecord>,
    rules: &CleaningRules,
    category_column_present: bool,
) -> (Vec<AbsenceRecord>, Vec<StageReport>) {
    let selection = select_periods(records, &rules.selected_periods);
    let substitute = apply_substitute_rule(selection.records, rules.apply_substitute_rule);
    let category = apply_category_rule(
        substitute.records,
        &rules.category_rule,
        category_column_present,
    );
    let period = apply_period_consistency_rule(
        category.records,
        rules.apply_period_consistency_rule,
    );

    (
        period.records,
        vec![
            selection.report,
            substitute.report,
            category.report,
            period.report,
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(source_row: usize, period_id: &str, occurred_on: NaiveDate) -> AbsenceRecord {
        AbsenceRecord {
            source_row,
            period_id: period_id.to_string(),
            employee_id: format!("E{}", source_row),
            occurred_on,
            employee_category: Some("Teacher".to_string()),
            absence_type: None,
            duration_hours: None,
            was_filled: FillStatus::Filled,
            needs_substitute: SubstituteNeed::Yes,
            extra: BTreeMap::new(),
        }
    }

    fn with_fill(mut r: AbsenceRecord, filled: FillStatus, need: SubstituteNeed) -> AbsenceRecord {
        r.was_filled = filled;
        r.needs_substitute = need;
        r
    }

    fn with_category(mut r: AbsenceRecord, category: Option<&str>) -> AbsenceRecord {
        r.employee_category = category.map(str::to_string);
        r
    }

    // ==========================================================================
    // CF-001: substitute-need rule
    // ==========================================================================
    #[test]
    fn test_cf_001_unfilled_and_not_needed_dropped() {
        let d = date(2021, 9, 1);
        let records = vec![
            with_fill(record(0, "2021-2022", d), FillStatus::Unfilled, SubstituteNeed::No),
            with_fill(record(1, "2021-2022", d), FillStatus::Unfilled, SubstituteNeed::Yes),
            with_fill(record(2, "2021-2022", d), FillStatus::Filled, SubstituteNeed::No),
            with_fill(record(3, "2021-2022", d), FillStatus::Unknown, SubstituteNeed::No),
        ];

        let outcome = apply_substitute_rule(records, true);

        let kept: Vec<usize> = outcome.records.iter().map(|r| r.source_row).collect();
        assert_eq!(kept, vec![1, 2, 3]);
        assert_eq!(outcome.report.rows_removed(), 1);
        assert_eq!(outcome.report.issues[0].kind, IssueKind::SubstituteNotNeeded);
    }

    #[test]
    fn test_cf_002_substitute_rule_toggle_off() {
        let d = date(2021, 9, 1);
        let records = vec![with_fill(
            record(0, "2021-2022", d),
            FillStatus::Unfilled,
            SubstituteNeed::No,
        )];

        let outcome = apply_substitute_rule(records, false);

        assert_eq!(outcome.records.len(), 1);
        assert!(!outcome.report.applied);
    }

    // ==========================================================================
    // CF-003: category rule
    // ==========================================================================
    #[test]
    fn test_cf_003_category_allowlist() {
        let d = date(2021, 9, 1);
        let records = vec![
            record(0, "2021-2022", d),
            with_category(record(1, "2021-2022", d), Some("Custodian")),
            with_category(record(2, "2021-2022", d), None),
            with_category(record(3, "2021-2022", d), Some("Teacher Music")),
        ];
        let rule = CategoryRule::Unfiltered {
            allowlist: vec!["Teacher".to_string(), "Teacher Music".to_string()],
        };

        let outcome = apply_category_rule(records, &rule, true);

        let kept: Vec<usize> = outcome.records.iter().map(|r| r.source_row).collect();
        assert_eq!(kept, vec![0, 3]);
        assert_eq!(outcome.report.issues.len(), 2);
        assert_eq!(outcome.report.issues[0].detail, "Custodian");
    }

    #[test]
    fn test_cf_004_already_filtered_never_refilters() {
        let d = date(2021, 9, 1);
        let records = vec![with_category(record(0, "2021-2022", d), Some("Custodian"))];

        let outcome = apply_category_rule(records, &CategoryRule::AlreadyFiltered, true);

        assert_eq!(outcome.records.len(), 1);
        assert!(!outcome.report.applied);
    }

    #[test]
    fn test_cf_005_missing_category_column_skips_rule() {
        let d = date(2021, 9, 1);
        let records = vec![with_category(record(0, "2021-2022", d), None)];

        let outcome = apply_category_rule(records, &CategoryRule::default(), false);

        assert_eq!(outcome.records.len(), 1);
        assert!(!outcome.report.applied);
    }

    #[test]
    fn test_cf_006_empty_allowlist_keeps_everything() {
        let d = date(2021, 9, 1);
        let records = vec![with_category(record(0, "2021-2022", d), Some("Custodian"))];
        let rule = CategoryRule::Unfiltered { allowlist: vec![] };

        let outcome = apply_category_rule(records, &rule, true);

        assert_eq!(outcome.records.len(), 1);
    }

    // ==========================================================================
    // CF-007: period consistency rule
    // ==========================================================================
    #[test]
    fn test_cf_007_period_window_boundaries() {
        let records = vec![
            record(0, "2021-2022", date(2021, 7, 1)),
            record(1, "2021-2022", date(2021, 6, 30)),
            record(2, "2021-2022", date(2022, 6, 30)),
            record(3, "2021-2022", date(2022, 7, 1)),
        ];

        let outcome = apply_period_consistency_rule(records, true);

        let kept: Vec<usize> = outcome.records.iter().map(|r| r.source_row).collect();
        assert_eq!(kept, vec![0, 2]);
        let dropped: Vec<usize> = outcome.report.issues.iter().map(|i| i.row_index).collect();
        assert_eq!(dropped, vec![1, 3]);
    }

    #[test]
    fn test_cf_008_unparseable_period_passes_through() {
        let records = vec![
            record(0, "FY2022", date(1999, 1, 1)),
            record(1, "21-22", date(1999, 1, 1)),
            record(2, "", date(1999, 1, 1)),
        ];

        let outcome = apply_period_consistency_rule(records, true);

        assert_eq!(outcome.records.len(), 3);
        assert!(outcome.report.issues.is_empty());
    }

    #[test]
    fn test_cf_009_period_rule_toggle_off() {
        let records = vec![record(0, "2021-2022", date(2030, 1, 1))];

        let outcome = apply_period_consistency_rule(records, false);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.report.stage, Stage::PeriodConsistencyRule);
        assert!(!outcome.report.applied);
    }

    // ==========================================================================
    // CF-010: ordering and selection
    // ==========================================================================
    #[test]
    fn test_cf_010_filters_run_in_reference_order() {
        let records = vec![
            // dropped by the substitute rule, would also fail the category rule
            with_category(
                with_fill(
                    record(0, "2021-2022", date(2021, 9, 1)),
                    FillStatus::Unfilled,
                    SubstituteNeed::No,
                ),
                Some("Custodian"),
            ),
            // dropped by the category rule, would also fail the period rule
            with_category(record(1, "2021-2022", date(2023, 1, 1)), Some("Custodian")),
            record(2, "2021-2022", date(2023, 1, 1)),
            record(3, "2021-2022", date(2021, 9, 1)),
        ];

        let (kept, reports) = apply_coverage_filters(records, &CleaningRules::default(), true);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source_row, 3);
        let stages: Vec<Stage> = reports.iter().map(|r| r.stage).collect();
        assert_eq!(
            stages,
            vec![
                Stage::PeriodSelection,
                Stage::SubstituteRule,
                Stage::CategoryRule,
                Stage::PeriodConsistencyRule
            ]
        );
        let removed: Vec<usize> = reports.iter().map(StageReport::rows_removed).collect();
        assert_eq!(removed, vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_cf_011_period_selection() {
        let records = vec![
            record(0, "2020-2021", date(2020, 9, 1)),
            record(1, "2021-2022", date(2021, 9, 1)),
        ];

        let outcome = select_periods(records, &["2021-2022".to_string()]);

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].period_id, "2021-2022");
        assert_eq!(outcome.report.issues[0].kind, IssueKind::PeriodNotSelected);
    }
}
