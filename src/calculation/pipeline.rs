//! Pipeline orchestration.
//!
//! Runs the stages in their fixed order over one in-memory table:
//! validation, period selection and coverage filters, day values,
//! aggregation, then rating. Each stage consumes the previous stage's output;
//! nothing is shared between invocations.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::{PipelineConfig, RatingParameters};
use crate::error::EngineResult;
use crate::models::{
    CleanedRecord, CleaningReport, CostRollup, PeriodEmployeeAggregate, PeriodRollup, RawTable,
    RatingResult, columns,
};

use super::coverage_filter::apply_coverage_filters;
use super::day_duration::compute_day_values;
use super::period_aggregator::aggregate_periods;
use super::premium::{calculate_premium, cost_of};
use super::record_validator::validate_records;
use super::tier_classifier::classify_tiers;

/// Everything one pipeline invocation produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Records that survived cleaning, with their day values.
    pub cleaned: Vec<CleanedRecord>,
    /// What each cleaning stage did.
    pub report: CleaningReport,
    /// Day totals per `(period_id, employee_id)`.
    pub aggregate: PeriodEmployeeAggregate,
    /// Staff and day totals per period.
    pub period_rollups: Vec<PeriodRollup>,
    /// Tiers, costs and premium.
    pub rating: RatingResult,
}

/// Runs the full cleaning and rating pipeline.
///
/// Headers are expected to be canonical already; see
/// [`normalize_headers`](super::normalize_headers).
///
/// # Errors
///
/// Returns `EngineError::Schema` when a required column is missing and
/// `EngineError::Parameter` when the rating parameters are out of bounds.
/// Row-level problems never fail the run; they are reported in
/// [`PipelineOutput::report`].
pub fn run_pipeline(table: &RawTable, config: &PipelineConfig) -> EngineResult<PipelineOutput> {
    let validation = validate_records(table)?;
    debug!(
        rows_in = validation.report.rows_in,
        rows_out = validation.report.rows_out,
        "validation complete"
    );

    let category_column_present = validation.table.has_column(columns::EMPLOYEE_CATEGORY);
    let ignored_columns = validation.table.ignored_columns.clone();
    let (records, filter_reports) = apply_coverage_filters(
        validation.table.records,
        &config.cleaning,
        category_column_present,
    );
    for fragment in &filter_reports {
        debug!(
            stage = ?fragment.stage,
            applied = fragment.applied,
            rows_in = fragment.rows_in,
            rows_out = fragment.rows_out,
            "filter complete"
        );
    }

    let mut fragments = Vec::with_capacity(filter_reports.len() + 1);
    fragments.push(validation.report);
    fragments.extend(filter_reports);
    let report = CleaningReport::assemble(table.len(), ignored_columns, fragments);

    let cleaned = compute_day_values(records);
    debug!(rows = cleaned.len(), "day values computed");

    let aggregation = aggregate_periods(&cleaned);
    debug!(
        pairs = aggregation.aggregate.len(),
        periods = aggregation.period_rollups.len(),
        "aggregation complete"
    );

    let rating = rate(
        &aggregation.aggregate,
        &aggregation.period_rollups,
        &config.rating,
    )?;

    info!(
        input_rows = report.input_rows,
        output_rows = report.output_rows,
        employees = rating.tiers.total_population(),
        total_premium = %rating.premium.total_premium,
        "pipeline complete"
    );

    Ok(PipelineOutput {
        cleaned,
        report,
        aggregate: aggregation.aggregate,
        period_rollups: aggregation.period_rollups,
        rating,
    })
}

/// Rates an aggregate: cost rollups, tier classification and premium.
///
/// Employee totals are summed across every period in the aggregate.
///
/// # Errors
///
/// Returns `EngineError::Parameter` if `params` fails validation or a cost
/// figure exceeds the decimal range.
pub fn rate(
    aggregate: &PeriodEmployeeAggregate,
    period_rollups: &[PeriodRollup],
    params: &RatingParameters,
) -> EngineResult<RatingResult> {
    params.validate()?;

    let periods = period_rollups
        .iter()
        .map(|rollup| -> EngineResult<CostRollup> {
            Ok(CostRollup {
                period_id: Some(rollup.period_id.clone()),
                staff_count: rollup.staff_count,
                absence_days: rollup.absence_days,
                replacement_cost: cost_of(params.cost_per_day, rollup.absence_days)?,
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    let employee_totals = aggregate.employee_totals();
    let overall_days: Decimal = employee_totals.values().copied().sum();
    let overall = CostRollup {
        period_id: None,
        staff_count: employee_totals.len(),
        absence_days: overall_days,
        replacement_cost: cost_of(params.cost_per_day, overall_days)?,
    };

    let classification = classify_tiers(&employee_totals, params, 1);
    let premium = calculate_premium(&classification.summary, params, 2)?;

    Ok(RatingResult {
        parameters: params.clone(),
        coverage_ceiling: params.coverage_ceiling(),
        periods,
        overall,
        employees: classification.employees,
        tiers: classification.summary,
        premium: premium.breakdown,
        audit_trace: vec![classification.audit_step, premium.audit_step],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryRule, CleaningRules};
    use crate::error::EngineError;
    use crate::models::{IssueKind, Stage, Tier};
    use serde_json::{Value, json};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn params() -> RatingParameters {
        RatingParameters {
            deductible_days: 20,
            coverage_days: 60,
            cost_per_day: dec("150"),
            commission_rate_a: dec("0.15"),
            commission_rate_b: dec("0.15"),
            period_length_days: Some(180),
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            rating: params(),
            cleaning: CleaningRules::default(),
        }
    }

    const HEADER: [&str; 7] = [
        "period_id",
        "employee_id",
        "occurred_on",
        "employee_category",
        "absence_type",
        "was_filled",
        "needs_substitute",
    ];

    fn full_day(employee_id: &str, day: u32) -> Vec<Value> {
        let date = chrono::NaiveDate::from_ymd_opt(2021, 7, 1).unwrap()
            + chrono::Duration::days(i64::from(day));
        vec![
            json!("2021-2022"),
            json!(employee_id),
            json!(date.format("%Y-%m-%d").to_string()),
            json!("Teacher"),
            json!("Full Day"),
            json!("filled"),
            json!("yes"),
        ]
    }

    /// Four employees with 15, 50, 75 and 100 full days.
    fn scenario_table() -> RawTable {
        let mut rows = Vec::new();
        for (employee_id, days) in [("A", 15), ("B", 50), ("C", 75), ("D", 100)] {
            for day in 0..days {
                rows.push(full_day(employee_id, day));
            }
        }
        RawTable::from_rows(&HEADER, rows)
    }

    // ==========================================================================
    // PL-001: reference scenario end to end
    // ==========================================================================
    #[test]
    fn test_pl_001_reference_scenario() {
        let output = run_pipeline(&scenario_table(), &config()).unwrap();
        let rating = &output.rating;

        assert_eq!(output.report.input_rows, 240);
        assert_eq!(output.report.output_rows, 240);
        assert_eq!(rating.coverage_ceiling, 80);
        assert_eq!(rating.tiers.coverage_range.population, 2);
        assert_eq!(rating.tiers.coverage_range.days, dec("85"));
        assert_eq!(rating.tiers.high_claimant.days, dec("20"));
        assert_eq!(rating.premium.coverage_cost, dec("12750"));
        assert_eq!(rating.premium.excess_cost, dec("3000"));
        assert_eq!(rating.premium.commission_a, dec("1912.5"));
        assert_eq!(rating.premium.commission_b, dec("1912.5"));
        assert_eq!(rating.premium.total_premium, dec("16575"));
    }

    #[test]
    fn test_pl_002_rollups_and_audit_trace() {
        let output = run_pipeline(&scenario_table(), &config()).unwrap();
        let rating = &output.rating;

        assert_eq!(rating.periods.len(), 1);
        assert_eq!(rating.periods[0].period_id.as_deref(), Some("2021-2022"));
        assert_eq!(rating.periods[0].staff_count, 4);
        assert_eq!(rating.periods[0].absence_days, dec("240"));
        assert_eq!(rating.periods[0].replacement_cost, dec("36000"));
        assert_eq!(rating.overall.staff_count, 4);
        assert_eq!(rating.overall.replacement_cost, dec("36000"));

        let rules: Vec<&str> = rating.audit_trace.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(rules, vec!["tier_classification", "premium"]);
        assert_eq!(rating.employees[3].tier, Tier::HighClaimant);
    }

    #[test]
    fn test_pl_003_missing_column_is_fatal() {
        let table = RawTable::from_rows(&["period_id", "employee_id"], vec![]);

        let result = run_pipeline(&table, &config());

        assert!(matches!(result, Err(EngineError::Schema { .. })));
    }

    #[test]
    fn test_pl_004_invalid_parameters_are_fatal() {
        let mut config = config();
        config.rating.commission_rate_b = dec("-0.1");

        let result = run_pipeline(&scenario_table(), &config);

        match result {
            Err(EngineError::Parameter { field, .. }) => assert_eq!(field, "commission_rate_b"),
            other => panic!("Expected Parameter error, got {:?}", other),
        }
    }

    #[test]
    fn test_pl_005_report_tracks_every_stage() {
        let mut table = scenario_table();
        table.push_cells(vec![
            json!("2021-2022"),
            json!("E"),
            json!("not a date"),
            json!("Teacher"),
            json!("Full Day"),
            json!("filled"),
            json!("yes"),
        ]);
        table.push_cells(vec![
            json!("2021-2022"),
            json!("F"),
            json!("2021-09-01"),
            json!("Custodian"),
            json!("Full Day"),
            json!("filled"),
            json!("yes"),
        ]);
        table.push_cells(vec![
            json!("2021-2022"),
            json!("G"),
            json!("2021-09-01"),
            json!("Teacher"),
            json!("Full Day"),
            json!("unfilled"),
            json!("no"),
        ]);

        let output = run_pipeline(&table, &config()).unwrap();
        let report = &output.report;

        assert_eq!(report.input_rows, 243);
        assert_eq!(report.output_rows, 240);
        assert_eq!(report.count(IssueKind::InvalidDate), 1);
        assert_eq!(report.count(IssueKind::CategoryExcluded), 1);
        assert_eq!(report.count(IssueKind::SubstituteNotNeeded), 1);
        assert_eq!(report.stages.len(), 5);
        assert_eq!(report.stages[0].stage, Stage::Validation);
        assert!(!report.stages[1].applied);
        assert_eq!(output.rating.premium.total_premium, dec("16575"));
    }

    #[test]
    fn test_pl_006_already_filtered_categories_kept() {
        let mut table = scenario_table();
        table.push_cells(vec![
            json!("2021-2022"),
            json!("F"),
            json!("2021-09-01"),
            json!("Custodian"),
            json!("Full Day"),
            json!("filled"),
            json!("yes"),
        ]);
        let mut config = config();
        config.cleaning.category_rule = CategoryRule::AlreadyFiltered;

        let output = run_pipeline(&table, &config).unwrap();

        assert_eq!(output.report.output_rows, 241);
        assert_eq!(output.rating.tiers.below_deductible.population, 2);
    }

    #[test]
    fn test_pl_007_empty_table_rates_to_zero() {
        let table = RawTable::new(HEADER);

        let output = run_pipeline(&table, &config()).unwrap();

        assert!(output.cleaned.is_empty());
        assert!(output.aggregate.is_empty());
        assert_eq!(output.rating.premium.total_premium, Decimal::ZERO);
        assert_eq!(output.rating.overall.staff_count, 0);
    }

    #[test]
    fn test_pl_008_output_is_deterministic() {
        let first = run_pipeline(&scenario_table(), &config()).unwrap();
        let second = run_pipeline(&scenario_table(), &config()).unwrap();

        assert_eq!(
            serde_json::to_string(&first.rating).unwrap(),
            serde_json::to_string(&second.rating).unwrap()
        );
        assert_eq!(first.report, second.report);
    }

    #[test]
    fn test_pl_009_totals_span_periods() {
        let mut rows = Vec::new();
        for day in 0..15 {
            rows.push(full_day("A", day));
        }
        for day in 0..10u32 {
            let date = format!("2022-09-{:02}", day + 1);
            rows.push(vec![
                json!("2022-2023"),
                json!("A"),
                json!(date),
                json!("Teacher"),
                json!("Full Day"),
                json!("filled"),
                json!("yes"),
            ]);
        }
        let table = RawTable::from_rows(&HEADER, rows);

        let output = run_pipeline(&table, &config()).unwrap();

        assert_eq!(output.aggregate.len(), 2);
        assert_eq!(output.rating.periods.len(), 2);
        assert_eq!(output.rating.employees[0].total_days, dec("25"));
        assert_eq!(output.rating.employees[0].chargeable_days, dec("5"));
    }

    // ==========================================================================
    // PL-010: arithmetic limits
    // ==========================================================================
    #[test]
    fn test_pl_010_cost_beyond_decimal_range_is_an_error() {
        let table = RawTable::from_rows(&HEADER, vec![full_day("A", 0), full_day("A", 1)]);
        let mut config = config();
        config.rating.cost_per_day = Decimal::MAX;

        match run_pipeline(&table, &config) {
            Err(EngineError::Parameter { field, .. }) => assert_eq!(field, "cost_per_day"),
            other => panic!("Expected Parameter error, got {:?}", other),
        }
    }

    #[test]
    fn test_pl_011_huge_durations_degrade_to_zero_days() {
        let header = [
            "period_id",
            "employee_id",
            "occurred_on",
            "absence_type",
            "duration_hours",
        ];
        let rows = (1..=9)
            .map(|day| {
                vec![
                    json!("2021-2022"),
                    json!("A"),
                    json!(format!("2021-09-{:02}", day)),
                    json!("Custom Duration"),
                    json!("79228162514264337593543950335"),
                ]
            })
            .collect();
        let table = RawTable::from_rows(&header, rows);

        let output = run_pipeline(&table, &config()).unwrap();

        assert_eq!(output.report.output_rows, 9);
        assert_eq!(output.report.count(IssueKind::InvalidValue), 9);
        assert_eq!(output.aggregate.get("2021-2022", "A"), Some(Decimal::ZERO));
        assert_eq!(output.rating.premium.total_premium, Decimal::ZERO);
    }
}
