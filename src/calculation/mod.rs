//! Cleaning and rating logic for the absence rating engine.
//!
//! This module contains one file per pipeline stage: header normalization,
//! record validation, coverage filtering, day-value calculation, period
//! aggregation, tier classification and premium calculation, plus the
//! orchestrator that runs them in order.

mod column_mapping;
mod coverage_filter;
mod day_duration;
mod period_aggregator;
mod pipeline;
mod premium;
mod record_validator;
mod tier_classifier;

pub use column_mapping::{HeaderRename, MappedTable, canonical_column, normalize_headers};
pub use coverage_filter::{
    FilterOutcome, apply_category_rule, apply_coverage_filters, apply_period_consistency_rule,
    apply_substitute_rule, period_window, select_periods,
};
pub use day_duration::{STANDARD_WORKDAY_HOURS, absence_days, compute_day_values};
pub use period_aggregator::{AggregationOutcome, aggregate_periods};
pub use pipeline::{PipelineOutput, rate, run_pipeline};
pub use premium::{PremiumResult, calculate_premium};
pub use record_validator::{
    MAX_DURATION_HOURS, ValidatedTable, ValidationOutcome, is_period_shape, validate_records,
};
pub use tier_classifier::{TierClassification, classify_employee, classify_tiers};
