//! Configuration types for cleaning and rating.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files or API requests.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Employee categories kept when no allow-list is configured.
pub const DEFAULT_CATEGORY_ALLOWLIST: [&str; 3] = ["Teacher", "Teacher Music", "Teacher SpecEd"];

/// Scalars driving tier classification and premium calculation.
///
/// Day thresholds are unsigned, so they cannot be negative. The decimal
/// fields are checked by [`RatingParameters::validate`].
///
/// # Example
///
/// ```
/// use absence_rating::config::RatingParameters;
/// use rust_decimal::Decimal;
///
/// let params = RatingParameters {
///     deductible_days: 20,
///     coverage_days: 60,
///     cost_per_day: Decimal::from(150),
///     commission_rate_a: Decimal::new(15, 2),
///     commission_rate_b: Decimal::new(15, 2),
///     period_length_days: Some(180),
/// };
/// assert_eq!(params.coverage_ceiling(), 80);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingParameters {
    /// Days an employee absorbs before coverage starts.
    pub deductible_days: u32,
    /// Width of the coverage range in days.
    pub coverage_days: u32,
    /// Replacement cost per absence day.
    pub cost_per_day: Decimal,
    /// First commission rate, in `[0, 1]`.
    pub commission_rate_a: Decimal,
    /// Second commission rate, in `[0, 1]`.
    pub commission_rate_b: Decimal,
    /// School year length. Echoed in output, never used in arithmetic.
    #[serde(default)]
    pub period_length_days: Option<u32>,
}

impl RatingParameters {
    /// Upper boundary of the coverage range.
    pub fn coverage_ceiling(&self) -> u32 {
        self.deductible_days.saturating_add(self.coverage_days)
    }

    /// Checks every bound the rating stages rely on.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Parameter`] if `cost_per_day` is negative, a
    /// commission rate lies outside `[0, 1]`, or the coverage ceiling
    /// overflows.
    pub fn validate(&self) -> EngineResult<()> {
        if self.cost_per_day < Decimal::ZERO {
            return Err(EngineError::Parameter {
                field: "cost_per_day".to_string(),
                message: format!("must not be negative, got {}", self.cost_per_day),
            });
        }

        for (field, rate) in [
            ("commission_rate_a", self.commission_rate_a),
            ("commission_rate_b", self.commission_rate_b),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(EngineError::Parameter {
                    field: field.to_string(),
                    message: format!("must be within [0, 1], got {}", rate),
                });
            }
        }

        if self.deductible_days.checked_add(self.coverage_days).is_none() {
            return Err(EngineError::Parameter {
                field: "coverage_days".to_string(),
                message: "deductible_days + coverage_days overflows".to_string(),
            });
        }

        Ok(())
    }
}

/// How the category sub-rule behaves, fixed before the pipeline runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRule {
    /// Keep only rows whose category is in the allow-list. An empty list keeps everything.
    Unfiltered {
        /// Category labels to keep.
        allowlist: Vec<String>,
    },
    /// The caller already filtered categories upstream; never filter again.
    AlreadyFiltered,
}

impl Default for CategoryRule {
    fn default() -> Self {
        CategoryRule::Unfiltered {
            allowlist: DEFAULT_CATEGORY_ALLOWLIST
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

/// Toggles and parameters for the coverage filter sub-rules.
///
/// Serialized with flat field names (`category_allowlist`,
/// `categories_already_filtered`, ...) and converted once into a
/// [`CategoryRule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CleaningRulesFile", into = "CleaningRulesFile")]
pub struct CleaningRules {
    /// Drop unfilled absences that needed no substitute.
    pub apply_substitute_rule: bool,
    /// Category filtering behaviour.
    pub category_rule: CategoryRule,
    /// Drop rows dated outside their period window.
    pub apply_period_consistency_rule: bool,
    /// Periods to keep. Empty keeps every period.
    pub selected_periods: Vec<String>,
}

impl Default for CleaningRules {
    fn default() -> Self {
        Self {
            apply_substitute_rule: true,
            category_rule: CategoryRule::default(),
            apply_period_consistency_rule: true,
            selected_periods: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Flat wire form of [`CleaningRules`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CleaningRulesFile {
    #[serde(default = "default_true")]
    apply_substitute_rule: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category_allowlist: Option<Vec<String>>,
    #[serde(default)]
    categories_already_filtered: bool,
    #[serde(default = "default_true")]
    apply_period_consistency_rule: bool,
    #[serde(default)]
    selected_periods: Vec<String>,
}

impl From<CleaningRulesFile> for CleaningRules {
    fn from(file: CleaningRulesFile) -> Self {
        let category_rule = if file.categories_already_filtered {
            CategoryRule::AlreadyFiltered
        } else {
            match file.category_allowlist {
                Some(allowlist) => CategoryRule::Unfiltered { allowlist },
                None => CategoryRule::default(),
            }
        };

        Self {
            apply_substitute_rule: file.apply_substitute_rule,
            category_rule,
            apply_period_consistency_rule: file.apply_period_consistency_rule,
            selected_periods: file.selected_periods,
        }
    }
}

impl From<CleaningRules> for CleaningRulesFile {
    fn from(rules: CleaningRules) -> Self {
        let (category_allowlist, categories_already_filtered) = match rules.category_rule {
            CategoryRule::Unfiltered { allowlist } => (Some(allowlist), false),
            CategoryRule::AlreadyFiltered => (None, true),
        };

        Self {
            apply_substitute_rule: rules.apply_substitute_rule,
            category_allowlist,
            categories_already_filtered,
            apply_period_consistency_rule: rules.apply_period_consistency_rule,
            selected_periods: rules.selected_periods,
        }
    }
}

/// Everything one pipeline run needs besides the input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Rating scalars.
    pub rating: RatingParameters,
    /// Cleaning toggles.
    #[serde(default)]
    pub cleaning: CleaningRules,
}
