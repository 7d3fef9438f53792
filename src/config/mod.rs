//! Configuration loading and management for the absence rating engine.
//!
//! This module provides the rating scalars and cleaning toggles consumed by
//! the pipeline, and a loader reading them from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use absence_rating::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Coverage ceiling: {} days", config.rating().coverage_ceiling());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CategoryRule, CleaningRules, DEFAULT_CATEGORY_ALLOWLIST, PipelineConfig, RatingParameters,
};
