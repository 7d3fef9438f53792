//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading rating and
//! cleaning configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{CleaningRules, PipelineConfig, RatingParameters};

/// Loads and provides access to pipeline configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── rating.yaml    # RatingParameters
/// └── cleaning.yaml  # CleaningRules (optional; defaults apply every rule)
/// ```
///
/// # Example
///
/// ```no_run
/// use absence_rating::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Deductible: {} days", loader.rating().deductible_days);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PipelineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `rating.yaml` is missing
    /// - Any file contains invalid YAML or misses a required field
    /// - The rating parameters are out of bounds
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let rating = Self::load_yaml::<RatingParameters>(&path.join("rating.yaml"))?;

        let cleaning_path = path.join("cleaning.yaml");
        let cleaning = if cleaning_path.exists() {
            Self::load_yaml::<CleaningRules>(&cleaning_path)?
        } else {
            CleaningRules::default()
        };

        Self::from_config(PipelineConfig { rating, cleaning })
    }

    /// Wraps an already-built configuration after validating it.
    pub fn from_config(config: PipelineConfig) -> EngineResult<Self> {
        config.rating.validate()?;
        Ok(Self { config })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the full pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the rating parameters.
    pub fn rating(&self) -> &RatingParameters {
        &self.config.rating
    }

    /// Returns the cleaning rules.
    pub fn cleaning(&self) -> &CleaningRules {
        &self.config.cleaning
    }
}
