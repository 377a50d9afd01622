//! Configuration for fairness evaluation.
//!
//! One record enumerates every recognized option. It can be built in code
//! with the `with_*` setters or parsed from TOML:
//!
//! ```toml
//! gap_policy = "mean_pairwise"
//! thresholds = [0.3, 0.5, 0.7]
//! min_group_size = 30
//! sensitive_features = ["gender", "race"]
//! models = ["logistic_regression", "random_forest"]
//! ```

use super::types::GapPolicy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for fairness evaluation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FairnessConfig {
    /// How per-group rates are reduced to a disparity score
    pub gap_policy: GapPolicy,
    /// Decision thresholds for the sweep; `None` uses the default 19
    pub thresholds: Option<Vec<f64>>,
    /// Groups with fewer samples are left out of the spreads
    pub min_group_size: usize,
    /// Names of the sensitive attributes, in intersection order
    pub sensitive_features: Vec<String>,
    /// Names of the models being compared
    pub models: Vec<String>,
}

impl Default for FairnessConfig {
    fn default() -> Self {
        Self {
            gap_policy: GapPolicy::MaxMinusMin,
            thresholds: None,
            min_group_size: 1,
            sensitive_features: Vec::new(),
            models: Vec::new(),
        }
    }
}

impl FairnessConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gap policy.
    pub fn with_gap_policy(mut self, policy: GapPolicy) -> Self {
        self.gap_policy = policy;
        self
    }

    /// Set sweep thresholds.
    pub fn with_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Set minimum samples per group.
    pub fn with_min_group_size(mut self, min: usize) -> Self {
        self.min_group_size = min;
        self
    }

    /// Set sensitive attribute names.
    pub fn with_sensitive_features<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_features = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set model names.
    pub fn with_models<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = names.into_iter().map(Into::into).collect();
        self
    }

    /// Check the configuration for values no evaluation could use.
    pub fn validate(&self) -> Result<()> {
        if self.min_group_size == 0 {
            return Err(Error::config("min_group_size must be at least 1"));
        }
        if let Some(thresholds) = &self.thresholds {
            if thresholds.len() < 2 {
                return Err(Error::config(format!(
                    "thresholds needs at least 2 values, got {}",
                    thresholds.len()
                )));
            }
            if let Some(t) = thresholds.iter().find(|t| !(0.0..=1.0).contains(*t)) {
                return Err(Error::config(format!("threshold {} is outside [0, 1]", t)));
            }
            let mut sorted = thresholds.clone();
            sorted.sort_by(f64::total_cmp);
            if let Some(pair) = sorted.windows(2).find(|w| w[0] == w[1]) {
                return Err(Error::config(format!("duplicate threshold {}", pair[0])));
            }
        }
        if let Some(dup) = first_duplicate(&self.sensitive_features) {
            return Err(Error::config(format!("duplicate sensitive feature '{}'", dup)));
        }
        if let Some(dup) = first_duplicate(&self.models) {
            return Err(Error::config(format!("duplicate model name '{}'", dup)));
        }
        Ok(())
    }

    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::debug!("loaded fairness config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(e.to_string()))
    }
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    names
        .iter()
        .enumerate()
        .find(|(i, name)| names[..*i].contains(*name))
        .map(|(_, name)| name.as_str())
}
