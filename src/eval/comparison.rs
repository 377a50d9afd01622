//! Side-by-side comparison of several models on the same data.
//!
//! Every model is scored against the same labels and the same sensitive
//! attribute, so the rows of a [`ComparisonTable`] are directly comparable.
//!
//! # Example
//!
//! ```rust
//! use afet::eval::{ModelComparator, FairnessMetric};
//!
//! let y_true = [1, 0, 1, 0];
//! let sensitive = ["A", "A", "B", "B"];
//!
//! let mut comparator = ModelComparator::new(&y_true, &sensitive).unwrap();
//! comparator.add_model("always_yes", &[1, 1, 1, 1]).unwrap();
//! comparator.add_model("perfect", &[1, 0, 1, 0]).unwrap();
//!
//! let table = comparator.compare();
//! let ranked = table.rank_by_fairness(FairnessMetric::EqualOpportunityDifference);
//! assert_eq!(ranked.len(), 2);
//! ```

use super::config::FairnessConfig;
use super::fairness::{binary_labels, check_aligned, FairnessMetrics};
use super::types::{FairnessMetric, GapPolicy, PerformanceMetric};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Scores several models' predictions against shared labels.
#[derive(Debug, Clone)]
pub struct ModelComparator {
    y_true: Vec<bool>,
    sensitive: Vec<String>,
    models: Vec<(String, FairnessMetrics)>,
    policy: GapPolicy,
    min_group_size: usize,
}

impl ModelComparator {
    /// Create a comparator over the shared labels and sensitive attribute.
    pub fn new<S: AsRef<str>>(y_true: &[i64], sensitive: &[S]) -> Result<Self> {
        if y_true.is_empty() {
            return Err(Error::invalid_input("inputs must not be empty"));
        }
        check_aligned(y_true.len(), sensitive.len(), "sensitive_features")?;
        Ok(Self {
            y_true: binary_labels(y_true, "y_true")?,
            sensitive: sensitive.iter().map(|s| s.as_ref().to_string()).collect(),
            models: Vec::new(),
            policy: GapPolicy::default(),
            min_group_size: 1,
        })
    }

    /// Apply gap policy and minimum group size from a config record.
    ///
    /// Models already added are rescored with the new settings.
    pub fn with_config(mut self, config: &FairnessConfig) -> Self {
        self.policy = config.gap_policy;
        self.min_group_size = config.min_group_size;
        self.models = self
            .models
            .into_iter()
            .map(|(name, m)| (name, m.with_config(config)))
            .collect();
        self
    }

    /// Add a model's hard predictions.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the name is already taken or the
    ///   predictions are misaligned with the labels.
    /// - [`Error::UnsupportedLabel`] for non-binary predictions.
    pub fn add_model(&mut self, name: impl Into<String>, y_pred: &[i64]) -> Result<()> {
        let name = name.into();
        if self.models.iter().any(|(existing, _)| *existing == name) {
            return Err(Error::invalid_input(format!("model '{}' already added", name)));
        }
        check_aligned(self.y_true.len(), y_pred.len(), &format!("predictions of '{}'", name))?;
        let preds = binary_labels(y_pred, &name)?;
        let metrics = FairnessMetrics::from_bools(&self.y_true, &preds, &self.sensitive)?
            .with_policy(self.policy)
            .with_min_group_size(self.min_group_size);
        log::debug!("added model '{}' ({} samples)", name, preds.len());
        self.models.push((name, metrics));
        Ok(())
    }

    /// Names of the added models, in insertion order.
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Metrics for one model.
    pub fn metrics(&self, name: &str) -> Result<&FairnessMetrics> {
        self.models
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m)
            .ok_or_else(|| Error::invalid_input(format!("unknown model '{}'", name)))
    }

    /// Score every model, in insertion order.
    pub fn compare(&self) -> ComparisonTable {
        if self.models.is_empty() {
            log::warn!("comparing an empty set of models");
        }
        ComparisonTable {
            gap_policy: self.policy,
            rows: self
                .models
                .iter()
                .map(|(name, m)| ComparisonRow::from_metrics(name, m))
                .collect(),
        }
    }
}

/// One model's scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Model name
    pub model: String,
    /// Overall accuracy
    pub accuracy: f64,
    /// Overall precision
    pub precision: f64,
    /// Overall recall
    pub recall: f64,
    /// Overall F1
    pub f1: f64,
    /// Spread of selection rate
    pub demographic_parity_difference: f64,
    /// Spread of TPR
    pub equal_opportunity_difference: f64,
    /// Mean of TPR spread and FPR spread
    pub average_odds_difference: f64,
    /// min / max selection rate
    pub disparate_impact_ratio: f64,
}

impl ComparisonRow {
    fn from_metrics(model: &str, m: &FairnessMetrics) -> Self {
        Self {
            model: model.to_string(),
            accuracy: m.accuracy(),
            precision: m.precision(),
            recall: m.recall(),
            f1: m.f1_score(),
            demographic_parity_difference: m.demographic_parity_difference(),
            equal_opportunity_difference: m.equal_opportunity_difference(),
            average_odds_difference: m.average_odds_difference(),
            disparate_impact_ratio: m.disparate_impact_ratio(),
        }
    }

    /// Look up a classification metric by name.
    pub fn performance(&self, metric: PerformanceMetric) -> f64 {
        match metric {
            PerformanceMetric::Accuracy => self.accuracy,
            PerformanceMetric::Precision => self.precision,
            PerformanceMetric::Recall => self.recall,
            PerformanceMetric::F1 => self.f1,
        }
    }

    /// Look up a fairness metric by name.
    pub fn fairness(&self, metric: FairnessMetric) -> f64 {
        match metric {
            FairnessMetric::DemographicParityDifference => self.demographic_parity_difference,
            FairnessMetric::EqualOpportunityDifference => self.equal_opportunity_difference,
            FairnessMetric::AverageOddsDifference => self.average_odds_difference,
            FairnessMetric::DisparateImpactRatio => self.disparate_impact_ratio,
        }
    }
}

/// Scores for every compared model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTable {
    /// Spread policy used for the fairness columns
    pub gap_policy: GapPolicy,
    /// One row per model, in insertion order
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    /// Rows ordered best-first on a classification metric (descending).
    /// Ties keep insertion order.
    pub fn rank_by_performance(&self, metric: PerformanceMetric) -> Vec<&ComparisonRow> {
        let mut rows: Vec<&ComparisonRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| {
            b.performance(metric)
                .partial_cmp(&a.performance(metric))
                .unwrap_or(Ordering::Equal)
        });
        rows
    }

    /// Rows ordered fairest-first on a fairness metric.
    ///
    /// Differences sort ascending; the disparate impact ratio sorts by
    /// distance from 1.0. Ties keep insertion order.
    pub fn rank_by_fairness(&self, metric: FairnessMetric) -> Vec<&ComparisonRow> {
        let key = |row: &ComparisonRow| {
            let v = row.fairness(metric);
            if metric.lower_is_better() {
                v
            } else {
                (1.0 - v).abs()
            }
        };
        let mut rows: Vec<&ComparisonRow> = self.rows.iter().collect();
        rows.sort_by(|a, b| key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal));
        rows
    }

    /// Format as ASCII table.
    pub fn to_table(&self) -> String {
        let mut output = String::new();
        output.push_str("Model                  Acc     F1      DP diff  EO diff  AO diff  DI ratio\n");
        output.push_str("--------------------------------------------------------------------------\n");
        for row in &self.rows {
            output.push_str(&format!(
                "{:<22} {:5.1}%  {:5.1}%  {:.3}    {:.3}    {:.3}    {:.3}\n",
                row.model,
                row.accuracy * 100.0,
                row.f1 * 100.0,
                row.demographic_parity_difference,
                row.equal_opportunity_difference,
                row.average_odds_difference,
                row.disparate_impact_ratio,
            ));
        }
        output
    }

    /// Export table as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidInput(format!("JSON serialization failed: {}", e)))
    }
}

impl fmt::Display for ComparisonTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_table())
    }
}
