//! Intersectional fairness across several sensitive attributes.
//!
//! A model can look fair along gender and along race separately while
//! treating one intersection (say, `Female_Black`) much worse. This module
//! combines attributes into composite groups and reports the same fairness
//! scores over them, alongside the single-attribute breakdowns.
//!
//! Composite group keys join the attribute values with `_` in the order the
//! attributes were given. When more than one attribute is combined, values
//! must not contain `_` themselves.
//!
//! # Example
//!
//! ```rust
//! use afet::eval::IntersectionalFairnessMetrics;
//!
//! let y_true = [1, 0, 1, 0];
//! let y_pred = [1, 0, 0, 0];
//! let gender = ["F", "F", "M", "M"];
//! let race = ["X", "Y", "X", "Y"];
//!
//! let m = IntersectionalFairnessMetrics::new(
//!     &y_true,
//!     &y_pred,
//!     &[("gender", &gender[..]), ("race", &race[..])],
//! )
//! .unwrap();
//! assert_eq!(m.combined().groups(), vec!["F_X", "F_Y", "M_X", "M_Y"]);
//! ```

use super::config::FairnessConfig;
use super::fairness::{binary_labels, check_aligned, FairnessMetrics};
use super::report::{FairnessReport, GroupMetrics};
use super::types::{GapPolicy, PerformanceMetric};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Separator between attribute values in a composite group key.
pub const GROUP_SEPARATOR: &str = "_";

/// Fairness metrics over the intersection of several sensitive attributes.
#[derive(Debug, Clone)]
pub struct IntersectionalFairnessMetrics {
    attributes: Vec<String>,
    combined: FairnessMetrics,
    per_attribute: Vec<FairnessMetrics>,
}

impl IntersectionalFairnessMetrics {
    /// Build metrics from labels, hard predictions and named attribute columns.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for empty input, no attributes, misaligned
    ///   columns or a repeated attribute name. With two or more attributes,
    ///   also for any value containing [`GROUP_SEPARATOR`].
    /// - [`Error::UnsupportedLabel`] for non-binary labels or predictions.
    pub fn new<S: AsRef<str>>(
        y_true: &[i64],
        y_pred: &[i64],
        attributes: &[(&str, &[S])],
    ) -> Result<Self> {
        if y_true.is_empty() {
            return Err(Error::invalid_input("inputs must not be empty"));
        }
        if attributes.is_empty() {
            return Err(Error::invalid_input(
                "intersectional analysis needs at least one sensitive attribute",
            ));
        }
        check_aligned(y_true.len(), y_pred.len(), "y_pred")?;
        for (i, (name, column)) in attributes.iter().enumerate() {
            check_aligned(y_true.len(), column.len(), name)?;
            if attributes[..i].iter().any(|(other, _)| other == name) {
                return Err(Error::invalid_input(format!(
                    "sensitive attribute '{}' given twice",
                    name
                )));
            }
        }

        // A value containing the separator would make two different
        // intersections share a key
        if attributes.len() > 1 {
            for (name, column) in attributes {
                if let Some(i) = column
                    .iter()
                    .position(|v| v.as_ref().contains(GROUP_SEPARATOR))
                {
                    return Err(Error::invalid_input(format!(
                        "{}[{}] = {:?} contains the group separator {:?}",
                        name,
                        i,
                        column[i].as_ref(),
                        GROUP_SEPARATOR
                    )));
                }
            }
        }

        let labels = binary_labels(y_true, "y_true")?;
        let preds = binary_labels(y_pred, "y_pred")?;

        let composite: Vec<String> = (0..labels.len())
            .map(|i| {
                attributes
                    .iter()
                    .map(|(_, column)| column[i].as_ref())
                    .collect::<Vec<_>>()
                    .join(GROUP_SEPARATOR)
            })
            .collect();

        let combined = FairnessMetrics::from_bools(&labels, &preds, &composite)?;
        let per_attribute = attributes
            .iter()
            .map(|(_, column)| FairnessMetrics::from_bools(&labels, &preds, *column))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "intersectional metrics: {} attributes, {} composite groups",
            attributes.len(),
            combined.groups().len()
        );

        Ok(Self {
            attributes: attributes.iter().map(|(name, _)| name.to_string()).collect(),
            combined,
            per_attribute,
        })
    }

    /// Use a different spread policy everywhere.
    pub fn with_policy(self, policy: GapPolicy) -> Self {
        self.map_metrics(|m| m.with_policy(policy))
    }

    /// Exclude small groups from every spread.
    ///
    /// Intersections thin out quickly, so this usually matters more here
    /// than for a single attribute.
    pub fn with_min_group_size(self, min: usize) -> Self {
        self.map_metrics(|m| m.with_min_group_size(min))
    }

    /// Apply gap policy and minimum group size from a config record.
    pub fn with_config(self, config: &FairnessConfig) -> Self {
        self.map_metrics(|m| m.with_config(config))
    }

    fn map_metrics(self, f: impl Fn(FairnessMetrics) -> FairnessMetrics) -> Self {
        Self {
            attributes: self.attributes,
            combined: f(self.combined),
            per_attribute: self.per_attribute.into_iter().map(&f).collect(),
        }
    }

    /// Attribute names, in intersection order.
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Metrics over the composite groups.
    pub fn combined(&self) -> &FairnessMetrics {
        &self.combined
    }

    /// Metrics over a single attribute.
    pub fn attribute(&self, name: &str) -> Result<&FairnessMetrics> {
        self.attributes
            .iter()
            .position(|a| a == name)
            .map(|i| &self.per_attribute[i])
            .ok_or_else(|| Error::invalid_input(format!("unknown sensitive attribute '{}'", name)))
    }

    /// Report for every single attribute, in attribute order.
    pub fn per_attribute(&self) -> Vec<AttributeReport> {
        self.attributes
            .iter()
            .zip(&self.per_attribute)
            .map(|(name, metrics)| AttributeReport {
                attribute: name.clone(),
                report: metrics.fairness_report(),
            })
            .collect()
    }

    /// Composite group doing worst on `metric`, among groups large enough to
    /// count. Ties go to the first group in key order.
    pub fn worst_group(&self, metric: PerformanceMetric) -> Option<GroupMetrics> {
        let min = self.combined.min_group_size();
        self.combined
            .by_group()
            .into_iter()
            .filter(|g| g.count >= min)
            .fold(None, |worst: Option<GroupMetrics>, g| match worst {
                Some(w) if w.performance(metric) <= g.performance(metric) => Some(w),
                _ => Some(g),
            })
    }

    /// Full intersectional report.
    pub fn report(&self) -> IntersectionalReport {
        let combined = self.combined.fairness_report();
        let mut amplified = Vec::new();
        let per_attribute = self.per_attribute();

        // Flag when the intersection shows more disparity than any single
        // attribute does
        let max_single_dp = per_attribute
            .iter()
            .map(|a| a.report.demographic_parity_difference)
            .fold(0.0, f64::max);
        if combined.demographic_parity_difference > max_single_dp {
            amplified.push(format!(
                "Intersectional DP difference {:.3} exceeds the largest single-attribute value {:.3}",
                combined.demographic_parity_difference, max_single_dp
            ));
        }

        IntersectionalReport {
            attributes: self.attributes.clone(),
            combined,
            per_attribute,
            worst_accuracy_group: self
                .worst_group(PerformanceMetric::Accuracy)
                .map(|g| g.group),
            findings: amplified,
        }
    }
}

/// Fairness report for one attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeReport {
    /// Attribute name
    pub attribute: String,
    /// Report over that attribute's groups
    pub report: FairnessReport,
}

/// Intersectional and per-attribute fairness results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntersectionalReport {
    /// Attribute names, in intersection order
    pub attributes: Vec<String>,
    /// Report over composite groups
    pub combined: FairnessReport,
    /// One report per attribute
    pub per_attribute: Vec<AttributeReport>,
    /// Composite group with the lowest accuracy
    pub worst_accuracy_group: Option<String>,
    /// Disparities that only show up at the intersection
    pub findings: Vec<String>,
}

impl IntersectionalReport {
    /// Export report as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidInput(format!("JSON serialization failed: {}", e)))
    }
}
