//! Report types handed to dashboards and exporters.
//!
//! Everything here is plain data: serializable with serde, printable as a
//! text summary, and exportable as JSON.

use super::confusion::ConfusionCounts;
use super::types::{GapPolicy, MetricValue, PerformanceMetric};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Metric sets
// =============================================================================

/// Classification metrics over the full sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverallMetrics {
    /// Fraction of exact matches
    pub accuracy: MetricValue,
    /// TP / predicted positives
    pub precision: MetricValue,
    /// TP / actual positives
    pub recall: MetricValue,
    /// Harmonic mean of precision and recall
    pub f1: MetricValue,
    /// P(pred = 1)
    pub selection_rate: MetricValue,
}

impl OverallMetrics {
    /// Derive metrics from confusion counts.
    pub fn from_counts(counts: ConfusionCounts) -> Self {
        Self {
            accuracy: counts.accuracy(),
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
            selection_rate: counts.selection_rate(),
        }
    }
}

/// Metrics for one group of the sensitive attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMetrics {
    /// Group identifier
    pub group: String,
    /// Samples in the group
    pub count: usize,
    /// Fraction of exact matches within the group
    pub accuracy: MetricValue,
    /// Precision within the group
    pub precision: MetricValue,
    /// Recall within the group
    pub recall: MetricValue,
    /// F1 within the group
    pub f1: MetricValue,
    /// Same as recall
    pub true_positive_rate: MetricValue,
    /// FP / actual negatives (0.0 without negatives)
    pub false_positive_rate: MetricValue,
    /// P(pred = 1 | group)
    pub selection_rate: MetricValue,
    /// Raw counts
    pub confusion: ConfusionCounts,
}

impl GroupMetrics {
    /// Derive group metrics from confusion counts.
    pub fn from_counts(group: &str, counts: ConfusionCounts) -> Self {
        Self {
            group: group.to_string(),
            count: counts.total(),
            accuracy: counts.accuracy(),
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
            true_positive_rate: counts.true_positive_rate(),
            false_positive_rate: counts.false_positive_rate(),
            selection_rate: counts.selection_rate(),
            confusion: counts,
        }
    }

    /// Look up a standard classification metric by name.
    pub fn performance(&self, metric: PerformanceMetric) -> f64 {
        match metric {
            PerformanceMetric::Accuracy => self.accuracy.get(),
            PerformanceMetric::Precision => self.precision.get(),
            PerformanceMetric::Recall => self.recall.get(),
            PerformanceMetric::F1 => self.f1.get(),
        }
    }
}

// =============================================================================
// Fairness report
// =============================================================================

/// Complete fairness evaluation over one sensitive attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessReport {
    /// Number of samples evaluated
    pub n_samples: usize,
    /// Spread policy used for the difference metrics
    pub gap_policy: GapPolicy,
    /// Metrics over all samples
    pub overall: OverallMetrics,
    /// Per-group metrics, sorted by group identifier
    pub groups: Vec<GroupMetrics>,
    /// Spread of selection rate
    pub demographic_parity_difference: f64,
    /// Spread of TPR
    pub equal_opportunity_difference: f64,
    /// Mean of TPR spread and FPR spread
    pub average_odds_difference: f64,
    /// min / max selection rate
    pub disparate_impact_ratio: f64,
    /// Groups below the minimum size, left out of the spreads
    pub excluded_groups: Vec<String>,
    /// Data quality warnings
    pub warnings: Vec<String>,
}

impl FairnessReport {
    /// Generate a human-readable summary.
    pub fn summary(&self) -> String {
        let mut out = String::new();

        out.push_str("# Fairness Report\n\n");
        out.push_str(&format!(
            "Samples: {}  Groups: {}  Gap policy: {}\n\n",
            self.n_samples,
            self.groups.len(),
            self.gap_policy
        ));

        out.push_str("## Overall\n");
        out.push_str(&format!(
            "  Accuracy: {:.1}%  Precision: {:.1}%  Recall: {:.1}%  F1: {:.1}%\n\n",
            self.overall.accuracy.get() * 100.0,
            self.overall.precision.get() * 100.0,
            self.overall.recall.get() * 100.0,
            self.overall.f1.get() * 100.0,
        ));

        out.push_str("## By Group\n");
        out.push_str(&format_group_table(&self.groups));
        out.push('\n');

        out.push_str("## Fairness\n");
        out.push_str(&format!(
            "  Demographic parity difference: {:.4}\n",
            self.demographic_parity_difference
        ));
        out.push_str(&format!(
            "  Equal opportunity difference:  {:.4}\n",
            self.equal_opportunity_difference
        ));
        out.push_str(&format!(
            "  Average odds difference:       {:.4}\n",
            self.average_odds_difference
        ));
        out.push_str(&format!(
            "  Disparate impact ratio:        {:.4}\n",
            self.disparate_impact_ratio
        ));

        if !self.excluded_groups.is_empty() {
            out.push_str(&format!(
                "  Excluded (too small): {}\n",
                self.excluded_groups.join(", ")
            ));
        }
        out.push('\n');

        if !self.warnings.is_empty() {
            out.push_str("## Warnings\n");
            for warning in &self.warnings {
                out.push_str(&format!("  - {}\n", warning));
            }
        }

        out
    }

    /// Export report as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::Error::InvalidInput(format!("JSON serialization failed: {}", e)))
    }
}

impl fmt::Display for FairnessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Format per-group metrics as an ASCII table.
pub fn format_group_table(groups: &[GroupMetrics]) -> String {
    let mut output = String::new();

    output.push_str("Group            Count   Acc     Prec    Recall  FPR     Sel\n");
    output.push_str("--------------------------------------------------------------\n");

    for g in groups {
        output.push_str(&format!(
            "{:<16} {:>5}   {:5.1}%  {:5.1}%  {:5.1}%  {:5.1}%  {:5.1}%\n",
            truncate(&g.group, 16),
            g.count,
            g.accuracy.get() * 100.0,
            g.precision.get() * 100.0,
            g.recall.get() * 100.0,
            g.false_positive_rate.get() * 100.0,
            g.selection_rate.get() * 100.0,
        ));
    }

    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}
