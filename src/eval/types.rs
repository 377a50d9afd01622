//! Evaluation types: MetricValue, FairnessMetric, GapPolicy.
//!
//! Shared primitives used by the group metrics, the threshold sweep and the
//! model comparator.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// MetricValue
// =============================================================================

/// A type-safe rate bounded to [0.0, 1.0].
///
/// Accuracy, precision, recall and the per-group rates are always valid
/// probabilities; wrapping them keeps that visible in signatures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(transparent)]
pub struct MetricValue(f64);

impl MetricValue {
    /// Create a new MetricValue, clamping to [0.0, 1.0].
    ///
    /// # Example
    /// ```
    /// use afet::eval::MetricValue;
    /// let v = MetricValue::new(0.95);
    /// assert!((v.get() - 0.95).abs() < 1e-6);
    /// ```
    pub fn new(value: f64) -> Self {
        MetricValue(value.clamp(0.0, 1.0))
    }

    /// Try to create a MetricValue, returning error if out of bounds.
    pub fn try_new(value: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::InvalidInput(format!(
                "MetricValue must be in [0.0, 1.0], got {}",
                value
            )));
        }
        Ok(MetricValue(value))
    }

    /// Ratio with the zero-division fallback: `0 / 0` is `0.0`.
    pub fn ratio(numerator: usize, denominator: usize) -> Self {
        if denominator == 0 {
            MetricValue(0.0)
        } else {
            MetricValue::new(numerator as f64 / denominator as f64)
        }
    }

    /// Get the underlying value.
    #[inline]
    pub fn get(&self) -> f64 {
        self.0
    }
}

impl Default for MetricValue {
    fn default() -> Self {
        MetricValue(0.0)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::new(value)
    }
}

// =============================================================================
// Named metrics
// =============================================================================

/// Group-fairness metrics, addressable by name.
///
/// The string forms are the snake_case names used in reports and config
/// files (`"demographic_parity_difference"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FairnessMetric {
    /// Spread of positive-prediction rate across groups.
    DemographicParityDifference,
    /// Spread of true-positive rate across groups.
    EqualOpportunityDifference,
    /// Mean of the TPR spread and the FPR spread.
    AverageOddsDifference,
    /// Lowest selection rate divided by the highest.
    DisparateImpactRatio,
}

impl FairnessMetric {
    /// Every fairness metric, in report order.
    pub const ALL: [FairnessMetric; 4] = [
        FairnessMetric::DemographicParityDifference,
        FairnessMetric::EqualOpportunityDifference,
        FairnessMetric::AverageOddsDifference,
        FairnessMetric::DisparateImpactRatio,
    ];

    /// Canonical snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            FairnessMetric::DemographicParityDifference => "demographic_parity_difference",
            FairnessMetric::EqualOpportunityDifference => "equal_opportunity_difference",
            FairnessMetric::AverageOddsDifference => "average_odds_difference",
            FairnessMetric::DisparateImpactRatio => "disparate_impact_ratio",
        }
    }

    /// Whether smaller values mean a fairer model.
    ///
    /// The differences are 0 when all groups match; the ratio is 1.
    pub fn lower_is_better(&self) -> bool {
        !matches!(self, FairnessMetric::DisparateImpactRatio)
    }
}

impl fmt::Display for FairnessMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FairnessMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FairnessMetric::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or_else(|| Error::invalid_input(format!("unknown fairness metric: {}", s)))
    }
}

/// Standard classification metrics, addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceMetric {
    /// Fraction of exact matches.
    Accuracy,
    /// TP / predicted positives.
    Precision,
    /// TP / actual positives.
    Recall,
    /// Harmonic mean of precision and recall.
    F1,
}

impl PerformanceMetric {
    /// Canonical snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            PerformanceMetric::Accuracy => "accuracy",
            PerformanceMetric::Precision => "precision",
            PerformanceMetric::Recall => "recall",
            PerformanceMetric::F1 => "f1_score",
        }
    }
}

impl fmt::Display for PerformanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Gap policy
// =============================================================================

/// How a per-group rate is reduced to a single disparity score.
///
/// With two groups both policies give `|a - b|`. They diverge for three or
/// more groups:
///
/// - [`GapPolicy::MaxMinusMin`] reports the gap between the best- and
///   worst-treated groups (the pairwise extremes). This is the default.
/// - [`GapPolicy::MeanPairwise`] averages `|a - b|` over every unordered
///   pair of groups.
///
/// A single group always has a spread of 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// `max(rates) - min(rates)`.
    #[default]
    MaxMinusMin,
    /// Mean absolute difference over all unordered pairs.
    MeanPairwise,
}

impl GapPolicy {
    /// Reduce per-group rates to a non-negative spread.
    pub fn spread(&self, rates: &[f64]) -> f64 {
        if rates.len() < 2 {
            return 0.0;
        }
        match self {
            GapPolicy::MaxMinusMin => {
                let min = rates.iter().copied().fold(f64::INFINITY, f64::min);
                let max = rates.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                max - min
            }
            GapPolicy::MeanPairwise => {
                let mut total = 0.0;
                let mut pairs = 0usize;
                for (i, a) in rates.iter().enumerate() {
                    for b in &rates[i + 1..] {
                        total += (a - b).abs();
                        pairs += 1;
                    }
                }
                total / pairs as f64
            }
        }
    }
}

impl fmt::Display for GapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapPolicy::MaxMinusMin => f.write_str("max_minus_min"),
            GapPolicy::MeanPairwise => f.write_str("mean_pairwise"),
        }
    }
}
