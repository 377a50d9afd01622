//! Decision-threshold analysis for accuracy/fairness trade-offs.
//!
//! Converts predicted probabilities into hard predictions at a series of cut
//! points and recomputes accuracy and the group-fairness metrics at each one.
//! Useful for:
//! - Seeing how much accuracy a fairness target costs
//! - Picking an operating point under a disparity budget
//! - Feeding threshold trade-off plots
//!
//! # Example
//!
//! ```rust
//! use afet::eval::threshold_analysis::plot_threshold_analysis;
//!
//! let y_true = [1, 1, 0, 0];
//! let y_prob = [0.9, 0.4, 0.3, 0.8];
//! let sensitive = ["A", "A", "B", "B"];
//!
//! let points = plot_threshold_analysis(&y_true, &y_prob, &sensitive, None).unwrap();
//! assert_eq!(points.len(), 19);
//! for p in &points {
//!     println!("t={:.2} acc={:.2} dp={:.2}", p.threshold, p.accuracy, p.demographic_parity_difference);
//! }
//! ```

use super::config::FairnessConfig;
use super::fairness::{binary_labels, check_aligned, FairnessMetrics};
use super::types::GapPolicy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of thresholds in the default sweep.
pub const DEFAULT_NUM_THRESHOLDS: usize = 19;

/// The default sweep: 0.05, 0.10, ..., 0.95.
pub fn default_thresholds() -> Vec<f64> {
    (1..=DEFAULT_NUM_THRESHOLDS).map(|i| i as f64 / 20.0).collect()
}

// =============================================================================
// Data Structures
// =============================================================================

/// Metrics at a specific threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPoint {
    /// Decision threshold (predict 1 when probability >= threshold)
    pub threshold: f64,
    /// Overall accuracy at this threshold
    pub accuracy: f64,
    /// Overall positive-prediction rate at this threshold
    pub selection_rate: f64,
    /// Spread of selection rate across groups
    pub demographic_parity_difference: f64,
    /// Spread of TPR across groups
    pub equal_opportunity_difference: f64,
    /// Mean of TPR spread and FPR spread
    pub average_odds_difference: f64,
}

/// Full threshold sweep results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdCurve {
    /// Points along the sweep, ascending by threshold
    pub points: Vec<ThresholdPoint>,
    /// Threshold with the highest accuracy
    pub best_accuracy_threshold: f64,
    /// Accuracy at that threshold
    pub best_accuracy: f64,
    /// Threshold with the lowest demographic parity difference
    /// (ties go to higher accuracy)
    pub fairest_threshold: f64,
    /// Demographic parity difference at that threshold
    pub fairest_dp: f64,
    /// Number of samples analyzed
    pub total_samples: usize,
}

impl ThresholdCurve {
    /// Highest-accuracy point whose demographic parity difference is at most
    /// `max_dp`. Ties go to the lower threshold.
    pub fn best_under_constraint(&self, max_dp: f64) -> Option<&ThresholdPoint> {
        self.points
            .iter()
            .filter(|p| p.demographic_parity_difference <= max_dp)
            .fold(None, |best: Option<&ThresholdPoint>, p| match best {
                Some(b) if b.accuracy >= p.accuracy => Some(b),
                _ => Some(p),
            })
    }

    /// Accuracy given up by moving from the most accurate to the fairest
    /// threshold.
    pub fn fairness_cost(&self) -> f64 {
        let fairest_acc = self
            .points
            .iter()
            .find(|p| p.threshold == self.fairest_threshold)
            .map(|p| p.accuracy)
            .unwrap_or(self.best_accuracy);
        self.best_accuracy - fairest_acc
    }
}

// =============================================================================
// Threshold Analyzer
// =============================================================================

/// Sweeps decision thresholds over predicted probabilities.
#[derive(Debug, Clone, Default)]
pub struct ThresholdAnalyzer {
    /// Thresholds to evaluate; `None` means [`default_thresholds`]
    pub thresholds: Option<Vec<f64>>,
    /// Spread policy for the fairness metrics
    pub policy: GapPolicy,
    /// Groups smaller than this are left out of the spreads
    pub min_group_size: usize,
}

impl ThresholdAnalyzer {
    /// Create analyzer with the default sweep.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create analyzer from a config record.
    pub fn from_config(config: &FairnessConfig) -> Self {
        Self {
            thresholds: config.thresholds.clone(),
            policy: config.gap_policy,
            min_group_size: config.min_group_size,
        }
    }

    /// Use a custom threshold set.
    pub fn with_thresholds(mut self, thresholds: Vec<f64>) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Use a different spread policy.
    pub fn with_policy(mut self, policy: GapPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Exclude groups with fewer samples than `min` from the spreads.
    pub fn with_min_group_size(mut self, min: usize) -> Self {
        self.min_group_size = min.max(1);
        self
    }

    /// Sorted, validated threshold list.
    fn resolved_thresholds(&self) -> Result<Vec<f64>> {
        let mut thresholds = match &self.thresholds {
            Some(t) => t.clone(),
            None => return Ok(default_thresholds()),
        };
        if thresholds.len() < 2 {
            return Err(Error::invalid_input(format!(
                "threshold analysis needs at least 2 thresholds, got {}",
                thresholds.len()
            )));
        }
        if let Some(bad) = thresholds.iter().find(|t| !(0.0..=1.0).contains(*t)) {
            return Err(Error::invalid_input(format!("threshold {} is outside [0, 1]", bad)));
        }
        thresholds.sort_by(f64::total_cmp);
        Ok(thresholds)
    }

    /// Compute one [`ThresholdPoint`] per threshold, ascending.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for empty or misaligned inputs, probabilities
    ///   or thresholds outside [0, 1], or fewer than 2 thresholds.
    /// - [`Error::UnsupportedLabel`] for non-binary labels.
    pub fn sweep<S: AsRef<str>>(
        &self,
        y_true: &[i64],
        y_prob: &[f64],
        sensitive: &[S],
    ) -> Result<Vec<ThresholdPoint>> {
        if y_true.is_empty() {
            return Err(Error::invalid_input("inputs must not be empty"));
        }
        check_aligned(y_true.len(), y_prob.len(), "y_prob")?;
        check_aligned(y_true.len(), sensitive.len(), "sensitive_features")?;
        let labels = binary_labels(y_true, "y_true")?;
        if let Some((i, p)) = y_prob
            .iter()
            .enumerate()
            .find(|(_, p)| !(0.0..=1.0).contains(*p))
        {
            return Err(Error::invalid_input(format!(
                "y_prob[{}] = {} is outside [0, 1]",
                i, p
            )));
        }
        let thresholds = self.resolved_thresholds()?;

        log::debug!(
            "threshold sweep: {} thresholds over {} samples",
            thresholds.len(),
            labels.len()
        );

        let mut points = Vec::with_capacity(thresholds.len());
        let mut preds = vec![false; y_prob.len()];
        for threshold in thresholds {
            for (pred, &p) in preds.iter_mut().zip(y_prob) {
                *pred = p >= threshold;
            }
            let metrics = FairnessMetrics::from_bools(&labels, &preds, sensitive)?
                .with_policy(self.policy)
                .with_min_group_size(self.min_group_size);
            points.push(ThresholdPoint {
                threshold,
                accuracy: metrics.accuracy(),
                selection_rate: metrics.selection_rate(),
                demographic_parity_difference: metrics.demographic_parity_difference(),
                equal_opportunity_difference: metrics.equal_opportunity_difference(),
                average_odds_difference: metrics.average_odds_difference(),
            });
        }

        Ok(points)
    }

    /// Sweep and summarise the trade-off.
    pub fn analyze<S: AsRef<str>>(
        &self,
        y_true: &[i64],
        y_prob: &[f64],
        sensitive: &[S],
    ) -> Result<ThresholdCurve> {
        let points = self.sweep(y_true, y_prob, sensitive)?;

        // sweep() always yields at least 2 points
        let mut best = &points[0];
        let mut fairest = &points[0];
        for p in &points[1..] {
            if p.accuracy > best.accuracy {
                best = p;
            }
            if p.demographic_parity_difference < fairest.demographic_parity_difference
                || (p.demographic_parity_difference == fairest.demographic_parity_difference
                    && p.accuracy > fairest.accuracy)
            {
                fairest = p;
            }
        }

        let (best_accuracy_threshold, best_accuracy) = (best.threshold, best.accuracy);
        let (fairest_threshold, fairest_dp) =
            (fairest.threshold, fairest.demographic_parity_difference);

        Ok(ThresholdCurve {
            points,
            best_accuracy_threshold,
            best_accuracy,
            fairest_threshold,
            fairest_dp,
            total_samples: y_true.len(),
        })
    }
}

/// Sweep thresholds with the default analyzer.
///
/// `thresholds = None` uses [`default_thresholds`]. The result holds one
/// record per threshold in ascending threshold order, ready for plotting.
pub fn plot_threshold_analysis<S: AsRef<str>>(
    y_true: &[i64],
    y_prob: &[f64],
    sensitive: &[S],
    thresholds: Option<&[f64]>,
) -> Result<Vec<ThresholdPoint>> {
    let analyzer = ThresholdAnalyzer {
        thresholds: thresholds.map(<[f64]>::to_vec),
        ..ThresholdAnalyzer::default()
    };
    analyzer.sweep(y_true, y_prob, sensitive)
}

// =============================================================================
// Display Helpers
// =============================================================================

/// Format threshold curve as ASCII table.
pub fn format_threshold_table(curve: &ThresholdCurve) -> String {
    let mut output = String::new();

    output.push_str("Threshold   Accuracy   Selected   DP diff   EO diff   AO diff\n");
    output.push_str("-------------------------------------------------------------\n");

    for point in &curve.points {
        output.push_str(&format!(
            "   {:.2}       {:5.1}%     {:5.1}%    {:.3}     {:.3}     {:.3}\n",
            point.threshold,
            point.accuracy * 100.0,
            point.selection_rate * 100.0,
            point.demographic_parity_difference,
            point.equal_opportunity_difference,
            point.average_odds_difference,
        ));
    }

    output.push_str("-------------------------------------------------------------\n");
    output.push_str(&format!(
        "Most accurate: threshold={:.2}, accuracy={:.1}%\n",
        curve.best_accuracy_threshold,
        curve.best_accuracy * 100.0,
    ));
    output.push_str(&format!(
        "Fairest: threshold={:.2}, DP diff={:.3}\n",
        curve.fairest_threshold, curve.fairest_dp,
    ));

    output
}

/// Interpret the accuracy/fairness trade-off.
pub fn interpret_curve(curve: &ThresholdCurve) -> Vec<String> {
    let mut insights = Vec::new();

    let cost = curve.fairness_cost();
    if curve.best_accuracy_threshold == curve.fairest_threshold || cost <= 0.0 {
        insights.push("No trade-off: the most accurate threshold is also the fairest".into());
    } else if cost < 0.02 {
        insights.push(format!(
            "Small trade-off: the fairest threshold costs {:.1} accuracy points",
            cost * 100.0
        ));
    } else {
        insights.push(format!(
            "Significant trade-off: the fairest threshold costs {:.1} accuracy points",
            cost * 100.0
        ));
    }

    if let Some(at_best) = curve
        .points
        .iter()
        .find(|p| p.threshold == curve.best_accuracy_threshold)
    {
        if at_best.demographic_parity_difference > 0.2 {
            insights.push(
                "Large disparity (DP diff > 0.2) at the most accurate threshold".into(),
            );
        }
    }

    if curve
        .points
        .iter()
        .all(|p| p.demographic_parity_difference <= 0.1)
    {
        insights.push("Demographic parity difference stays within 0.1 at every threshold".into());
    } else if curve.best_under_constraint(0.1).is_none() {
        insights.push("No threshold reaches a demographic parity difference of 0.1".into());
    }

    insights
}

// =============================================================================
// Tests
// =============================================================================
