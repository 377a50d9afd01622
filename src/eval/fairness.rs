//! Group-fairness metrics for binary classifiers.
//!
//! Measures systematic disparities in how a classifier treats the groups of a
//! sensitive attribute (gender, ethnicity, age band, ...).
//!
//! # Key Metrics
//!
//! - **Demographic Parity Difference**: spread of P(pred=1 | group)
//! - **Equal Opportunity Difference**: spread of the true-positive rate
//! - **Average Odds Difference**: mean of the TPR spread and the FPR spread
//! - **Disparate Impact Ratio**: lowest selection rate over the highest
//!
//! How per-group rates become a single spread is controlled by
//! [`GapPolicy`]. The default, [`GapPolicy::MaxMinusMin`], compares the
//! best- and worst-treated groups; for two groups this is `|A - B|`.
//!
//! # Example
//!
//! ```rust
//! use afet::eval::FairnessMetrics;
//!
//! let y_true = [1, 1, 0, 0];
//! let y_pred = [1, 0, 0, 1];
//! let sensitive = ["A", "A", "B", "B"];
//!
//! let metrics = FairnessMetrics::new(&y_true, &y_pred, &sensitive).unwrap();
//! assert_eq!(metrics.accuracy(), 0.5);
//! assert_eq!(metrics.demographic_parity_difference(), 0.0);
//! ```

use super::config::FairnessConfig;
use super::confusion::ConfusionCounts;
use super::report::{FairnessReport, GroupMetrics, OverallMetrics};
use super::types::{FairnessMetric, GapPolicy, PerformanceMetric};
use crate::{Error, Result};
use std::collections::BTreeMap;

// =============================================================================
// Input validation
// =============================================================================

/// Check that an aligned input has the expected length.
pub(crate) fn check_aligned(expected: usize, actual: usize, what: &str) -> Result<()> {
    if expected != actual {
        return Err(Error::invalid_input(format!(
            "{} has length {}, expected {} (all inputs must be aligned)",
            what, actual, expected
        )));
    }
    Ok(())
}

/// Convert 0/1 integers to booleans, rejecting anything else.
pub(crate) fn binary_labels(values: &[i64], what: &str) -> Result<Vec<bool>> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| match v {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::unsupported_label(format!(
                "{}[{}] = {}; only binary labels {{0, 1}} are supported",
                what, i, other
            ))),
        })
        .collect()
}

// =============================================================================
// FairnessMetrics
// =============================================================================

/// Overall and per-group classification metrics over one sensitive attribute.
///
/// Construction tallies confusion counts once; every accessor afterwards is
/// a cheap read. Groups are kept in lexicographic order so reports are
/// deterministic.
#[derive(Debug, Clone)]
pub struct FairnessMetrics {
    overall: ConfusionCounts,
    groups: BTreeMap<String, ConfusionCounts>,
    policy: GapPolicy,
    min_group_size: usize,
}

impl FairnessMetrics {
    /// Build metrics from true labels, hard predictions and group identifiers.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if the inputs are empty or differ in length.
    /// - [`Error::UnsupportedLabel`] if a label or prediction is not 0 or 1.
    pub fn new<S: AsRef<str>>(y_true: &[i64], y_pred: &[i64], sensitive: &[S]) -> Result<Self> {
        check_inputs(y_true.len(), y_pred.len(), sensitive.len())?;
        let y_true = binary_labels(y_true, "y_true")?;
        let y_pred = binary_labels(y_pred, "y_pred")?;
        Ok(Self::tally(&y_true, &y_pred, sensitive))
    }

    /// Build metrics from already-binary labels and predictions.
    pub fn from_bools<S: AsRef<str>>(
        y_true: &[bool],
        y_pred: &[bool],
        sensitive: &[S],
    ) -> Result<Self> {
        check_inputs(y_true.len(), y_pred.len(), sensitive.len())?;
        Ok(Self::tally(y_true, y_pred, sensitive))
    }

    fn tally<S: AsRef<str>>(y_true: &[bool], y_pred: &[bool], sensitive: &[S]) -> Self {
        let mut overall = ConfusionCounts::default();
        let mut groups: BTreeMap<String, ConfusionCounts> = BTreeMap::new();

        for ((&actual, &predicted), group) in y_true.iter().zip(y_pred).zip(sensitive) {
            overall.record(actual, predicted);
            // Avoid allocating a key for every sample of a known group
            match groups.get_mut(group.as_ref()) {
                Some(counts) => counts.record(actual, predicted),
                None => {
                    let mut counts = ConfusionCounts::default();
                    counts.record(actual, predicted);
                    groups.insert(group.as_ref().to_string(), counts);
                }
            }
        }

        for (name, counts) in &groups {
            if counts.actual_positives() == 0 {
                log::debug!("group {:?} has no actual positives; TPR falls back to 0.0", name);
            }
            if counts.actual_negatives() == 0 {
                log::debug!("group {:?} has no actual negatives; FPR falls back to 0.0", name);
            }
        }

        Self {
            overall,
            groups,
            policy: GapPolicy::default(),
            min_group_size: 1,
        }
    }

    /// Use a different spread policy for the difference metrics.
    pub fn with_policy(mut self, policy: GapPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Exclude groups with fewer samples than `min` from the spreads.
    ///
    /// Excluded groups still appear in [`FairnessMetrics::by_group`].
    pub fn with_min_group_size(mut self, min: usize) -> Self {
        self.min_group_size = min.max(1);
        self
    }

    /// Apply the gap policy and minimum group size from a config record.
    pub fn with_config(self, config: &FairnessConfig) -> Self {
        self.with_policy(config.gap_policy)
            .with_min_group_size(config.min_group_size)
    }

    /// Spread policy in use.
    pub fn policy(&self) -> GapPolicy {
        self.policy
    }

    /// Minimum group size for the spreads.
    pub fn min_group_size(&self) -> usize {
        self.min_group_size
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.overall.total()
    }

    /// Always false: construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.overall.total() == 0
    }

    /// Confusion counts over the whole sample.
    pub fn confusion(&self) -> ConfusionCounts {
        self.overall
    }

    // -------------------------------------------------------------------------
    // Overall metrics
    // -------------------------------------------------------------------------

    /// Fraction of samples where prediction equals the true label.
    pub fn accuracy(&self) -> f64 {
        self.overall.accuracy().get()
    }

    /// TP / predicted positives; 0.0 when nothing is predicted positive.
    pub fn precision(&self) -> f64 {
        self.overall.precision().get()
    }

    /// TP / actual positives; 0.0 when there are no positives.
    pub fn recall(&self) -> f64 {
        self.overall.recall().get()
    }

    /// Harmonic mean of precision and recall; 0.0 when both are 0.
    pub fn f1_score(&self) -> f64 {
        self.overall.f1().get()
    }

    /// Overall positive-prediction rate.
    pub fn selection_rate(&self) -> f64 {
        self.overall.selection_rate().get()
    }

    /// Look up a standard classification metric by name.
    pub fn performance(&self, metric: PerformanceMetric) -> f64 {
        match metric {
            PerformanceMetric::Accuracy => self.accuracy(),
            PerformanceMetric::Precision => self.precision(),
            PerformanceMetric::Recall => self.recall(),
            PerformanceMetric::F1 => self.f1_score(),
        }
    }

    // -------------------------------------------------------------------------
    // Per-group metrics
    // -------------------------------------------------------------------------

    /// Distinct group identifiers, sorted.
    pub fn groups(&self) -> Vec<&str> {
        self.groups.keys().map(String::as_str).collect()
    }

    /// Metrics restricted to samples belonging to `group`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if no sample carries that group identifier.
    pub fn group_metrics(&self, group: &str) -> Result<GroupMetrics> {
        self.groups
            .get(group)
            .map(|counts| GroupMetrics::from_counts(group, *counts))
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "unknown group {:?}; known groups: {:?}",
                    group,
                    self.groups()
                ))
            })
    }

    /// Metrics for every group, in group order.
    pub fn by_group(&self) -> Vec<GroupMetrics> {
        self.groups
            .iter()
            .map(|(name, counts)| GroupMetrics::from_counts(name, *counts))
            .collect()
    }

    /// Groups large enough to take part in the spreads.
    fn eligible(&self) -> impl Iterator<Item = &ConfusionCounts> {
        let min = self.min_group_size;
        self.groups.values().filter(move |c| c.total() >= min)
    }

    /// Groups left out of the spreads by the minimum group size.
    pub fn excluded_groups(&self) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|(_, c)| c.total() < self.min_group_size)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    fn rates(&self, rate: impl Fn(&ConfusionCounts) -> f64) -> Vec<f64> {
        self.eligible().map(rate).collect()
    }

    // -------------------------------------------------------------------------
    // Fairness metrics
    // -------------------------------------------------------------------------

    /// Spread of the positive-prediction rate across groups. Never negative.
    pub fn demographic_parity_difference(&self) -> f64 {
        self.policy
            .spread(&self.rates(|c| c.selection_rate().get()))
    }

    /// Spread of the true-positive rate across groups. Never negative.
    ///
    /// A group without actual positives contributes a TPR of 0.0.
    pub fn equal_opportunity_difference(&self) -> f64 {
        self.policy
            .spread(&self.rates(|c| c.true_positive_rate().get()))
    }

    /// Mean of the TPR spread and the FPR spread across groups.
    pub fn average_odds_difference(&self) -> f64 {
        let fpr_gap = self
            .policy
            .spread(&self.rates(|c| c.false_positive_rate().get()));
        (self.equal_opportunity_difference() + fpr_gap) / 2.0
    }

    /// Lowest group selection rate divided by the highest.
    ///
    /// 1.0 means parity. Returns 1.0 when no group is predicted positive or
    /// fewer than two groups are eligible.
    pub fn disparate_impact_ratio(&self) -> f64 {
        let rates = self.rates(|c| c.selection_rate().get());
        if rates.len() < 2 {
            return 1.0;
        }
        let min = rates.iter().copied().fold(f64::INFINITY, f64::min);
        let max = rates.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max == 0.0 {
            1.0
        } else {
            min / max
        }
    }

    /// Look up a fairness metric by name.
    pub fn metric(&self, metric: FairnessMetric) -> f64 {
        match metric {
            FairnessMetric::DemographicParityDifference => self.demographic_parity_difference(),
            FairnessMetric::EqualOpportunityDifference => self.equal_opportunity_difference(),
            FairnessMetric::AverageOddsDifference => self.average_odds_difference(),
            FairnessMetric::DisparateImpactRatio => self.disparate_impact_ratio(),
        }
    }

    /// Assemble the full report: overall metrics, group table and scores.
    pub fn fairness_report(&self) -> FairnessReport {
        let mut warnings = Vec::new();

        for (name, counts) in &self.groups {
            if counts.total() < self.min_group_size {
                log::warn!(
                    "group {:?} has {} samples (< {}); excluded from fairness spreads",
                    name,
                    counts.total(),
                    self.min_group_size
                );
                warnings.push(format!(
                    "Group '{}' has only {} samples and was excluded",
                    name,
                    counts.total()
                ));
            }
            if counts.actual_positives() == 0 {
                log::warn!("group {:?} has no actual positives; TPR reported as 0.0", name);
                warnings.push(format!("Group '{}' has no actual positives", name));
            }
            if counts.actual_negatives() == 0 {
                log::warn!("group {:?} has no actual negatives; FPR reported as 0.0", name);
                warnings.push(format!("Group '{}' has no actual negatives", name));
            }
        }
        if self.groups.len() < 2 {
            warnings.push("Fewer than two groups; all disparities are trivially 0".into());
        }

        log::debug!(
            "fairness report: n={}, groups={}, policy={}",
            self.len(),
            self.groups.len(),
            self.policy
        );

        FairnessReport {
            n_samples: self.len(),
            gap_policy: self.policy,
            overall: OverallMetrics::from_counts(self.overall),
            groups: self.by_group(),
            demographic_parity_difference: self.demographic_parity_difference(),
            equal_opportunity_difference: self.equal_opportunity_difference(),
            average_odds_difference: self.average_odds_difference(),
            disparate_impact_ratio: self.disparate_impact_ratio(),
            excluded_groups: self.excluded_groups().into_iter().map(String::from).collect(),
            warnings,
        }
    }
}

fn check_inputs(n_true: usize, n_pred: usize, n_sensitive: usize) -> Result<()> {
    if n_true == 0 {
        return Err(Error::invalid_input("inputs must not be empty"));
    }
    check_aligned(n_true, n_pred, "y_pred")?;
    check_aligned(n_true, n_sensitive, "sensitive_features")?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_accuracy_exact_match_fraction() {
        let m = FairnessMetrics::new(&[1, 0, 1, 1], &[1, 0, 0, 1], &["x", "x", "y", "y"]).unwrap();
        assert!(approx(m.accuracy(), 0.75));
        assert!(approx(m.precision(), 1.0));
        assert!(approx(m.recall(), 2.0 / 3.0));
        assert!(approx(m.f1_score(), 0.8));
    }

    #[test]
    fn test_two_group_example() {
        let m = FairnessMetrics::new(&[1, 1, 0, 0], &[1, 0, 0, 1], &["A", "A", "B", "B"]).unwrap();
        let a = m.group_metrics("A").unwrap();
        let b = m.group_metrics("B").unwrap();
        assert!(approx(a.accuracy.get(), 0.5));
        assert!(approx(b.accuracy.get(), 0.5));
        assert!(approx(m.demographic_parity_difference(), 0.0));
        // A: TPR 0.5, no negatives. B: no positives, FPR 0.5.
        assert!(approx(m.equal_opportunity_difference(), 0.5));
        assert!(approx(m.average_odds_difference(), 0.5));
    }

    #[test]
    fn test_group_without_negatives_has_zero_fpr() {
        let m = FairnessMetrics::new(&[1, 1, 0], &[1, 1, 1], &["A", "A", "B"]).unwrap();
        let a = m.group_metrics("A").unwrap();
        assert_eq!(a.false_positive_rate.get(), 0.0);
        assert_eq!(a.true_positive_rate.get(), 1.0);
    }

    #[test]
    fn test_length_mismatch() {
        let err = FairnessMetrics::new(&[1, 0, 1, 1], &[1, 0, 1, 1], &["A", "A", "B"]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_empty_input() {
        let empty: [&str; 0] = [];
        let err = FairnessMetrics::new(&[], &[], &empty).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_non_binary_labels() {
        let err = FairnessMetrics::new(&[0, 2, 1], &[0, 1, 1], &["A", "B", "B"]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLabel(_)));
        let err = FairnessMetrics::new(&[0, 1, 1], &[0, -1, 1], &["A", "B", "B"]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLabel(_)));
    }

    #[test]
    fn test_unknown_group() {
        let m = FairnessMetrics::new(&[1, 0], &[1, 0], &["A", "B"]).unwrap();
        assert!(matches!(m.group_metrics("C"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_three_groups_extremes() {
        // Selection rates: A = 1.0, B = 0.5, C = 0.0
        let y_true = [1, 0, 1, 0, 1, 0];
        let y_pred = [1, 1, 1, 0, 0, 0];
        let groups = ["A", "A", "B", "B", "C", "C"];
        let m = FairnessMetrics::new(&y_true, &y_pred, &groups).unwrap();
        assert!(approx(m.demographic_parity_difference(), 1.0));

        let pairwise = m.clone().with_policy(GapPolicy::MeanPairwise);
        // (0.5 + 1.0 + 0.5) / 3
        assert!(approx(pairwise.demographic_parity_difference(), 2.0 / 3.0));
        assert!(approx(m.disparate_impact_ratio(), 0.0));
    }

    #[test]
    fn test_min_group_size_excludes_small_groups() {
        let y_true = [1, 0, 1, 0, 1];
        let y_pred = [1, 0, 1, 0, 0];
        let groups = ["A", "A", "B", "B", "C"];
        let m = FairnessMetrics::new(&y_true, &y_pred, &groups)
            .unwrap()
            .with_min_group_size(2);
        assert_eq!(m.excluded_groups(), vec!["C"]);
        assert!(approx(m.demographic_parity_difference(), 0.0));
        assert_eq!(m.by_group().len(), 3);
    }

    #[test]
    fn test_metric_dispatch_matches_methods() {
        let m = FairnessMetrics::new(&[1, 0, 1, 0], &[1, 1, 0, 0], &["A", "A", "B", "B"]).unwrap();
        assert_eq!(
            m.metric(FairnessMetric::DemographicParityDifference),
            m.demographic_parity_difference()
        );
        assert_eq!(
            m.metric(FairnessMetric::AverageOddsDifference),
            m.average_odds_difference()
        );
        assert_eq!(m.performance(PerformanceMetric::F1), m.f1_score());
    }

    #[test]
    fn test_report_warnings() {
        let m = FairnessMetrics::new(&[1, 1], &[1, 0], &["A", "A"]).unwrap();
        let report = m.fairness_report();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.demographic_parity_difference, 0.0);
        assert!(report.warnings.iter().any(|w| w.contains("no actual negatives")));
        assert!(report.warnings.iter().any(|w| w.contains("Fewer than two groups")));
    }
}
