//! Binary confusion counts and the rates derived from them.
//!
//! Every rate uses the same zero-division policy: an empty denominator
//! yields 0.0 instead of an error.

use super::types::MetricValue;
use serde::{Deserialize, Serialize};

/// Confusion counts for a binary classifier over some subset of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    /// Predicted 1, actual 1
    pub true_positives: usize,
    /// Predicted 1, actual 0
    pub false_positives: usize,
    /// Predicted 0, actual 0
    pub true_negatives: usize,
    /// Predicted 0, actual 1
    pub false_negatives: usize,
}

impl ConfusionCounts {
    /// Tally counts from aligned label/prediction pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (bool, bool)>,
    {
        let mut counts = Self::default();
        for (actual, predicted) in pairs {
            counts.record(actual, predicted);
        }
        counts
    }

    /// Add one sample.
    #[inline]
    pub fn record(&mut self, actual: bool, predicted: bool) {
        match (actual, predicted) {
            (true, true) => self.true_positives += 1,
            (false, true) => self.false_positives += 1,
            (false, false) => self.true_negatives += 1,
            (true, false) => self.false_negatives += 1,
        }
    }

    /// Number of samples counted.
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Samples whose true label is 1.
    pub fn actual_positives(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    /// Samples whose true label is 0.
    pub fn actual_negatives(&self) -> usize {
        self.false_positives + self.true_negatives
    }

    /// Samples predicted as 1.
    pub fn predicted_positives(&self) -> usize {
        self.true_positives + self.false_positives
    }

    /// Fraction of exact matches.
    pub fn accuracy(&self) -> MetricValue {
        MetricValue::ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// TP / (TP + FP).
    pub fn precision(&self) -> MetricValue {
        MetricValue::ratio(self.true_positives, self.predicted_positives())
    }

    /// TP / (TP + FN). Same as the true-positive rate.
    pub fn recall(&self) -> MetricValue {
        MetricValue::ratio(self.true_positives, self.actual_positives())
    }

    /// Harmonic mean of precision and recall.
    pub fn f1(&self) -> MetricValue {
        let p = self.precision().get();
        let r = self.recall().get();
        if p + r == 0.0 {
            MetricValue::default()
        } else {
            MetricValue::new(2.0 * p * r / (p + r))
        }
    }

    /// True-positive rate (recall).
    pub fn true_positive_rate(&self) -> MetricValue {
        self.recall()
    }

    /// FP / actual negatives; 0.0 when there are no negatives.
    pub fn false_positive_rate(&self) -> MetricValue {
        MetricValue::ratio(self.false_positives, self.actual_negatives())
    }

    /// Positive-prediction rate, P(pred = 1).
    pub fn selection_rate(&self) -> MetricValue {
        MetricValue::ratio(self.predicted_positives(), self.total())
    }
}
