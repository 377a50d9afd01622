//! Invariant tests for the fairness metrics.
//!
//! These pin down the documented behavior on small hand-checked inputs:
//! zero-division fallbacks, sign conventions, error kinds and the worked
//! threshold example.

use afet::eval::{
    plot_threshold_analysis, FairnessMetric, FairnessMetrics, GapPolicy, ThresholdAnalyzer,
};
use afet::Error;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// accuracy() is the exact-match fraction
#[test]
fn test_accuracy_is_match_fraction() {
    let m = FairnessMetrics::new(&[1, 0, 1, 1], &[1, 0, 0, 1], &["a", "b", "a", "b"]).unwrap();
    assert!(approx(m.accuracy(), 0.75));
}

/// Worked example: y_prob thresholded at 0.5
#[test]
fn test_worked_threshold_example() {
    let y_true = [1, 1, 0, 0];
    let y_prob = [0.9, 0.4, 0.3, 0.8];
    let sensitive = ["A", "A", "B", "B"];

    let y_pred: Vec<i64> = y_prob.iter().map(|&p| i64::from(p >= 0.5)).collect();
    assert_eq!(y_pred, vec![1, 0, 0, 1]);

    let m = FairnessMetrics::new(&y_true, &y_pred, &sensitive).unwrap();
    assert!(approx(m.group_metrics("A").unwrap().accuracy.get(), 0.5));
    assert!(approx(m.group_metrics("B").unwrap().accuracy.get(), 0.5));
    assert!(approx(m.demographic_parity_difference(), 0.0));

    let points = plot_threshold_analysis(&y_true, &y_prob, &sensitive, None).unwrap();
    let at_half = points
        .iter()
        .find(|p| approx(p.threshold, 0.5))
        .expect("0.5 is in the default sweep");
    assert!(approx(at_half.accuracy, m.accuracy()));
    assert!(approx(at_half.demographic_parity_difference, 0.0));
}

/// Equal positive rates across groups give zero demographic parity difference
#[test]
fn test_equal_positive_rates_zero_dp() {
    let y_true = [1, 0, 0, 1, 0, 1, 1, 0, 0];
    let y_pred = [1, 0, 0, 0, 1, 0, 0, 0, 1];
    let groups = ["x", "x", "x", "y", "y", "y", "z", "z", "z"];
    let m = FairnessMetrics::new(&y_true, &y_pred, &groups).unwrap();
    assert_eq!(m.demographic_parity_difference(), 0.0);
    assert_eq!(m.disparate_impact_ratio(), 1.0);
    assert_eq!(
        m.clone()
            .with_policy(GapPolicy::MeanPairwise)
            .demographic_parity_difference(),
        0.0
    );
}

/// A group with zero actual negatives reports FPR 0.0 rather than failing
#[test]
fn test_fpr_without_negatives() {
    let m = FairnessMetrics::new(&[1, 1, 1, 0], &[0, 1, 1, 1], &["A", "A", "A", "B"]).unwrap();
    let a = m.group_metrics("A").unwrap();
    assert_eq!(a.false_positive_rate.get(), 0.0);
    assert!(approx(a.true_positive_rate.get(), 2.0 / 3.0));
}

/// Nothing predicted positive: precision and F1 fall back to 0.0
#[test]
fn test_precision_without_predicted_positives() {
    let m = FairnessMetrics::new(&[1, 0, 1], &[0, 0, 0], &["A", "B", "B"]).unwrap();
    assert_eq!(m.precision(), 0.0);
    assert_eq!(m.f1_score(), 0.0);
    assert_eq!(m.recall(), 0.0);
}

#[test]
fn test_mismatched_lengths_are_invalid_input() {
    let err = FairnessMetrics::new(&[1, 0, 1, 0], &[1, 0, 1, 0], &["A", "B", "A"]).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = FairnessMetrics::new(&[1, 0, 1, 0], &[1, 0, 1], &["A", "B", "A", "B"]).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = plot_threshold_analysis(&[1, 0, 1, 0], &[0.1, 0.2, 0.3], &["A", "B", "A", "B"], None)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[test]
fn test_non_binary_labels_are_unsupported() {
    let err = FairnessMetrics::new(&[0, 1, 3], &[0, 1, 1], &["A", "A", "B"]).unwrap_err();
    assert!(matches!(err, Error::UnsupportedLabel(_)));
    assert!(err.to_string().contains("y_true[2] = 3"));

    let err = plot_threshold_analysis(&[0, 1, 3], &[0.1, 0.5, 0.9], &["A", "A", "B"], None)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedLabel(_)));
}

/// Average odds is the mean of the TPR spread and the FPR spread
#[test]
fn test_average_odds_definition() {
    // A: TPR 1.0, FPR 0.5   B: TPR 0.5, FPR 0.0
    let y_true = [1, 1, 0, 0, 1, 1, 0, 0];
    let y_pred = [1, 1, 1, 0, 1, 0, 0, 0];
    let groups = ["A", "A", "A", "A", "B", "B", "B", "B"];
    let m = FairnessMetrics::new(&y_true, &y_pred, &groups).unwrap();
    assert!(approx(m.equal_opportunity_difference(), 0.5));
    assert!(approx(m.average_odds_difference(), 0.5));
    // Selection: A 0.75, B 0.25
    assert!(approx(m.demographic_parity_difference(), 0.5));
    assert!(approx(m.disparate_impact_ratio(), 1.0 / 3.0));
}

/// With three groups the default compares extremes, not pair averages
#[test]
fn test_extremes_policy_for_many_groups() {
    // Selection: a 0.0, b 0.5, c 0.5, d 1.0
    let y_pred = [0, 0, 1, 0, 0, 1, 1, 1];
    let y_true = [0, 0, 0, 0, 0, 0, 0, 0];
    let groups = ["a", "a", "b", "b", "c", "c", "d", "d"];
    let m = FairnessMetrics::new(&y_true, &y_pred, &groups).unwrap();
    assert!(approx(m.demographic_parity_difference(), 1.0));

    // Pairs: ab .5, ac .5, ad 1, bc 0, bd .5, cd .5 -> 3.0 / 6
    let pairwise = m.with_policy(GapPolicy::MeanPairwise);
    assert!(approx(pairwise.demographic_parity_difference(), 0.5));
}

#[test]
fn test_named_metric_lookup() {
    let m = FairnessMetrics::new(&[1, 0, 1, 0], &[1, 1, 0, 0], &["A", "A", "B", "B"]).unwrap();
    for metric in FairnessMetric::ALL {
        let by_name: FairnessMetric = metric.name().parse().unwrap();
        assert_eq!(m.metric(by_name), m.metric(metric));
    }
}

/// Constant probabilities flip every prediction at the same threshold
#[test]
fn test_constant_probabilities_flip_at_once() {
    let y_true = [1, 0, 1, 0, 1, 0];
    let y_prob = [0.5; 6];
    let groups = ["A", "B", "C", "A", "B", "C"];
    let points = ThresholdAnalyzer::new()
        .sweep(&y_true, &y_prob, &groups)
        .unwrap();
    for p in &points {
        let expected = if p.threshold <= 0.5 { 1.0 } else { 0.0 };
        assert_eq!(p.selection_rate, expected, "threshold {}", p.threshold);
        assert_eq!(p.demographic_parity_difference, 0.0);
        assert!(approx(p.accuracy, 0.5));
    }
}
