//! Property tests for the fairness metrics and the threshold sweep.
//!
//! Invariants that should hold for every valid input, not just the
//! hand-picked cases.

use afet::eval::{
    plot_threshold_analysis, FairnessMetrics, GapPolicy, IntersectionalFairnessMetrics,
};
use proptest::prelude::*;

/// Aligned (labels, predictions, probabilities, groups) of the same length.
fn aligned_samples() -> impl Strategy<Value = (Vec<i64>, Vec<i64>, Vec<f64>, Vec<String>)> {
    (1usize..60).prop_flat_map(|n| {
        (
            prop::collection::vec(0i64..=1, n),
            prop::collection::vec(0i64..=1, n),
            prop::collection::vec(0.0f64..=1.0, n),
            prop::collection::vec(prop::sample::select(vec!["A", "B", "C", "D"]), n)
                .prop_map(|v| v.into_iter().map(String::from).collect()),
        )
    })
}

proptest! {
    #[test]
    fn test_differences_non_negative((y_true, y_pred, _, groups) in aligned_samples()) {
        let m = FairnessMetrics::new(&y_true, &y_pred, &groups).unwrap();
        for policy in [GapPolicy::MaxMinusMin, GapPolicy::MeanPairwise] {
            let m = m.clone().with_policy(policy);
            prop_assert!(m.demographic_parity_difference() >= 0.0);
            prop_assert!(m.equal_opportunity_difference() >= 0.0);
            prop_assert!(m.average_odds_difference() >= 0.0);
            prop_assert!(m.demographic_parity_difference() <= 1.0);
        }
    }

    #[test]
    fn test_pairwise_never_exceeds_extremes((y_true, y_pred, _, groups) in aligned_samples()) {
        let extremes = FairnessMetrics::new(&y_true, &y_pred, &groups).unwrap();
        let pairwise = extremes.clone().with_policy(GapPolicy::MeanPairwise);
        prop_assert!(
            pairwise.demographic_parity_difference()
                <= extremes.demographic_parity_difference() + 1e-12
        );
        prop_assert!(
            pairwise.equal_opportunity_difference()
                <= extremes.equal_opportunity_difference() + 1e-12
        );
    }

    #[test]
    fn test_metrics_bounded((y_true, y_pred, _, groups) in aligned_samples()) {
        let m = FairnessMetrics::new(&y_true, &y_pred, &groups).unwrap();
        for v in [m.accuracy(), m.precision(), m.recall(), m.f1_score(), m.disparate_impact_ratio()] {
            prop_assert!((0.0..=1.0).contains(&v), "metric out of bounds: {}", v);
        }
        let total: usize = m.by_group().iter().map(|g| g.count).sum();
        prop_assert_eq!(total, y_true.len());
    }

    #[test]
    fn test_accuracy_matches_direct_count((y_true, y_pred, _, groups) in aligned_samples()) {
        let m = FairnessMetrics::new(&y_true, &y_pred, &groups).unwrap();
        let matches = y_true.iter().zip(&y_pred).filter(|(a, b)| a == b).count();
        let expected = matches as f64 / y_true.len() as f64;
        prop_assert!((m.accuracy() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_selection_rate_non_increasing((y_true, _, y_prob, groups) in aligned_samples()) {
        let points = plot_threshold_analysis(&y_true, &y_prob, &groups, None).unwrap();
        prop_assert_eq!(points.len(), 19);
        for pair in points.windows(2) {
            prop_assert!(pair[0].threshold < pair[1].threshold);
            prop_assert!(pair[0].selection_rate >= pair[1].selection_rate);
        }
    }

    #[test]
    fn test_sweep_matches_direct_metrics(
        (y_true, _, y_prob, groups) in aligned_samples(),
        t in 0.0f64..=1.0,
    ) {
        let other = if t < 0.5 { t + 0.25 } else { t - 0.25 };
        let points = plot_threshold_analysis(&y_true, &y_prob, &groups, Some(&[t, other][..])).unwrap();
        let at_t = points.iter().find(|p| p.threshold == t).unwrap();

        let y_pred: Vec<i64> = y_prob.iter().map(|&p| i64::from(p >= t)).collect();
        let m = FairnessMetrics::new(&y_true, &y_pred, &groups).unwrap();
        prop_assert_eq!(at_t.accuracy, m.accuracy());
        prop_assert_eq!(at_t.demographic_parity_difference, m.demographic_parity_difference());
        prop_assert_eq!(at_t.equal_opportunity_difference, m.equal_opportunity_difference());
        prop_assert_eq!(at_t.average_odds_difference, m.average_odds_difference());
    }

    #[test]
    fn test_single_attribute_intersection_is_identity((y_true, y_pred, _, groups) in aligned_samples()) {
        let plain = FairnessMetrics::new(&y_true, &y_pred, &groups).unwrap();
        let inter = IntersectionalFairnessMetrics::new(
            &y_true,
            &y_pred,
            &[("group", &groups[..])],
        )
        .unwrap();
        prop_assert_eq!(inter.combined().groups(), plain.groups());
        prop_assert_eq!(
            inter.combined().demographic_parity_difference(),
            plain.demographic_parity_difference()
        );
    }
}
