//! Fairness evaluation framework.
//!
//! # Overview
//!
//! - [`FairnessMetrics`]: overall and per-group classification metrics plus
//!   difference-based fairness scores over one sensitive attribute
//! - [`threshold_analysis`]: decision-threshold sweeps trading accuracy
//!   against fairness
//! - [`IntersectionalFairnessMetrics`]: the same scores over combinations of
//!   several sensitive attributes
//! - [`ModelComparator`]: several models scored on the same data
//!
//! # Metrics
//!
//! | Metric | Definition | Fair value |
//! |--------|------------|------------|
//! | Demographic parity difference | spread of P(pred=1 \| group) | 0 |
//! | Equal opportunity difference | spread of TPR | 0 |
//! | Average odds difference | (TPR spread + FPR spread) / 2 | 0 |
//! | Disparate impact ratio | min / max selection rate | 1 |
//!
//! "Spread" is defined by [`GapPolicy`]: max minus min by default, or the
//! mean absolute pairwise difference.
//!
//! # Example
//!
//! ```rust
//! use afet::eval::{FairnessMetrics, ThresholdAnalyzer};
//!
//! let y_true = [1, 0, 1, 1];
//! let y_pred = [1, 0, 0, 1];
//! let sex = ["Male", "Female", "Female", "Male"];
//!
//! let metrics = FairnessMetrics::new(&y_true, &y_pred, &sex).unwrap();
//! assert_eq!(metrics.accuracy(), 0.75);
//! println!("{}", metrics.fairness_report());
//!
//! let y_prob = [0.9, 0.2, 0.45, 0.7];
//! let curve = ThresholdAnalyzer::new().analyze(&y_true, &y_prob, &sex).unwrap();
//! println!("most accurate threshold: {:.2}", curve.best_accuracy_threshold);
//! ```

pub mod comparison;
pub mod config;
pub mod confusion;
pub mod fairness;
pub mod intersectional;
pub mod report;
pub mod threshold_analysis;
pub mod types;

pub use comparison::{ComparisonRow, ComparisonTable, ModelComparator};
pub use config::FairnessConfig;
pub use confusion::ConfusionCounts;
pub use fairness::FairnessMetrics;
pub use intersectional::{AttributeReport, IntersectionalFairnessMetrics, IntersectionalReport};
pub use report::{FairnessReport, GroupMetrics, OverallMetrics};
pub use threshold_analysis::{
    default_thresholds, plot_threshold_analysis, ThresholdAnalyzer, ThresholdCurve, ThresholdPoint,
};
pub use types::{FairnessMetric, GapPolicy, MetricValue, PerformanceMetric};
