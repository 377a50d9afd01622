//! # afet
//!
//! Group-fairness metrics and decision-threshold analysis for binary
//! classifiers.
//!
//! - **Group metrics**: accuracy, precision, recall, F1, TPR, FPR and
//!   selection rate per group of a sensitive attribute
//! - **Fairness scores**: demographic parity, equal opportunity, average
//!   odds, disparate impact
//! - **Threshold sweeps**: how accuracy and fairness move as the decision
//!   threshold changes
//! - **Intersections and comparisons**: several attributes at once, several
//!   models side by side
//!
//! Results are plain serde-serializable data meant for dashboards, plots and
//! exporters; nothing here renders or persists anything.
//!
//! ## Quick Start
//!
//! ```rust
//! use afet::eval::{plot_threshold_analysis, FairnessMetrics};
//!
//! let y_true = [1, 1, 0, 0];
//! let y_pred = [1, 0, 0, 1];
//! let sensitive = ["A", "A", "B", "B"];
//!
//! let metrics = FairnessMetrics::new(&y_true, &y_pred, &sensitive)?;
//! assert_eq!(metrics.demographic_parity_difference(), 0.0);
//!
//! let y_prob = [0.9, 0.4, 0.3, 0.8];
//! let points = plot_threshold_analysis(&y_true, &y_prob, &sensitive, None)?;
//! assert_eq!(points.len(), 19);
//! # Ok::<(), afet::Error>(())
//! ```
//!
//! ## Errors
//!
//! Every fallible operation returns [`Result`]. Misaligned, empty or
//! out-of-range input is [`Error::InvalidInput`]; labels outside {0, 1} are
//! [`Error::UnsupportedLabel`]. A zero denominator in a rate is never an
//! error: the rate is reported as 0.0.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade. Install any logger to see
//! warnings about tiny groups or groups missing a class.

#![warn(missing_docs)]

mod error;
pub mod eval;

pub use error::{Error, Result};
pub use eval::{
    FairnessConfig, FairnessMetric, FairnessMetrics, FairnessReport, GapPolicy, GroupMetrics,
    ThresholdAnalyzer, ThresholdPoint,
};
