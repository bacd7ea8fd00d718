//! Testing utilities for gnn-eval.
//!
//! Deterministic data generators, a scripted scorer standing in for real
//! predictions and a tracker that records every event it receives. Used by
//! unit tests, integration tests and benches.
//!
//! ```
//! use gnn_eval::testing::{ScriptedScorer, DEFAULT_TOLERANCE_F64};
//! use gnn_eval::training::{EarlyStopConfig, EvalFrequency, Evaluator, MetricKind};
//!
//! let scorer = ScriptedScorer::from_values(MetricKind::Accuracy, &[0.7, 0.65]);
//! let mut evaluator = Evaluator::with_parts(
//!     scorer,
//!     vec![MetricKind::Accuracy],
//!     EvalFrequency(100),
//!     EarlyStopConfig::default(),
//! )
//! .unwrap();
//! let (val, test) = evaluator.evaluate(Some(()), Some(()), 100).unwrap();
//! assert!((val[MetricKind::Accuracy] - 0.7).abs() < DEFAULT_TOLERANCE_F64);
//! assert!((test[MetricKind::Accuracy] - 0.65).abs() < DEFAULT_TOLERANCE_F64);
//! ```

pub mod data;
mod scripted;

pub use scripted::{RecordingTracker, ScriptedScorer, TrackerEvent};

use crate::training::ScoreMap;

/// Default tolerance for score comparisons.
pub const DEFAULT_TOLERANCE_F64: f64 = 1e-7;

/// Assert that two score maps hold the same metrics, in the same order, with
/// values within `tolerance`.
///
/// # Panics
///
/// Panics with the first differing metric.
pub fn assert_scores_eq(actual: &ScoreMap, expected: &ScoreMap, tolerance: f64) {
    let actual_keys: Vec<_> = actual.iter().map(|(m, _)| m).collect();
    let expected_keys: Vec<_> = expected.iter().map(|(m, _)| m).collect();
    assert_eq!(actual_keys, expected_keys, "score maps hold different metrics");

    for ((metric, a), (_, e)) in actual.iter().zip(expected.iter()) {
        assert!(
            (a - e).abs() <= tolerance,
            "{}: {} != {} (tolerance {})",
            metric,
            a,
            e,
            tolerance
        );
    }
}
