//! Task-specific scorers.
//!
//! Each scorer implements [`ScoreFn`](super::eval::ScoreFn) for one task
//! family:
//!
//! - [`ClassificationScorer`]: node and edge classification
//! - [`RegressionScorer`]: node and edge regression
//! - [`MrrScorer`]: link prediction ranked by MRR

mod classification;
mod link_prediction;
mod regression;

pub use classification::ClassificationScorer;
pub use link_prediction::MrrScorer;
pub use regression::RegressionScorer;

use ndarray::{ArrayView2, Axis};

use crate::error::ShapeError;

use super::metrics::{MetricKind, ScoreMap};

/// Predictions of one split with their labels.
///
/// `predictions` is `[n_samples, n_columns]`; `labels` is `[n_samples, 1]`
/// for class ids and single-target regression, or `[n_samples, n_columns]`
/// for multilabel and multi-target tasks.
#[derive(Debug, Clone, Copy)]
pub struct LabeledPredictions<'a> {
    pub predictions: ArrayView2<'a, f32>,
    pub labels: ArrayView2<'a, f32>,
}

impl<'a> LabeledPredictions<'a> {
    pub fn new(predictions: ArrayView2<'a, f32>, labels: ArrayView2<'a, f32>) -> Self {
        Self {
            predictions,
            labels,
        }
    }

    pub fn n_samples(&self) -> usize {
        self.predictions.nrows()
    }
}

/// First row of `values` holding a NaN or infinity.
fn first_non_finite_row(values: ArrayView2<f32>) -> Option<usize> {
    values
        .axis_iter(Axis(0))
        .position(|row| row.iter().any(|v| !v.is_finite()))
}

/// Fail with [`ShapeError::NonFinite`] if `values` holds a NaN or infinity.
fn check_finite(values: ArrayView2<f32>, what: &'static str) -> Result<(), ShapeError> {
    match first_non_finite_row(values) {
        Some(row) => Err(ShapeError::NonFinite { what, row }),
        None => Ok(()),
    }
}

/// Non-empty, finite predictions with one label row per prediction row.
fn check_rows(input: &LabeledPredictions<'_>) -> Result<(), ShapeError> {
    if input.n_samples() == 0 {
        return Err(ShapeError::Empty {
            what: "predictions",
        });
    }
    if input.predictions.ncols() == 0 {
        return Err(ShapeError::Empty {
            what: "prediction columns",
        });
    }
    if input.labels.nrows() != input.n_samples() {
        return Err(ShapeError::RowMismatch {
            what: "labels",
            predictions: input.n_samples(),
            labels: input.labels.nrows(),
        });
    }
    check_finite(input.predictions, "predictions")
}

/// Collect the scores `score` knows how to compute, in metric order.
fn collect_scores(metrics: &[MetricKind], score: impl Fn(MetricKind) -> Option<f64>) -> ScoreMap {
    metrics
        .iter()
        .filter_map(|&metric| score(metric).map(|value| (metric, value)))
        .collect()
}
