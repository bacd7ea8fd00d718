//! Node and edge regression scoring.

use crate::error::ShapeError;
use crate::training::eval::ScoreFn;
use crate::training::metrics::{Mae, MetricFamily, MetricFn, MetricKind, Mse, Rmse, ScoreMap};

use super::{check_finite, check_rows, collect_scores, LabeledPredictions};

/// Scores real-valued predictions against targets of the same shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionScorer;

impl ScoreFn for RegressionScorer {
    type Input<'a> = LabeledPredictions<'a>;

    fn supports(&self, metric: MetricKind) -> bool {
        metric.family() == MetricFamily::Regression
    }

    fn compute_score(
        &self,
        input: LabeledPredictions<'_>,
        metrics: &[MetricKind],
    ) -> Result<ScoreMap, ShapeError> {
        check_rows(&input)?;
        if input.labels.ncols() != input.predictions.ncols() {
            return Err(ShapeError::ColumnMismatch {
                what: "regression targets",
                expected: input.predictions.ncols(),
                got: input.labels.ncols(),
            });
        }
        check_finite(input.labels, "regression targets")?;

        let (preds, labels) = (input.predictions, input.labels);
        Ok(collect_scores(metrics, |metric| match metric {
            MetricKind::Rmse => Some(Rmse.compute(preds, labels)),
            MetricKind::Mse => Some(Mse.compute(preds, labels)),
            MetricKind::Mae => Some(Mae.compute(preds, labels)),
            _ => None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn rmse_and_mse() {
        let preds = array![[1.0f32], [3.0]];
        let labels = array![[2.0f32], [1.0]];
        let scores = RegressionScorer
            .compute_score(
                LabeledPredictions::new(preds.view(), labels.view()),
                &[MetricKind::Mse, MetricKind::Rmse],
            )
            .unwrap();
        assert_abs_diff_eq!(scores[MetricKind::Mse], 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(scores[MetricKind::Rmse], 2.5f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn target_width_must_match() {
        let preds = array![[1.0f32, 2.0]];
        let labels = array![[2.0f32]];
        assert!(matches!(
            RegressionScorer.compute_score(
                LabeledPredictions::new(preds.view(), labels.view()),
                &[MetricKind::Rmse]
            ),
            Err(ShapeError::ColumnMismatch { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn non_finite_values_fail_before_scoring() {
        let preds = array![[f32::NAN], [2.0]];
        let labels = array![[1.0f32], [2.0]];
        assert_eq!(
            RegressionScorer
                .compute_score(
                    LabeledPredictions::new(preds.view(), labels.view()),
                    &[MetricKind::Rmse]
                )
                .unwrap_err(),
            ShapeError::NonFinite {
                what: "predictions",
                row: 0
            }
        );

        let preds = array![[1.0f32], [2.0]];
        let labels = array![[1.0f32], [f32::NEG_INFINITY]];
        assert_eq!(
            RegressionScorer
                .compute_score(
                    LabeledPredictions::new(preds.view(), labels.view()),
                    &[MetricKind::Mse]
                )
                .unwrap_err(),
            ShapeError::NonFinite {
                what: "regression targets",
                row: 1
            }
        );
    }
}
