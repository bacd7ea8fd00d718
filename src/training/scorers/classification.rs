//! Node and edge classification scoring.

use ndarray::ArrayView2;

use crate::error::ShapeError;
use crate::training::eval::ScoreFn;
use crate::training::metrics::{
    n_classes, Accuracy, F1Score, MetricFamily, MetricFn, MetricKind, PrecisionRecall, RocAuc,
    ScoreMap,
};

use super::{check_rows, collect_scores, LabeledPredictions};

/// Scores class predictions against class ids (or 0/1 label matrices when
/// `multilabel` is set).
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassificationScorer {
    pub multilabel: bool,
}

impl ClassificationScorer {
    pub fn new(multilabel: bool) -> Self {
        Self { multilabel }
    }

    fn validate(&self, input: &LabeledPredictions<'_>) -> Result<(), ShapeError> {
        check_rows(input)?;
        let n_columns = input.predictions.ncols();

        if self.multilabel {
            if input.labels.ncols() != n_columns {
                return Err(ShapeError::ColumnMismatch {
                    what: "multilabel labels",
                    expected: n_columns,
                    got: input.labels.ncols(),
                });
            }
            return Ok(());
        }

        if input.labels.ncols() != 1 {
            return Err(ShapeError::ColumnMismatch {
                what: "class labels",
                expected: 1,
                got: input.labels.ncols(),
            });
        }
        check_class_ids(input.labels, n_classes(input.predictions))
    }
}

/// Every label must be an integral class id below `n_classes`.
fn check_class_ids(labels: ArrayView2<f32>, n_classes: usize) -> Result<(), ShapeError> {
    for (row, &label) in labels.column(0).iter().enumerate() {
        let valid = label.is_finite()
            && label >= 0.0
            && label.fract() == 0.0
            && (label as usize) < n_classes;
        if !valid {
            return Err(ShapeError::LabelOutOfRange {
                row,
                label,
                n_classes,
            });
        }
    }
    Ok(())
}

impl ScoreFn for ClassificationScorer {
    type Input<'a> = LabeledPredictions<'a>;

    fn supports(&self, metric: MetricKind) -> bool {
        metric.family() == MetricFamily::Classification
    }

    fn compute_score(
        &self,
        input: LabeledPredictions<'_>,
        metrics: &[MetricKind],
    ) -> Result<ScoreMap, ShapeError> {
        self.validate(&input)?;
        let multilabel = self.multilabel;
        let (preds, labels) = (input.predictions, input.labels);

        Ok(collect_scores(metrics, |metric| {
            let value = match metric {
                MetricKind::Accuracy => Accuracy { multilabel }.compute(preds, labels),
                MetricKind::F1Score => F1Score { multilabel }.compute(preds, labels),
                MetricKind::PrecisionRecall => PrecisionRecall { multilabel }.compute(preds, labels),
                MetricKind::RocAuc => RocAuc { multilabel }.compute(preds, labels),
                _ => return None,
            };
            Some(value)
        }))
    }
}
