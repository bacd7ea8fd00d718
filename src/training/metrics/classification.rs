//! Classification metrics.
//!
//! Predictions are class scores or probabilities with shape
//! `[n_samples, n_classes]`. A single prediction column is read as the
//! probability of the positive class of a binary task.
//!
//! Labels are either class ids with shape `[n_samples, 1]` or, for multilabel
//! tasks, a 0/1 matrix with the same shape as the predictions.

use ndarray::{ArrayView1, ArrayView2, Axis};

use super::{Direction, MetricFn};

/// Threshold turning a probability into a positive decision.
const DECISION_THRESHOLD: f32 = 0.5;

// =============================================================================
// Shared helpers
// =============================================================================

/// Number of classes implied by a prediction matrix.
#[inline]
pub(crate) fn n_classes(predictions: ArrayView2<f32>) -> usize {
    predictions.ncols().max(2)
}

/// Predicted class for one row: threshold for a single column, argmax otherwise.
#[inline]
fn predicted_class(row: ArrayView1<f32>) -> usize {
    if row.len() == 1 {
        return usize::from(row[0] >= DECISION_THRESHOLD);
    }
    let mut best = 0;
    for (idx, &value) in row.iter().enumerate().skip(1) {
        if value > row[best] {
            best = idx;
        }
    }
    best
}

#[inline]
fn is_positive(label: f32) -> bool {
    label > 0.5
}

/// Split a classification problem into binary (scores, labels) columns.
///
/// Binary tasks yield one column (the positive class), multiclass tasks one
/// column per class, multilabel tasks one column per label.
fn one_vs_rest(
    predictions: ArrayView2<f32>,
    labels: ArrayView2<f32>,
    multilabel: bool,
) -> Vec<(Vec<f32>, Vec<bool>)> {
    if multilabel {
        return (0..predictions.ncols())
            .map(|c| {
                let scores = predictions.column(c).to_vec();
                let truth = labels.column(c).iter().map(|&l| is_positive(l)).collect();
                (scores, truth)
            })
            .collect();
    }

    let class_ids = labels.column(0);
    match predictions.ncols() {
        1 | 2 => {
            let positive_col = predictions.ncols() - 1;
            let scores = predictions.column(positive_col).to_vec();
            let truth = class_ids.iter().map(|&l| l as usize == 1).collect();
            vec![(scores, truth)]
        }
        n => (0..n)
            .map(|c| {
                let scores = predictions.column(c).to_vec();
                let truth = class_ids.iter().map(|&l| l as usize == c).collect();
                (scores, truth)
            })
            .collect(),
    }
}

/// Mean of the defined per-column values, or `fallback` when none is defined.
fn macro_average(values: impl Iterator<Item = Option<f64>>, fallback: f64) -> f64 {
    let (sum, count) = values
        .flatten()
        .fold((0.0f64, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { fallback } else { sum / count as f64 }
}

// =============================================================================
// Accuracy
// =============================================================================

/// Fraction of correct predictions.
///
/// Single-label: argmax (or 0.5 threshold for one column) against the class id.
/// Multilabel: element-wise thresholded match over all labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy {
    pub multilabel: bool,
}

impl MetricFn for Accuracy {
    fn compute(&self, predictions: ArrayView2<f32>, labels: ArrayView2<f32>) -> f64 {
        if self.multilabel {
            let total = predictions.len();
            let correct = predictions
                .iter()
                .zip(labels.iter())
                .filter(|(&p, &l)| (p >= DECISION_THRESHOLD) == is_positive(l))
                .count();
            return correct as f64 / total as f64;
        }

        let n_rows = predictions.nrows();
        let correct = predictions
            .axis_iter(Axis(0))
            .zip(labels.column(0).iter())
            .filter(|(row, &label)| predicted_class(*row) == label as usize)
            .count();
        correct as f64 / n_rows as f64
    }

    fn direction(&self) -> Direction {
        Direction::HigherBetter
    }

    fn name(&self) -> &'static str {
        "accuracy"
    }
}

// =============================================================================
// F1 Score
// =============================================================================

/// Macro-averaged F1 score.
///
/// Classes (or labels) that appear neither in the predictions nor in the
/// ground truth are left out of the average.
#[derive(Debug, Clone, Copy, Default)]
pub struct F1Score {
    pub multilabel: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct Confusion {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl Confusion {
    fn f1(self) -> Option<f64> {
        let denom = 2 * self.tp + self.fp + self.fn_;
        (denom > 0).then(|| 2.0 * self.tp as f64 / denom as f64)
    }
}

impl MetricFn for F1Score {
    fn compute(&self, predictions: ArrayView2<f32>, labels: ArrayView2<f32>) -> f64 {
        let mut confusion = if self.multilabel {
            vec![Confusion::default(); predictions.ncols()]
        } else {
            vec![Confusion::default(); n_classes(predictions)]
        };

        if self.multilabel {
            for (pred_row, label_row) in predictions.axis_iter(Axis(0)).zip(labels.axis_iter(Axis(0))) {
                for (c, (&p, &l)) in pred_row.iter().zip(label_row.iter()).enumerate() {
                    match (p >= DECISION_THRESHOLD, is_positive(l)) {
                        (true, true) => confusion[c].tp += 1,
                        (true, false) => confusion[c].fp += 1,
                        (false, true) => confusion[c].fn_ += 1,
                        (false, false) => {}
                    }
                }
            }
        } else {
            for (row, &label) in predictions.axis_iter(Axis(0)).zip(labels.column(0).iter()) {
                let predicted = predicted_class(row);
                let actual = label as usize;
                if predicted == actual {
                    confusion[actual].tp += 1;
                } else {
                    confusion[predicted].fp += 1;
                    confusion[actual].fn_ += 1;
                }
            }
        }

        macro_average(confusion.into_iter().map(Confusion::f1), 0.0)
    }

    fn direction(&self) -> Direction {
        Direction::HigherBetter
    }

    fn name(&self) -> &'static str {
        "f1_score"
    }
}

// =============================================================================
// ROC AUC
// =============================================================================

/// Area under the ROC curve.
///
/// Binary tasks use the positive-class column. Multiclass and multilabel tasks
/// average one-vs-rest AUCs over columns that contain both outcomes; with no
/// such column the result is 0.5.
#[derive(Debug, Clone, Copy, Default)]
pub struct RocAuc {
    pub multilabel: bool,
}

impl MetricFn for RocAuc {
    fn compute(&self, predictions: ArrayView2<f32>, labels: ArrayView2<f32>) -> f64 {
        let columns = one_vs_rest(predictions, labels, self.multilabel);
        macro_average(
            columns
                .iter()
                .map(|(scores, truth)| binary_auc(scores, truth)),
            0.5,
        )
    }

    fn direction(&self) -> Direction {
        Direction::HigherBetter
    }

    fn name(&self) -> &'static str {
        "roc_auc"
    }
}

/// Mann-Whitney AUC with averaged ranks for tied scores.
///
/// Returns `None` when only one outcome is present.
fn binary_auc(scores: &[f32], truth: &[bool]) -> Option<f64> {
    let n = scores.len();
    let n_pos = truth.iter().filter(|&&t| t).count();
    let n_neg = n - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return None;
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    // Sum of 1-based ascending ranks of positives, ties share the mean rank.
    let mut rank_sum_pos = 0.0f64;
    let mut i = 0;
    while i < n {
        let mut j = i + 1;
        while j < n && scores[indices[j]] == scores[indices[i]] {
            j += 1;
        }
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        rank_sum_pos += avg_rank * indices[i..j].iter().filter(|&&idx| truth[idx]).count() as f64;
        i = j;
    }

    let n_pos_f = n_pos as f64;
    Some((rank_sum_pos - n_pos_f * (n_pos_f + 1.0) / 2.0) / (n_pos_f * n_neg as f64))
}

// =============================================================================
// Precision / Recall
// =============================================================================

/// Area under the precision/recall curve (average precision).
///
/// `AP = Σ (R_k - R_{k-1}) · P_k` over distinct score thresholds, highest
/// first. Columns without positives are skipped; with none left the result is 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrecisionRecall {
    pub multilabel: bool,
}

impl MetricFn for PrecisionRecall {
    fn compute(&self, predictions: ArrayView2<f32>, labels: ArrayView2<f32>) -> f64 {
        let columns = one_vs_rest(predictions, labels, self.multilabel);
        macro_average(
            columns
                .iter()
                .map(|(scores, truth)| average_precision(scores, truth)),
            0.0,
        )
    }

    fn direction(&self) -> Direction {
        Direction::HigherBetter
    }

    fn name(&self) -> &'static str {
        "precision_recall"
    }
}

fn average_precision(scores: &[f32], truth: &[bool]) -> Option<f64> {
    let n_pos = truth.iter().filter(|&&t| t).count();
    if n_pos == 0 {
        return None;
    }

    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let mut ap = 0.0f64;
    let mut tp = 0usize;
    let mut seen = 0usize;
    let mut prev_recall = 0.0f64;
    let mut i = 0;
    while i < indices.len() {
        let mut j = i;
        while j < indices.len() && scores[indices[j]] == scores[indices[i]] {
            if truth[indices[j]] {
                tp += 1;
            }
            j += 1;
        }
        seen = j;
        let recall = tp as f64 / n_pos as f64;
        let precision = tp as f64 / seen as f64;
        ap += (recall - prev_recall) * precision;
        prev_recall = recall;
        i = j;
    }
    debug_assert_eq!(seen, scores.len());

    Some(ap)
}
