//! Evaluation metrics and the fixed metric registry.
//!
//! Every metric has a fixed comparison [`Direction`], resolved from its
//! [`MetricKind`] once when an evaluator is built. Comparisons everywhere in
//! the engine go through [`Direction::is_better`] and
//! [`Direction::is_worse_or_equal`].
//!
//! # Layout
//!
//! Classification and regression metrics implement [`MetricFn`] on a pair of
//! 2-D views: predictions `[n_samples, n_columns]` and labels
//! `[n_samples, n_label_columns]`. Inputs are validated by the scorer before
//! they reach a metric, so metrics assume consistent shapes.
//!
//! MRR works on positive/negative score batches instead and lives in
//! [`ranking`].
//!
//! # Available Metrics
//!
//! ## Classification
//! - [`Accuracy`]: argmax (or thresholded) accuracy
//! - [`F1Score`]: macro-averaged F1
//! - [`RocAuc`]: area under the ROC curve, one-vs-rest macro for multiclass
//! - [`PrecisionRecall`]: area under the precision/recall curve
//!
//! ## Regression
//! - [`Rmse`], [`Mse`], [`Mae`]
//!
//! ## Link prediction
//! - [`ranking::mrr`]: mean reciprocal rank

mod classification;
pub mod ranking;
mod regression;

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView2;
use serde::Deserialize;

pub use classification::{Accuracy, F1Score, PrecisionRecall, RocAuc};
pub(crate) use classification::n_classes;
pub use ranking::{EdgeType, LinkScores, LinkScoring, RankingBatch};
pub use regression::{Mae, Mse, Rmse};

use crate::model::ConfigError;

/// Score reported for a split that has no data (e.g. no validation set).
pub const NO_SCORE: f64 = -1.0;

// =============================================================================
// Direction
// =============================================================================

/// Comparison direction of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Larger values are better (accuracy, MRR).
    HigherBetter,
    /// Smaller values are better (RMSE, MSE).
    LowerBetter,
}

impl Direction {
    /// Returns true if `new` strictly improves on `baseline`.
    #[inline]
    pub fn is_better(self, new: f64, baseline: f64) -> bool {
        match self {
            Direction::HigherBetter => new > baseline,
            Direction::LowerBetter => new < baseline,
        }
    }

    /// Returns true if `new` does not improve on `baseline`.
    ///
    /// This is the early-stop comparator: `<=` for higher-better metrics,
    /// `>=` for lower-better ones.
    #[inline]
    pub fn is_worse_or_equal(self, new: f64, baseline: f64) -> bool {
        match self {
            Direction::HigherBetter => new <= baseline,
            Direction::LowerBetter => new >= baseline,
        }
    }

    /// Returns true if `new` is at least as good as `baseline`.
    #[inline]
    pub fn is_better_or_equal(self, new: f64, baseline: f64) -> bool {
        match self {
            Direction::HigherBetter => new >= baseline,
            Direction::LowerBetter => new <= baseline,
        }
    }

    /// Starting value for best-score bookkeeping.
    ///
    /// Any real score improves on it, except a higher-better score of exactly 0.
    #[inline]
    pub fn initial_best(self) -> f64 {
        match self {
            Direction::HigherBetter => 0.0,
            Direction::LowerBetter => f64::INFINITY,
        }
    }
}

// =============================================================================
// MetricKind (registry)
// =============================================================================

/// Task family a metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    Classification,
    Regression,
    LinkPrediction,
}

/// Metric identifier used in configuration and score maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum MetricKind {
    // Classification
    Accuracy,
    F1Score,
    PrecisionRecall,
    RocAuc,

    // Regression
    Rmse,
    Mse,
    Mae,

    // Link prediction
    Mrr,
}

impl MetricKind {
    /// All registered metrics.
    pub const ALL: [MetricKind; 8] = [
        MetricKind::Accuracy,
        MetricKind::F1Score,
        MetricKind::PrecisionRecall,
        MetricKind::RocAuc,
        MetricKind::Rmse,
        MetricKind::Mse,
        MetricKind::Mae,
        MetricKind::Mrr,
    ];

    /// Configuration literal of the metric.
    pub fn name(self) -> &'static str {
        match self {
            MetricKind::Accuracy => "accuracy",
            MetricKind::F1Score => "f1_score",
            MetricKind::PrecisionRecall => "precision_recall",
            MetricKind::RocAuc => "roc_auc",
            MetricKind::Rmse => "rmse",
            MetricKind::Mse => "mse",
            MetricKind::Mae => "mae",
            MetricKind::Mrr => "mrr",
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            MetricKind::Accuracy
            | MetricKind::F1Score
            | MetricKind::PrecisionRecall
            | MetricKind::RocAuc
            | MetricKind::Mrr => Direction::HigherBetter,
            MetricKind::Rmse | MetricKind::Mse | MetricKind::Mae => Direction::LowerBetter,
        }
    }

    pub fn family(self) -> MetricFamily {
        match self {
            MetricKind::Accuracy
            | MetricKind::F1Score
            | MetricKind::PrecisionRecall
            | MetricKind::RocAuc => MetricFamily::Classification,
            MetricKind::Rmse | MetricKind::Mse | MetricKind::Mae => MetricFamily::Regression,
            MetricKind::Mrr => MetricFamily::LinkPrediction,
        }
    }
}

impl FromStr for MetricKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| ConfigError::UnknownMetric(s.to_string()))
    }
}

impl TryFrom<String> for MetricKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// ScoreMap
// =============================================================================

/// Metric name → score, kept in configured-metric order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScoreMap {
    entries: Vec<(MetricKind, f64)>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map with [`NO_SCORE`] for every metric.
    pub fn sentinel(metrics: &[MetricKind]) -> Self {
        metrics.iter().map(|&m| (m, NO_SCORE)).collect()
    }

    /// Insert or overwrite a score.
    pub fn insert(&mut self, metric: MetricKind, value: f64) {
        match self.entries.iter_mut().find(|(m, _)| *m == metric) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((metric, value)),
        }
    }

    pub fn get(&self, metric: MetricKind) -> Option<f64> {
        self.entries
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(MetricKind, f64)> for ScoreMap {
    fn from_iter<I: IntoIterator<Item = (MetricKind, f64)>>(iter: I) -> Self {
        let mut map = ScoreMap::new();
        for (metric, value) in iter {
            map.insert(metric, value);
        }
        map
    }
}

impl std::ops::Index<MetricKind> for ScoreMap {
    type Output = f64;

    fn index(&self, metric: MetricKind) -> &f64 {
        self.entries
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, v)| v)
            .unwrap_or_else(|| panic!("no score for metric '{metric}'"))
    }
}

impl fmt::Display for ScoreMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (metric, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {:.6}", metric, value)?;
        }
        Ok(())
    }
}

// =============================================================================
// MetricFn Trait
// =============================================================================

/// A metric computed from a prediction matrix and a label matrix.
///
/// # Implementation Notes
///
/// - `predictions` has shape `[n_samples, n_columns]`
/// - `labels` has shape `[n_samples, 1]` (class ids / targets) or
///   `[n_samples, n_columns]` (multilabel / multi-target)
/// - Shapes are validated by the caller, `n_samples > 0`
pub trait MetricFn: Send + Sync {
    /// Compute the metric value.
    fn compute(&self, predictions: ArrayView2<f32>, labels: ArrayView2<f32>) -> f64;

    /// Which way is better.
    fn direction(&self) -> Direction;

    /// Name of the metric (for logging).
    fn name(&self) -> &'static str;
}
