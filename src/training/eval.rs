//! Evaluation state shared by every task.
//!
//! [`Evaluator`] owns everything an evaluation run mutates: best scores, the
//! validation history, the rank-table and early-stop readers of that history
//! and the early-stop state. Task-specific scoring is plugged in through
//! [`ScoreFn`].

use crate::error::{EvalError, ShapeError};
use crate::model::{ConfigError, EvalConfig};

use super::callback::{EarlyStopConfig, EarlyStopping};
use super::history::{get_rank, HistoryCursor, ValPerfHistory};
use super::metrics::{Direction, MetricKind, ScoreMap, NO_SCORE};
use super::schedule::EvalFrequency;

// =============================================================================
// ScoreFn
// =============================================================================

/// Task-specific scoring of one split.
pub trait ScoreFn {
    /// Predictions and labels of one split.
    type Input<'a>: Copy;

    /// Returns true if this scorer can compute `metric`.
    fn supports(&self, metric: MetricKind) -> bool;

    /// Score `input` for every metric in `metrics`, in that order.
    ///
    /// Malformed input fails before any metric is computed.
    fn compute_score(
        &self,
        input: Self::Input<'_>,
        metrics: &[MetricKind],
    ) -> Result<ScoreMap, ShapeError>;
}

// =============================================================================
// BestScores
// =============================================================================

/// Best validation score of one metric, with the test score and iteration
/// recorded alongside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestScore {
    pub val: f64,
    pub test: f64,
    pub iter: u64,
}

impl BestScore {
    fn initial(direction: Direction) -> Self {
        let start = direction.initial_best();
        Self {
            val: start,
            test: start,
            iter: 0,
        }
    }
}

/// Best-score bookkeeping for every configured metric.
#[derive(Debug, Clone, PartialEq)]
pub struct BestScores {
    entries: Vec<(MetricKind, Direction, BestScore)>,
}

impl BestScores {
    pub fn new(metrics: &[MetricKind]) -> Self {
        let entries = metrics
            .iter()
            .map(|&m| {
                let direction = m.direction();
                (m, direction, BestScore::initial(direction))
            })
            .collect();
        Self { entries }
    }

    /// Record `val`/`test` for every metric whose validation score strictly
    /// improves on its best. Returns the metrics that improved.
    pub fn update(&mut self, val: &ScoreMap, test: &ScoreMap, iter: u64) -> Vec<MetricKind> {
        let mut improved = Vec::new();
        for (metric, direction, best) in &mut self.entries {
            let Some(score) = val.get(*metric) else {
                continue;
            };
            if direction.is_better(score, best.val) {
                *best = BestScore {
                    val: score,
                    test: test.get(*metric).unwrap_or(NO_SCORE),
                    iter,
                };
                improved.push(*metric);
            }
        }
        improved
    }

    pub fn get(&self, metric: MetricKind) -> Option<&BestScore> {
        self.entries
            .iter()
            .find(|(m, _, _)| *m == metric)
            .map(|(_, _, best)| best)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, &BestScore)> + '_ {
        self.entries.iter().map(|(m, _, best)| (*m, best))
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Evaluation state for one training job.
///
/// The evaluator is single-owner state: calls must follow the training
/// loop's chronological order and are not synchronized internally.
///
/// # Example
///
/// ```
/// use gnn_eval::model::{EvalConfig, TaskKind};
/// use gnn_eval::training::{Evaluator, LabeledPredictions, RegressionScorer};
/// use ndarray::array;
///
/// let config = EvalConfig::builder()
///     .task(TaskKind::NodeRegression)
///     .evaluation_frequency(100)
///     .build()
///     .unwrap();
/// let mut evaluator = Evaluator::new(RegressionScorer, &config).unwrap();
///
/// let preds = array![[1.0f32], [2.0]];
/// let labels = array![[1.0f32], [2.5]];
/// let split = LabeledPredictions::new(preds.view(), labels.view());
///
/// if evaluator.do_eval(100, false) {
///     let (val, _test) = evaluator.evaluate(Some(split), None, 100).unwrap();
///     let stop = evaluator.do_early_stop(&val);
///     assert!(!stop);
/// }
/// ```
pub struct Evaluator<S: ScoreFn> {
    scorer: S,
    metrics: Vec<MetricKind>,
    /// Resolved once from the metric registry.
    directions: Vec<Direction>,
    frequency: EvalFrequency,
    best: BestScores,
    history: ValPerfHistory,
    rank_cursor: HistoryCursor,
    stop_cursor: HistoryCursor,
    early_stop: EarlyStopping,
    last_iter: Option<u64>,
}

impl<S: ScoreFn> Evaluator<S> {
    /// Create an evaluator for the metrics of `config`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnsupportedMetric`] if `scorer` cannot compute one of
    /// the configured metrics.
    pub fn new(scorer: S, config: &EvalConfig) -> Result<Self, ConfigError> {
        Self::with_parts(
            scorer,
            config.metrics(),
            config.frequency(),
            config.early_stop(),
        )
    }

    /// Create an evaluator from its individual settings.
    pub fn with_parts(
        scorer: S,
        metrics: Vec<MetricKind>,
        frequency: EvalFrequency,
        early_stop: EarlyStopConfig,
    ) -> Result<Self, ConfigError> {
        let Some(&first) = metrics.first() else {
            return Err(ConfigError::NoMetrics);
        };
        if let Some(&metric) = metrics.iter().find(|&&m| !scorer.supports(m)) {
            return Err(ConfigError::UnsupportedMetric { metric });
        }

        let directions = metrics.iter().map(|m| m.direction()).collect();
        Ok(Self {
            best: BestScores::new(&metrics),
            history: ValPerfHistory::new(&metrics),
            early_stop: EarlyStopping::new(early_stop, first.direction()),
            rank_cursor: HistoryCursor::default(),
            stop_cursor: HistoryCursor::default(),
            scorer,
            metrics,
            directions,
            frequency,
            last_iter: None,
        })
    }

    /// Configured metrics, in order. The first one drives early stopping.
    pub fn metrics(&self) -> &[MetricKind] {
        &self.metrics
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Score one split for every configured metric.
    pub fn compute_score(&self, input: S::Input<'_>) -> Result<ScoreMap, ShapeError> {
        self.scorer.compute_score(input, &self.metrics)
    }

    /// Score validation and test splits and update best-score state.
    ///
    /// An absent split is reported with [`NO_SCORE`] for every metric. Without
    /// validation the best scores and the history are left untouched.
    /// `total_iters` must not decrease between calls.
    pub fn evaluate(
        &mut self,
        val: Option<S::Input<'_>>,
        test: Option<S::Input<'_>>,
        total_iters: u64,
    ) -> Result<(ScoreMap, ScoreMap), EvalError> {
        if let Some(last) = self.last_iter {
            if total_iters < last {
                tracing::warn!(total_iters, last, "evaluate called with a decreasing iteration count");
            }
        }
        self.last_iter = Some(total_iters);

        let val_score = val.map(|input| self.compute_score(input)).transpose()?;
        let test_score = match test {
            Some(input) => self.compute_score(input)?,
            None => ScoreMap::sentinel(&self.metrics),
        };

        let Some(val_score) = val_score else {
            return Ok((ScoreMap::sentinel(&self.metrics), test_score));
        };

        let improved = self.best.update(&val_score, &test_score, total_iters);
        if !improved.is_empty() {
            tracing::debug!(total_iters, ?improved, "new best validation score");
        }
        self.history.record(&val_score);
        Ok((val_score, test_score))
    }

    /// Frequency gate.
    #[inline]
    pub fn do_eval(&self, step: u64, epoch_end: bool) -> bool {
        self.frequency.should_eval(step, epoch_end)
    }

    /// Ask the early-stop policy whether training should halt.
    ///
    /// Decides on the first configured metric. A map without that metric
    /// never stops.
    pub fn do_early_stop(&mut self, val_score: &ScoreMap) -> bool {
        if !self.early_stop.is_enabled() {
            return false;
        }
        let metric = self.metrics[0];
        let Some(score) = val_score.get(metric) else {
            tracing::warn!(metric = metric.name(), "early stop metric missing from validation scores");
            return false;
        };

        self.history.observe(&mut self.stop_cursor, val_score);
        let Some((_, earlier)) = self.history.scores(metric).split_last() else {
            return false;
        };
        self.early_stop.should_stop(earlier, score)
    }

    /// Rank of each validation score among all validation scores so far.
    pub fn get_val_score_rank(&mut self, val_score: &ScoreMap) -> Vec<(MetricKind, usize)> {
        self.history.observe(&mut self.rank_cursor, val_score);
        self.metrics
            .iter()
            .zip(&self.directions)
            .filter_map(|(&metric, &direction)| {
                let candidate = val_score.get(metric)?;
                let (_, earlier) = self.history.scores(metric).split_last()?;
                Some((metric, get_rank(earlier, candidate, direction)))
            })
            .collect()
    }

    pub fn best_scores(&self) -> &BestScores {
        &self.best
    }

    pub fn best_val_score(&self, metric: MetricKind) -> Option<f64> {
        self.best.get(metric).map(|b| b.val)
    }

    pub fn best_test_score(&self, metric: MetricKind) -> Option<f64> {
        self.best.get(metric).map(|b| b.test)
    }

    pub fn best_iter_num(&self, metric: MetricKind) -> Option<u64> {
        self.best.get(metric).map(|b| b.iter)
    }

    pub fn history(&self) -> &ValPerfHistory {
        &self.history
    }

    pub fn early_stopping(&self) -> &EarlyStopping {
        &self.early_stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(MetricKind, f64)]) -> ScoreMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn best_scores_start_from_direction() {
        let best = BestScores::new(&[MetricKind::Accuracy, MetricKind::Rmse]);
        assert_eq!(best.get(MetricKind::Accuracy).unwrap().val, 0.0);
        assert_eq!(best.get(MetricKind::Rmse).unwrap().val, f64::INFINITY);
        assert_eq!(best.get(MetricKind::Rmse).unwrap().iter, 0);
    }

    #[test]
    fn best_scores_update_per_metric() {
        let mut best = BestScores::new(&[MetricKind::Accuracy, MetricKind::Rmse]);

        let improved = best.update(
            &map(&[(MetricKind::Accuracy, 0.7), (MetricKind::Rmse, 0.5)]),
            &map(&[(MetricKind::Accuracy, 0.6), (MetricKind::Rmse, 0.6)]),
            10,
        );
        assert_eq!(improved, vec![MetricKind::Accuracy, MetricKind::Rmse]);

        // Accuracy improves, rmse does not.
        let improved = best.update(
            &map(&[(MetricKind::Accuracy, 0.8), (MetricKind::Rmse, 0.55)]),
            &map(&[(MetricKind::Accuracy, 0.75), (MetricKind::Rmse, 0.1)]),
            20,
        );
        assert_eq!(improved, vec![MetricKind::Accuracy]);

        let acc = best.get(MetricKind::Accuracy).unwrap();
        assert_eq!((acc.val, acc.test, acc.iter), (0.8, 0.75, 20));
        let rmse = best.get(MetricKind::Rmse).unwrap();
        assert_eq!((rmse.val, rmse.test, rmse.iter), (0.5, 0.6, 10));
    }

    #[test]
    fn equal_score_is_not_an_improvement() {
        let mut best = BestScores::new(&[MetricKind::Mrr]);
        best.update(&map(&[(MetricKind::Mrr, 0.5)]), &ScoreMap::new(), 1);
        let improved = best.update(&map(&[(MetricKind::Mrr, 0.5)]), &ScoreMap::new(), 2);
        assert!(improved.is_empty());
        assert_eq!(best.get(MetricKind::Mrr).unwrap().iter, 1);
        assert_eq!(best.get(MetricKind::Mrr).unwrap().test, NO_SCORE);
    }
}
