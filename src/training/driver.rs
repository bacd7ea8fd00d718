//! Per-step evaluation driver.
//!
//! [`EvalDriver`] strings one evaluation round together: score the splits,
//! report through the [`TaskTracker`] on rank 0, rank the validation scores
//! and consult the early-stop policy. Every rank runs the same decisions from
//! the same step counter; only logging is restricted to rank 0.

use std::time::{Duration, Instant};

use crate::error::EvalError;

use super::eval::{Evaluator, ScoreFn};
use super::logger::TaskTracker;
use super::metrics::{MetricKind, ScoreMap};

/// Result of one evaluation round.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalOutcome {
    pub val: ScoreMap,
    pub test: ScoreMap,
    /// Rank of each validation score; empty without validation.
    pub ranks: Vec<(MetricKind, usize)>,
    /// Whether the early-stop policy asked to halt.
    pub stop: bool,
    /// Wall time spent scoring. Reported only, never used for decisions.
    pub duration: Duration,
}

impl EvalOutcome {
    /// Rank of `metric`, if validation was scored.
    pub fn rank(&self, metric: MetricKind) -> Option<usize> {
        self.ranks
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, r)| *r)
    }
}

/// Evaluation driver for one worker.
pub struct EvalDriver<S: ScoreFn, T: TaskTracker> {
    evaluator: Evaluator<S>,
    tracker: T,
    rank: usize,
}

impl<S: ScoreFn, T: TaskTracker> EvalDriver<S, T> {
    /// `rank` is this worker's rank; only rank 0 reports to `tracker`.
    pub fn new(evaluator: Evaluator<S>, tracker: T, rank: usize) -> Self {
        Self {
            evaluator,
            tracker,
            rank,
        }
    }

    #[inline]
    fn reports(&self) -> bool {
        self.rank == 0
    }

    /// Frequency gate; check it before computing predictions.
    pub fn should_eval(&self, step: u64, epoch_end: bool) -> bool {
        self.evaluator.do_eval(step, epoch_end)
    }

    /// Run one evaluation round at `step`.
    ///
    /// Ranking and early stopping only run when validation input is present.
    pub fn run(
        &mut self,
        step: u64,
        val: Option<S::Input<'_>>,
        test: Option<S::Input<'_>>,
    ) -> Result<EvalOutcome, EvalError> {
        let has_val = val.is_some();
        let start = Instant::now();
        let (val_score, test_score) = self.evaluator.evaluate(val, test, step)?;
        let duration = start.elapsed();

        let (ranks, stop) = if has_val {
            let ranks = self.evaluator.get_val_score_rank(&val_score);
            let stop = self.evaluator.do_early_stop(&val_score);
            (ranks, stop)
        } else {
            (Vec::new(), false)
        };

        if self.reports() {
            self.tracker.log_metrics(step, &val_score, &test_score, duration);
            self.tracker.log_best(step, self.evaluator.best_scores());
            if stop {
                self.tracker.log_early_stop(step, self.evaluator.metrics()[0]);
            }
        }

        Ok(EvalOutcome {
            val: val_score,
            test: test_score,
            ranks,
            stop,
            duration,
        })
    }

    /// Score a single labeled split after training, as both validation and
    /// test at step 0. Returns the test scores.
    pub fn run_inference(&mut self, input: S::Input<'_>) -> Result<ScoreMap, EvalError> {
        let start = Instant::now();
        let (val_score, test_score) = self.evaluator.evaluate(Some(input), Some(input), 0)?;
        let duration = start.elapsed();

        if self.reports() {
            self.tracker.log_metrics(0, &val_score, &test_score, duration);
        }
        Ok(test_score)
    }

    pub fn evaluator(&self) -> &Evaluator<S> {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut Evaluator<S> {
        &mut self.evaluator
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    pub fn into_parts(self) -> (Evaluator<S>, T) {
        (self.evaluator, self.tracker)
    }
}
