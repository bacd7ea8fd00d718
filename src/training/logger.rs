//! Structured logging of evaluation results.
//!
//! [`TaskTracker`] is the narrow interface the evaluation driver reports
//! through. [`TrainingLogger`] implements it on top of `tracing`, gated by a
//! [`Verbosity`] level.

use std::time::Duration;

use serde::Deserialize;

use super::eval::BestScores;
use super::metrics::{MetricKind, ScoreMap};

/// Verbosity level for evaluation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Only warnings (early stop triggered, missing metrics).
    Warning,
    /// Scores of every evaluation.
    Info,
    /// Everything, including best-score snapshots after each evaluation.
    Debug,
}

/// Receiver of evaluation events.
pub trait TaskTracker {
    /// Scores of one evaluation, with the time it took.
    fn log_metrics(&mut self, step: u64, val: &ScoreMap, test: &ScoreMap, duration: Duration);

    /// Best scores seen so far.
    fn log_best(&mut self, step: u64, best: &BestScores);

    /// The early-stop policy asked to stop.
    fn log_early_stop(&mut self, step: u64, metric: MetricKind);
}

/// [`TaskTracker`] that writes `tracing` events.
#[derive(Debug, Clone)]
pub struct TrainingLogger {
    verbosity: Verbosity,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    #[inline]
    fn enabled(&self, level: Verbosity) -> bool {
        self.verbosity >= level
    }
}

impl TaskTracker for TrainingLogger {
    fn log_metrics(&mut self, step: u64, val: &ScoreMap, test: &ScoreMap, duration: Duration) {
        if !self.enabled(Verbosity::Info) {
            return;
        }
        tracing::info!(
            step,
            duration_ms = duration.as_secs_f64() * 1e3,
            "validation {{{}}} test {{{}}}",
            val,
            test
        );
    }

    fn log_best(&mut self, step: u64, best: &BestScores) {
        if !self.enabled(Verbosity::Debug) {
            return;
        }
        for (metric, score) in best.iter() {
            tracing::debug!(
                step,
                metric = metric.name(),
                best_val = score.val,
                best_test = score.test,
                best_iter = score.iter,
                "best score"
            );
        }
    }

    fn log_early_stop(&mut self, step: u64, metric: MetricKind) {
        if !self.enabled(Verbosity::Warning) {
            return;
        }
        tracing::warn!(step, metric = metric.name(), "early stopping triggered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_ordering() {
        assert!(Verbosity::Debug > Verbosity::Info);
        assert!(Verbosity::Info > Verbosity::Warning);
        assert!(Verbosity::Warning > Verbosity::Silent);
        assert_eq!(Verbosity::default(), Verbosity::Silent);
    }

    #[test]
    fn gate_follows_verbosity() {
        let logger = TrainingLogger::new(Verbosity::Warning);
        assert!(logger.enabled(Verbosity::Warning));
        assert!(!logger.enabled(Verbosity::Info));
    }

    #[test]
    fn verbosity_from_json() {
        let v: Verbosity = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(v, Verbosity::Debug);
    }
}
