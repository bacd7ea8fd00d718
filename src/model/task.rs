//! Task types and evaluator selection.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::config::{ConfigError, EvalConfig};
use crate::error::EvalError;
use crate::training::{
    ClassificationScorer, Evaluator, LabeledPredictions, LinkScores, MetricFamily, MetricKind,
    MrrScorer, RegressionScorer, ScoreMap,
};

// =============================================================================
// TaskKind
// =============================================================================

/// Training task of a GNN job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum TaskKind {
    NodeClassification,
    NodeRegression,
    EdgeClassification,
    EdgeRegression,
    LinkPrediction,
}

impl TaskKind {
    pub const ALL: [TaskKind; 5] = [
        TaskKind::NodeClassification,
        TaskKind::NodeRegression,
        TaskKind::EdgeClassification,
        TaskKind::EdgeRegression,
        TaskKind::LinkPrediction,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskKind::NodeClassification => "node_classification",
            TaskKind::NodeRegression => "node_regression",
            TaskKind::EdgeClassification => "edge_classification",
            TaskKind::EdgeRegression => "edge_regression",
            TaskKind::LinkPrediction => "link_prediction",
        }
    }

    /// Metric family scored for this task.
    pub fn family(self) -> MetricFamily {
        match self {
            TaskKind::NodeClassification | TaskKind::EdgeClassification => {
                MetricFamily::Classification
            }
            TaskKind::NodeRegression | TaskKind::EdgeRegression => MetricFamily::Regression,
            TaskKind::LinkPrediction => MetricFamily::LinkPrediction,
        }
    }

    /// Metrics used when the configuration lists none.
    pub fn default_metrics(self) -> &'static [MetricKind] {
        match self.family() {
            MetricFamily::Classification => &[MetricKind::Accuracy],
            MetricFamily::Regression => &[MetricKind::Rmse],
            MetricFamily::LinkPrediction => &[MetricKind::Mrr],
        }
    }
}

impl FromStr for TaskKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| ConfigError::UnknownTask(s.to_string()))
    }
}

impl TryFrom<String> for TaskKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// TaskEvaluator
// =============================================================================

/// Evaluator selected from a configuration's task type.
pub enum TaskEvaluator {
    Classification(Evaluator<ClassificationScorer>),
    Regression(Evaluator<RegressionScorer>),
    LinkPrediction(Evaluator<MrrScorer>),
}

/// Run `$body` with `$ev` bound to whichever evaluator is inside.
macro_rules! with_evaluator {
    ($self:expr, $ev:ident => $body:expr) => {
        match $self {
            TaskEvaluator::Classification($ev) => $body,
            TaskEvaluator::Regression($ev) => $body,
            TaskEvaluator::LinkPrediction($ev) => $body,
        }
    };
}

impl TaskEvaluator {
    /// Build the evaluator variant for `config.task`.
    pub fn from_config(config: &EvalConfig) -> Result<Self, ConfigError> {
        let evaluator = match config.family() {
            MetricFamily::Classification => TaskEvaluator::Classification(Evaluator::new(
                ClassificationScorer::new(config.multilabel),
                config,
            )?),
            MetricFamily::Regression => {
                TaskEvaluator::Regression(Evaluator::new(RegressionScorer, config)?)
            }
            MetricFamily::LinkPrediction => {
                let mut scorer =
                    MrrScorer::new(config.link_scoring).with_parallelism(config.parallelism());
                if let Some(n) = config.num_negative_edges_eval {
                    scorer = scorer.with_num_negative_edges(n);
                }
                TaskEvaluator::LinkPrediction(Evaluator::new(scorer, config)?)
            }
        };
        tracing::debug!(task = %config.task, metrics = ?config.metrics(), "evaluator created");
        Ok(evaluator)
    }

    pub fn family(&self) -> MetricFamily {
        match self {
            TaskEvaluator::Classification(_) => MetricFamily::Classification,
            TaskEvaluator::Regression(_) => MetricFamily::Regression,
            TaskEvaluator::LinkPrediction(_) => MetricFamily::LinkPrediction,
        }
    }

    /// Evaluate node or edge predictions.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InputMismatch`] for a link prediction evaluator.
    pub fn evaluate_predictions(
        &mut self,
        val: Option<LabeledPredictions<'_>>,
        test: Option<LabeledPredictions<'_>>,
        total_iters: u64,
    ) -> Result<(ScoreMap, ScoreMap), EvalError> {
        match self {
            TaskEvaluator::Classification(ev) => ev.evaluate(val, test, total_iters),
            TaskEvaluator::Regression(ev) => ev.evaluate(val, test, total_iters),
            TaskEvaluator::LinkPrediction(_) => Err(ConfigError::InputMismatch {
                family: MetricFamily::LinkPrediction,
                input: "labeled predictions",
            }
            .into()),
        }
    }

    /// Evaluate link prediction scores.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InputMismatch`] unless this is a link prediction evaluator.
    pub fn evaluate_links(
        &mut self,
        val: Option<&LinkScores>,
        test: Option<&LinkScores>,
        total_iters: u64,
    ) -> Result<(ScoreMap, ScoreMap), EvalError> {
        match self {
            TaskEvaluator::LinkPrediction(ev) => ev.evaluate(val, test, total_iters),
            other => Err(ConfigError::InputMismatch {
                family: other.family(),
                input: "link scores",
            }
            .into()),
        }
    }

    pub fn metrics(&self) -> &[MetricKind] {
        with_evaluator!(self, ev => ev.metrics())
    }

    pub fn do_eval(&self, step: u64, epoch_end: bool) -> bool {
        with_evaluator!(self, ev => ev.do_eval(step, epoch_end))
    }

    pub fn do_early_stop(&mut self, val_score: &ScoreMap) -> bool {
        with_evaluator!(self, ev => ev.do_early_stop(val_score))
    }

    pub fn get_val_score_rank(&mut self, val_score: &ScoreMap) -> Vec<(MetricKind, usize)> {
        with_evaluator!(self, ev => ev.get_val_score_rank(val_score))
    }

    pub fn best_val_score(&self, metric: MetricKind) -> Option<f64> {
        with_evaluator!(self, ev => ev.best_val_score(metric))
    }

    pub fn best_test_score(&self, metric: MetricKind) -> Option<f64> {
        with_evaluator!(self, ev => ev.best_test_score(metric))
    }

    pub fn best_iter_num(&self, metric: MetricKind) -> Option<u64> {
        with_evaluator!(self, ev => ev.best_iter_num(metric))
    }
}
