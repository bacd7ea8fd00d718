//! Evaluation configuration with builder pattern.
//!
//! [`EvalConfig`] gathers everything the evaluation engine reads from a job
//! configuration. It is built with the `bon` crate and validated at build
//! time, or deserialized from JSON with [`EvalConfig::from_json_str`].
//!
//! # Example
//!
//! ```
//! use gnn_eval::model::{EvalConfig, TaskKind};
//! use gnn_eval::training::{EarlyStopStrategy, MetricKind};
//!
//! let config = EvalConfig::builder()
//!     .task(TaskKind::NodeClassification)
//!     .eval_metric(vec![MetricKind::Accuracy, MetricKind::F1Score])
//!     .evaluation_frequency(100)
//!     .enable_early_stop(true)
//!     .call_to_consider_early_stop(5)
//!     .early_stop_strategy(EarlyStopStrategy::ConsecutiveIncrease)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.metrics()[0], MetricKind::Accuracy);
//! ```

use std::collections::HashSet;

use bon::Builder;
use serde::Deserialize;

use super::task::TaskKind;
use crate::training::{
    EarlyStopConfig, EarlyStopStrategy, EvalFrequency, LinkScoring, MetricFamily, MetricKind,
    Verbosity,
};
use crate::utils::Parallelism;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors raised while building or validating a configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("unknown early stop strategy '{0}', expected 'consecutive_increase' or 'average_increase'")]
    UnknownStrategy(String),

    #[error("unknown task type '{0}'")]
    UnknownTask(String),

    #[error("no evaluation metric configured")]
    NoMetrics,

    #[error("metric '{0}' is listed more than once")]
    DuplicateMetric(MetricKind),

    #[error("metric '{metric}' is not supported for task '{task}'")]
    MetricNotForTask { metric: MetricKind, task: TaskKind },

    #[error("metric '{metric}' is not supported by this scorer")]
    UnsupportedMetric { metric: MetricKind },

    #[error("window_for_early_stop must be at least 1")]
    InvalidWindow,

    #[error("num_negative_edges_eval must be at least 1")]
    InvalidNegativeEdges,

    #[error("{family:?} evaluator cannot score {input}")]
    InputMismatch {
        family: MetricFamily,
        input: &'static str,
    },

    #[error("malformed configuration: {0}")]
    Parse(String),
}

// =============================================================================
// EvalConfig
// =============================================================================

fn default_window() -> usize {
    3
}

/// Evaluation settings of one training or inference job.
///
/// # Structure
///
/// - **Task & metrics**: what is scored and how
/// - **Frequency**: when evaluation runs
/// - **Early stopping**: when training halts
/// - **Link prediction**: decoder scoring and negative sampling
/// - **Resources & logging**
#[derive(Debug, Clone, Builder, Deserialize)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct EvalConfig {
    // === Task & metrics ===
    /// Task type; selects the scorer.
    pub task: TaskKind,

    /// Metrics to compute, in order. Empty means the task default.
    /// The first metric drives early stopping.
    #[builder(default)]
    #[serde(default)]
    pub eval_metric: Vec<MetricKind>,

    /// Labels are 0/1 matrices rather than class ids. Default: false.
    #[builder(default)]
    #[serde(default)]
    pub multilabel: bool,

    // === Frequency ===
    /// Evaluate every this many steps; 0 evaluates at epoch end only.
    #[builder(default)]
    #[serde(default)]
    pub evaluation_frequency: u64,

    // === Early stopping ===
    /// Default: false.
    #[builder(default)]
    #[serde(default)]
    pub enable_early_stop: bool,

    /// Warm-up calls that never stop. Default: 0.
    #[builder(default)]
    #[serde(default)]
    pub call_to_consider_early_stop: usize,

    /// Number of earlier scores compared against. Default: 3.
    #[builder(default = 3)]
    #[serde(default = "default_window")]
    pub window_for_early_stop: usize,

    /// Default: `average_increase`.
    #[builder(default)]
    #[serde(default)]
    pub early_stop_strategy: EarlyStopStrategy,

    // === Link prediction ===
    /// Default: dot product (higher scores rank first).
    #[builder(default)]
    #[serde(default)]
    pub link_scoring: LinkScoring,

    /// Expected number of negative edges per positive edge at evaluation.
    pub num_negative_edges_eval: Option<usize>,

    // === Resources & logging ===
    /// Threads for MRR ranking. 0 = auto, 1 = sequential.
    #[builder(default)]
    #[serde(default)]
    pub n_threads: usize,

    /// Default: `Silent`.
    #[builder(default)]
    #[serde(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: eval_config_builder::IsComplete> EvalConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - a metric is listed twice or does not belong to the task
    /// - `window_for_early_stop == 0`
    /// - `num_negative_edges_eval == Some(0)`
    pub fn build(self) -> Result<EvalConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl EvalConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// Metric, task and strategy literals use the same names as
    /// [`MetricKind::name`], [`TaskKind::name`] and [`EarlyStopStrategy::name`].
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EvalConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for &metric in &self.eval_metric {
            if !seen.insert(metric) {
                return Err(ConfigError::DuplicateMetric(metric));
            }
            if metric.family() != self.task.family() {
                return Err(ConfigError::MetricNotForTask {
                    metric,
                    task: self.task,
                });
            }
        }

        if self.window_for_early_stop == 0 {
            return Err(ConfigError::InvalidWindow);
        }

        if self.num_negative_edges_eval == Some(0) {
            return Err(ConfigError::InvalidNegativeEdges);
        }

        Ok(())
    }

    /// Configured metrics, or the task default when none is configured.
    pub fn metrics(&self) -> Vec<MetricKind> {
        if self.eval_metric.is_empty() {
            self.task.default_metrics().to_vec()
        } else {
            self.eval_metric.clone()
        }
    }

    pub fn frequency(&self) -> EvalFrequency {
        EvalFrequency(self.evaluation_frequency)
    }

    pub fn early_stop(&self) -> EarlyStopConfig {
        EarlyStopConfig {
            enabled: self.enable_early_stop,
            calls_to_consider: self.call_to_consider_early_stop,
            window_size: self.window_for_early_stop,
            strategy: self.early_stop_strategy,
        }
    }

    pub fn parallelism(&self) -> Parallelism {
        Parallelism::from_threads(self.n_threads)
    }

    /// Task family of the configured task.
    pub fn family(&self) -> MetricFamily {
        self.task.family()
    }
}

// =============================================================================
// Tests
// =============================================================================
