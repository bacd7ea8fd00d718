//! gnn-eval: evaluation and early-stopping engine for distributed GNN training.
//!
//! Scores validation and test predictions, tracks the best score of every
//! metric, decides when evaluation runs and when training should stop. All
//! decisions are pure functions of the step counter and the scores, so every
//! worker of a distributed job reaches the same answer.
//!
//! # Key Types
//!
//! - [`EvalConfig`] - Configuration builder (or JSON)
//! - [`TaskEvaluator`] - Evaluator chosen by task type
//! - [`Evaluator`] - Scoring, best scores, ranking and early stopping
//! - [`EvalDriver`] - One evaluation round with logging
//!
//! # Tasks
//!
//! Node and edge classification, node and edge regression, and link
//! prediction scored by MRR. See the [`training`] module for details.

// Re-export approx traits for users who want to compare scores
pub use approx;

pub mod error;
pub mod model;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// Configuration and dispatch
pub use model::{ConfigError, EvalConfig, TaskEvaluator, TaskKind};

// Errors
pub use error::{EvalError, ShapeError};

// Evaluation
pub use training::{
    Direction, EarlyStopStrategy, EvalDriver, EvalOutcome, Evaluator, LabeledPredictions,
    LinkScores, MetricKind, ScoreFn, ScoreMap,
};

// Shared utilities
pub use utils::Parallelism;
