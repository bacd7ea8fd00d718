//! Evaluation infrastructure for GNN training.
//!
//! This module provides the core types needed while training:
//!
//! ## Decisions
//!
//! - [`Direction`]: comparison direction of a metric, resolved once
//! - [`get_rank`], [`ValPerfHistory`]: ranking of validation scores
//! - [`EvalFrequency`]: when evaluation runs
//! - [`EarlyStopping`]: when training halts
//!
//! ## Scoring
//!
//! - [`ScoreFn`], [`Evaluator`]: task-specific scoring plus best-score state
//! - [`ClassificationScorer`], [`RegressionScorer`], [`MrrScorer`]
//!
//! ## Reporting
//!
//! - [`TaskTracker`], [`TrainingLogger`], [`Verbosity`]: structured logging
//! - [`EvalDriver`]: one evaluation round end to end

mod callback;
mod driver;
mod eval;
mod history;
mod logger;
pub mod metrics;
mod schedule;
mod scorers;

pub use callback::{
    avg_increase_judge, cons_increase_judge, EarlyStopConfig, EarlyStopStrategy, EarlyStopping,
};
pub use driver::{EvalDriver, EvalOutcome};
pub use eval::{BestScore, BestScores, Evaluator, ScoreFn};
pub use history::{get_rank, HistoryCursor, ValPerfHistory};
pub use logger::{TaskTracker, TrainingLogger, Verbosity};
pub use metrics::{
    Direction, EdgeType, LinkScores, LinkScoring, MetricFamily, MetricFn, MetricKind,
    RankingBatch, ScoreMap, NO_SCORE,
};
pub use schedule::EvalFrequency;
pub use scorers::{ClassificationScorer, LabeledPredictions, MrrScorer, RegressionScorer};
