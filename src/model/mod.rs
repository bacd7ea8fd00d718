//! Job-level configuration and task dispatch.
//!
//! - [`EvalConfig`]: validated evaluation settings (builder or JSON)
//! - [`TaskKind`]: the training task, which fixes the metric family
//! - [`TaskEvaluator`]: evaluator variant chosen from the task

pub mod config;
pub mod task;

pub use config::{ConfigError, EvalConfig};
pub use task::{TaskEvaluator, TaskKind};
