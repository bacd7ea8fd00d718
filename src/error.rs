//! Error types shared across the evaluation engine.

use crate::model::ConfigError;

/// Malformed prediction or label input passed to a scorer.
///
/// Scorers validate shapes before computing anything, so a bad batch fails
/// immediately instead of producing `NaN` scores.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShapeError {
    #[error("{what}: no samples")]
    Empty { what: &'static str },

    #[error("{what}: row count mismatch (predictions {predictions}, labels {labels})")]
    RowMismatch {
        what: &'static str,
        predictions: usize,
        labels: usize,
    },

    #[error("{what}: expected {expected} columns, got {got}")]
    ColumnMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{what}: non-finite value at row {row}")]
    NonFinite { what: &'static str, row: usize },

    #[error("label {label} at row {row} is not a valid class id for {n_classes} classes")]
    LabelOutOfRange {
        row: usize,
        label: f32,
        n_classes: usize,
    },
}

/// Any error raised by the evaluation engine.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid input shape: {0}")]
    Shape(#[from] ShapeError),
}
