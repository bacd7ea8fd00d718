//! Regression metrics.
//!
//! Predictions and labels share the shape `[n_samples, n_targets]`; errors
//! are averaged over every element.

use ndarray::ArrayView2;

use super::{Direction, MetricFn};

fn squared_error_sum(predictions: ArrayView2<f32>, labels: ArrayView2<f32>) -> f64 {
    predictions
        .iter()
        .zip(labels.iter())
        .map(|(p, l)| {
            let diff = (*p as f64) - (*l as f64);
            diff * diff
        })
        .sum::<f64>()
}

// =============================================================================
// MSE (Mean Squared Error)
// =============================================================================

/// Mean Squared Error: mean((pred - label)²)
#[derive(Debug, Clone, Copy, Default)]
pub struct Mse;

impl MetricFn for Mse {
    fn compute(&self, predictions: ArrayView2<f32>, labels: ArrayView2<f32>) -> f64 {
        debug_assert_eq!(predictions.dim(), labels.dim());
        squared_error_sum(predictions, labels) / predictions.len() as f64
    }

    fn direction(&self) -> Direction {
        Direction::LowerBetter
    }

    fn name(&self) -> &'static str {
        "mse"
    }
}

// =============================================================================
// RMSE (Root Mean Squared Error)
// =============================================================================

/// Root Mean Squared Error: sqrt(mean((pred - label)²))
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl MetricFn for Rmse {
    fn compute(&self, predictions: ArrayView2<f32>, labels: ArrayView2<f32>) -> f64 {
        Mse.compute(predictions, labels).sqrt()
    }

    fn direction(&self) -> Direction {
        Direction::LowerBetter
    }

    fn name(&self) -> &'static str {
        "rmse"
    }
}

// =============================================================================
// MAE (Mean Absolute Error)
// =============================================================================

/// Mean Absolute Error: mean(|pred - label|)
///
/// More robust to outliers than RMSE.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mae;

impl MetricFn for Mae {
    fn compute(&self, predictions: ArrayView2<f32>, labels: ArrayView2<f32>) -> f64 {
        debug_assert_eq!(predictions.dim(), labels.dim());
        predictions
            .iter()
            .zip(labels.iter())
            .map(|(p, l)| ((*p as f64) - (*l as f64)).abs())
            .sum::<f64>()
            / predictions.len() as f64
    }

    fn direction(&self) -> Direction {
        Direction::LowerBetter
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}
