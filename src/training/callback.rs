//! Early stopping callback for training.
//!
//! Watches the validation history of one metric and signals when the newest
//! score no longer improves on a trailing window of earlier scores.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::metrics::Direction;
use crate::model::ConfigError;

// =============================================================================
// Strategy and configuration
// =============================================================================

/// Rule deciding whether a score has stopped improving over the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum EarlyStopStrategy {
    /// Stop when the score is no better than every score in the window.
    ConsecutiveIncrease,
    /// Stop when the score is no better than the window average.
    #[default]
    AverageIncrease,
}

impl EarlyStopStrategy {
    pub fn name(self) -> &'static str {
        match self {
            EarlyStopStrategy::ConsecutiveIncrease => "consecutive_increase",
            EarlyStopStrategy::AverageIncrease => "average_increase",
        }
    }

    /// Apply the strategy's judge to `score` and `window`.
    #[inline]
    pub fn judge(self, score: f64, window: &[f64], direction: Direction) -> bool {
        match self {
            EarlyStopStrategy::ConsecutiveIncrease => cons_increase_judge(score, window, direction),
            EarlyStopStrategy::AverageIncrease => avg_increase_judge(score, window, direction),
        }
    }
}

impl FromStr for EarlyStopStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consecutive_increase" => Ok(EarlyStopStrategy::ConsecutiveIncrease),
            "average_increase" => Ok(EarlyStopStrategy::AverageIncrease),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}

impl TryFrom<String> for EarlyStopStrategy {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for EarlyStopStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable early-stop settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarlyStopConfig {
    pub enabled: bool,
    /// Number of calls that never stop, counted from the first call.
    pub calls_to_consider: usize,
    /// Number of earlier scores the newest one is compared against.
    pub window_size: usize,
    pub strategy: EarlyStopStrategy,
}

impl Default for EarlyStopConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            calls_to_consider: 0,
            window_size: 3,
            strategy: EarlyStopStrategy::default(),
        }
    }
}

// =============================================================================
// Judges
// =============================================================================

/// Returns true if `score` is worse than or equal to the mean of `window`.
///
/// The mean is accumulated oldest first. An empty window never stops.
pub fn avg_increase_judge(score: f64, window: &[f64], direction: Direction) -> bool {
    if window.is_empty() {
        return false;
    }
    let mut sum = 0.0f64;
    for &old in window {
        sum += old;
    }
    let average = sum / window.len() as f64;
    direction.is_worse_or_equal(score, average)
}

/// Returns true if `score` is worse than or equal to every score in `window`.
///
/// An empty window never stops.
pub fn cons_increase_judge(score: f64, window: &[f64], direction: Direction) -> bool {
    !window.is_empty()
        && window
            .iter()
            .all(|&old| direction.is_worse_or_equal(score, old))
}

// =============================================================================
// EarlyStopping
// =============================================================================

/// Early stopping state.
///
/// Each call to [`should_stop`](EarlyStopping::should_stop) passes the
/// metric's history *before* the newest score, plus that score. The first
/// `calls_to_consider` calls are a warm-up and never stop; scores recorded
/// during warm-up are also kept out of the comparison window. After warm-up
/// the policy waits until `window_size` post-warm-up scores precede the
/// newest one, then applies the strategy to the last `window_size` of them.
///
/// # Example
///
/// ```
/// use gnn_eval::training::{Direction, EarlyStopConfig, EarlyStopStrategy, EarlyStopping};
///
/// let config = EarlyStopConfig {
///     enabled: true,
///     calls_to_consider: 0,
///     window_size: 2,
///     strategy: EarlyStopStrategy::ConsecutiveIncrease,
/// };
/// let mut early_stop = EarlyStopping::new(config, Direction::LowerBetter);
///
/// let mut history = Vec::new();
/// for rmse in [0.5, 0.4, 0.45, 0.41] {
///     if early_stop.should_stop(&history, rmse) {
///         println!("stopping at rmse {}", rmse);
///         break;
///     }
///     history.push(rmse);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    config: EarlyStopConfig,
    direction: Direction,
    /// Calls made while enabled.
    n_calls: usize,
    /// First history index eligible for the window.
    window_start: Option<usize>,
}

impl EarlyStopping {
    pub fn new(config: EarlyStopConfig, direction: Direction) -> Self {
        Self {
            config,
            direction,
            n_calls: 0,
            window_start: None,
        }
    }

    /// Check whether training should stop.
    ///
    /// `history` holds every earlier score of the metric, oldest first, and
    /// must not contain `score` itself.
    pub fn should_stop(&mut self, history: &[f64], score: f64) -> bool {
        if !self.config.enabled {
            return false;
        }

        self.n_calls += 1;
        if self.n_calls <= self.config.calls_to_consider {
            // The current score belongs to the warm-up as well.
            self.window_start = Some(history.len() + 1);
            return false;
        }

        let start = (*self.window_start.get_or_insert(history.len())).min(history.len());
        let eligible = &history[start..];
        let window_size = self.config.window_size;
        if window_size == 0 || eligible.len() < window_size {
            return false;
        }

        let window = &eligible[eligible.len() - window_size..];
        self.config.strategy.judge(score, window, self.direction)
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn config(&self) -> &EarlyStopConfig {
        &self.config
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of calls made while enabled.
    pub fn n_calls(&self) -> usize {
        self.n_calls
    }

    /// Reset the early stopping state.
    pub fn reset(&mut self) {
        self.n_calls = 0;
        self.window_start = None;
    }
}
