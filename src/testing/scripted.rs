use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

use crate::error::ShapeError;
use crate::training::{BestScores, MetricKind, ScoreFn, ScoreMap, TaskTracker};

/// Scorer that replays a fixed sequence of score maps.
///
/// Each `compute_score` call pops the next map, whatever the input. Once the
/// script is exhausted the call fails with [`ShapeError::Empty`].
#[derive(Debug, Default)]
pub struct ScriptedScorer {
    script: RefCell<VecDeque<ScoreMap>>,
    calls: Cell<usize>,
}

impl ScriptedScorer {
    pub fn new(script: impl IntoIterator<Item = ScoreMap>) -> Self {
        Self {
            script: RefCell::new(script.into_iter().collect()),
            calls: Cell::new(0),
        }
    }

    /// Script of single-metric maps.
    pub fn from_values(metric: MetricKind, values: &[f64]) -> Self {
        Self::new(values.iter().map(|&v| [(metric, v)].into_iter().collect()))
    }

    /// Number of `compute_score` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn remaining(&self) -> usize {
        self.script.borrow().len()
    }
}

impl ScoreFn for ScriptedScorer {
    type Input<'a> = ();

    fn supports(&self, _metric: MetricKind) -> bool {
        true
    }

    fn compute_score(&self, _input: (), _metrics: &[MetricKind]) -> Result<ScoreMap, ShapeError> {
        self.calls.set(self.calls.get() + 1);
        self.script
            .borrow_mut()
            .pop_front()
            .ok_or(ShapeError::Empty {
                what: "scripted scores",
            })
    }
}

/// Event received by a [`RecordingTracker`].
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    Metrics {
        step: u64,
        val: ScoreMap,
        test: ScoreMap,
    },
    Best {
        step: u64,
        best: BestScores,
    },
    EarlyStop {
        step: u64,
        metric: MetricKind,
    },
}

/// Tracker that keeps every event in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracker {
    pub events: Vec<TrackerEvent>,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn early_stops(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TrackerEvent::EarlyStop { .. }))
            .count()
    }
}

impl TaskTracker for RecordingTracker {
    fn log_metrics(&mut self, step: u64, val: &ScoreMap, test: &ScoreMap, _duration: Duration) {
        self.events.push(TrackerEvent::Metrics {
            step,
            val: val.clone(),
            test: test.clone(),
        });
    }

    fn log_best(&mut self, step: u64, best: &BestScores) {
        self.events.push(TrackerEvent::Best {
            step,
            best: best.clone(),
        });
    }

    fn log_early_stop(&mut self, step: u64, metric: MetricKind) {
        self.events.push(TrackerEvent::EarlyStop { step, metric });
    }
}
