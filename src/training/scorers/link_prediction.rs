//! Link prediction scoring.

use crate::error::ShapeError;
use crate::training::eval::ScoreFn;
use crate::training::metrics::ranking::{self, LinkScores, LinkScoring};
use crate::training::metrics::{MetricKind, ScoreMap};
use crate::utils::Parallelism;

use super::collect_scores;

/// Ranks positive edges against their negatives and reports MRR.
#[derive(Debug, Clone, Copy, Default)]
pub struct MrrScorer {
    pub scoring: LinkScoring,
    /// Expected width of every negative batch, if known.
    pub num_negative_edges: Option<usize>,
    pub parallelism: Parallelism,
}

impl MrrScorer {
    pub fn new(scoring: LinkScoring) -> Self {
        Self {
            scoring,
            ..Default::default()
        }
    }

    pub fn with_num_negative_edges(mut self, num_negative_edges: usize) -> Self {
        self.num_negative_edges = Some(num_negative_edges);
        self
    }

    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }
}

impl ScoreFn for MrrScorer {
    type Input<'a> = &'a LinkScores;

    fn supports(&self, metric: MetricKind) -> bool {
        metric == MetricKind::Mrr
    }

    fn compute_score(
        &self,
        input: &LinkScores,
        metrics: &[MetricKind],
    ) -> Result<ScoreMap, ShapeError> {
        ranking::validate(input, self.num_negative_edges)?;
        let mrr = ranking::mrr(input, self.scoring, self.parallelism);
        Ok(collect_scores(metrics, |metric| {
            (metric == MetricKind::Mrr).then_some(mrr)
        }))
    }
}
