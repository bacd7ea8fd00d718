//! Link-prediction ranking metric (MRR).
//!
//! Scores arrive grouped by canonical edge type. Each group holds one or more
//! [`RankingBatch`]es pairing a positive edge score per sample with a row of
//! negative (corrupted) edge scores. The rank of a positive is its 1-based
//! position when `[positive, negatives...]` is sorted best-first; ties are
//! resolved in favour of the positive.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::{Array1, Array2, Axis};
use serde::Deserialize;

use crate::error::ShapeError;
use crate::utils::Parallelism;

// =============================================================================
// Edge types and scoring direction
// =============================================================================

/// Canonical edge type `(source node type, relation, destination node type)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeType {
    pub src: String,
    pub rel: String,
    pub dst: String,
}

impl EdgeType {
    pub fn new(src: impl Into<String>, rel: impl Into<String>, dst: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            rel: rel.into(),
            dst: dst.into(),
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.src, self.rel, self.dst)
    }
}

/// How the link decoder scores edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkScoring {
    /// Similarity scores (dot product, DistMult): higher ranks first.
    #[default]
    DotProduct,
    /// Distance scores: lower ranks first.
    Distance,
}

impl LinkScoring {
    /// Returns true if `negative` is ranked strictly ahead of `positive`.
    #[inline]
    pub fn outranks(self, negative: f32, positive: f32) -> bool {
        match self {
            LinkScoring::DotProduct => negative > positive,
            LinkScoring::Distance => negative < positive,
        }
    }
}

// =============================================================================
// Score containers
// =============================================================================

/// Positive scores `[n_samples]` and their negatives `[n_samples, n_negatives]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingBatch {
    pub positive: Array1<f32>,
    pub negative: Array2<f32>,
}

impl RankingBatch {
    pub fn new(positive: Array1<f32>, negative: Array2<f32>) -> Self {
        Self { positive, negative }
    }

    /// Build from a positive column `[n_samples, 1]`, the layout decoders emit.
    pub fn from_column(positive: Array2<f32>, negative: Array2<f32>) -> Self {
        let positive = positive.index_axis_move(Axis(1), 0);
        Self { positive, negative }
    }

    pub fn n_samples(&self) -> usize {
        self.positive.len()
    }
}

/// Ranking batches keyed by edge type.
///
/// Iteration follows edge-type order, so every worker walks the batches in
/// the same sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkScores {
    batches: BTreeMap<EdgeType, Vec<RankingBatch>>,
}

impl LinkScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch for `etype`.
    pub fn push(&mut self, etype: EdgeType, batch: RankingBatch) {
        self.batches.entry(etype).or_default().push(batch);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EdgeType, &[RankingBatch])> {
        self.batches.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn n_batches(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.n_batches() == 0
    }
}

impl FromIterator<(EdgeType, RankingBatch)> for LinkScores {
    fn from_iter<I: IntoIterator<Item = (EdgeType, RankingBatch)>>(iter: I) -> Self {
        let mut scores = LinkScores::new();
        for (etype, batch) in iter {
            scores.push(etype, batch);
        }
        scores
    }
}

// =============================================================================
// MRR
// =============================================================================

/// Check every batch before ranking.
///
/// When `num_negatives` is set, each negative row must have exactly that width.
pub fn validate(scores: &LinkScores, num_negatives: Option<usize>) -> Result<(), ShapeError> {
    if scores.is_empty() {
        return Err(ShapeError::Empty { what: "link scores" });
    }
    for (_, batches) in scores.iter() {
        for batch in batches {
            if batch.n_samples() == 0 {
                return Err(ShapeError::Empty { what: "ranking batch" });
            }
            if batch.negative.nrows() != batch.n_samples() {
                return Err(ShapeError::RowMismatch {
                    what: "ranking batch",
                    predictions: batch.n_samples(),
                    labels: batch.negative.nrows(),
                });
            }
            let width = batch.negative.ncols();
            match num_negatives {
                Some(expected) if width != expected => {
                    return Err(ShapeError::ColumnMismatch {
                        what: "negative scores",
                        expected,
                        got: width,
                    });
                }
                None if width == 0 => {
                    return Err(ShapeError::Empty { what: "negative scores" });
                }
                _ => {}
            }
            check_finite_scores(batch)?;
        }
    }
    Ok(())
}

/// Ranking against a NaN is undefined, so every score must be finite.
fn check_finite_scores(batch: &RankingBatch) -> Result<(), ShapeError> {
    if let Some(row) = batch.positive.iter().position(|v| !v.is_finite()) {
        return Err(ShapeError::NonFinite {
            what: "positive scores",
            row,
        });
    }
    let bad_row = batch
        .negative
        .axis_iter(Axis(0))
        .position(|row| row.iter().any(|v| !v.is_finite()));
    match bad_row {
        Some(row) => Err(ShapeError::NonFinite {
            what: "negative scores",
            row,
        }),
        None => Ok(()),
    }
}

/// 1-based rank of each positive among its negatives.
pub fn positive_ranks(batch: &RankingBatch, scoring: LinkScoring) -> Vec<usize> {
    batch
        .positive
        .iter()
        .zip(batch.negative.axis_iter(Axis(0)))
        .map(|(&pos, negatives)| {
            1 + negatives
                .iter()
                .filter(|&&neg| scoring.outranks(neg, pos))
                .count()
        })
        .collect()
}

/// Sum of reciprocal ranks in one batch, with the sample count.
fn reciprocal_rank_sum(batch: &RankingBatch, scoring: LinkScoring) -> (f64, usize) {
    let ranks = positive_ranks(batch, scoring);
    let sum = ranks.iter().map(|&r| 1.0 / r as f64).sum::<f64>();
    (sum, ranks.len())
}

/// Mean reciprocal rank over every sample of every batch of every edge type.
///
/// Batches may be ranked in parallel; partial sums are reduced in edge-type
/// order so the result does not depend on `parallelism`.
pub fn mrr(scores: &LinkScores, scoring: LinkScoring, parallelism: Parallelism) -> f64 {
    let batches: Vec<&RankingBatch> = scores.iter().flat_map(|(_, b)| b.iter()).collect();
    let partials = parallelism.maybe_par_map(&batches, |batch| reciprocal_rank_sum(batch, scoring));

    let (sum, count) = partials
        .into_iter()
        .fold((0.0f64, 0usize), |(s, c), (bs, bc)| (s + bs, c + bc));
    sum / count as f64
}
