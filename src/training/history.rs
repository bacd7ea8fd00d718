//! Validation score history and the metric ranking table.
//!
//! [`ValPerfHistory`] is the single append-only record of validation scores
//! owned by an evaluator. Both the rank table and the early-stop policy read
//! it. Each of them holds a [`HistoryCursor`] so that a score map recorded by
//! `evaluate` is consumed once per reader instead of being appended again.

use super::metrics::{Direction, MetricKind, ScoreMap};

/// 1-based rank of `candidate` among `history` plus the candidate itself.
///
/// Every earlier score that is better than or equal to the candidate pushes
/// it down one place, so a score tying an earlier one takes the worse rank.
///
/// With lower-better scores `0.47, 0.40, 0.7, 0.47` queried one after the
/// other, the ranks are `1, 1, 3, 3`.
pub fn get_rank(history: &[f64], candidate: f64, direction: Direction) -> usize {
    1 + history
        .iter()
        .filter(|&&old| direction.is_better_or_equal(old, candidate))
        .count()
}

/// Read position of one history consumer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryCursor {
    seen: u64,
}

/// Append-only validation scores, one sequence per configured metric.
#[derive(Debug, Clone)]
pub struct ValPerfHistory {
    metrics: Vec<MetricKind>,
    scores: Vec<Vec<f64>>,
    n_records: u64,
}

impl ValPerfHistory {
    pub fn new(metrics: &[MetricKind]) -> Self {
        Self {
            metrics: metrics.to_vec(),
            scores: vec![Vec::new(); metrics.len()],
            n_records: 0,
        }
    }

    /// Append every configured metric found in `scores`.
    ///
    /// Metrics that are not configured are ignored.
    pub fn record(&mut self, scores: &ScoreMap) {
        for (slot, &metric) in self.scores.iter_mut().zip(&self.metrics) {
            if let Some(value) = scores.get(metric) {
                slot.push(value);
            }
        }
        self.n_records += 1;
    }

    /// Make sure the newest record is `scores` from the point of view of `cursor`.
    ///
    /// A record this cursor has not read yet is consumed, whatever its
    /// values. Otherwise `scores` is appended as a new record.
    pub(crate) fn observe(&mut self, cursor: &mut HistoryCursor, scores: &ScoreMap) {
        if cursor.seen >= self.n_records {
            self.record(scores);
        }
        cursor.seen = self.n_records;
    }

    /// Recorded scores of `metric`, oldest first.
    pub fn scores(&self, metric: MetricKind) -> &[f64] {
        self.metrics
            .iter()
            .position(|&m| m == metric)
            .map(|idx| self.scores[idx].as_slice())
            .unwrap_or(&[])
    }

    /// Number of score maps recorded so far.
    pub fn n_records(&self) -> u64 {
        self.n_records
    }

    pub fn is_empty(&self) -> bool {
        self.n_records == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(metric: MetricKind, value: f64) -> ScoreMap {
        [(metric, value)].into_iter().collect()
    }

    #[test]
    fn rank_ties_take_worse_place() {
        let dir = Direction::LowerBetter;
        assert_eq!(get_rank(&[], 0.47, dir), 1);
        assert_eq!(get_rank(&[0.47], 0.40, dir), 1);
        assert_eq!(get_rank(&[0.47, 0.40], 0.7, dir), 3);
        assert_eq!(get_rank(&[0.47, 0.40, 0.7], 0.47, dir), 3);

        let dir = Direction::HigherBetter;
        assert_eq!(get_rank(&[0.47], 0.40, dir), 2);
        assert_eq!(get_rank(&[0.47, 0.40], 0.7, dir), 1);
        assert_eq!(get_rank(&[0.47, 0.40, 0.7], 0.47, dir), 3);
    }

    #[test]
    fn observe_consumes_latest_record_once() {
        let mut history = ValPerfHistory::new(&[MetricKind::Rmse]);
        let mut a = HistoryCursor::default();
        let mut b = HistoryCursor::default();

        history.record(&map(MetricKind::Rmse, 0.5));
        history.observe(&mut a, &map(MetricKind::Rmse, 0.5));
        history.observe(&mut b, &map(MetricKind::Rmse, 0.5));
        assert_eq!(history.scores(MetricKind::Rmse), &[0.5]);

        // Already read by `a`: a second call is a new observation.
        history.observe(&mut a, &map(MetricKind::Rmse, 0.5));
        assert_eq!(history.scores(MetricKind::Rmse), &[0.5, 0.5]);
    }

    #[test]
    fn observe_consumes_by_position_not_value() {
        let mut history = ValPerfHistory::new(&[MetricKind::Mrr]);
        let mut cursor = HistoryCursor::default();

        history.record(&map(MetricKind::Mrr, f64::NAN));
        history.observe(&mut cursor, &map(MetricKind::Mrr, f64::NAN));
        assert_eq!(history.n_records(), 1);

        // Nothing unread: the next observation is appended.
        history.observe(&mut cursor, &map(MetricKind::Mrr, 0.2));
        assert_eq!(history.n_records(), 2);
        assert_eq!(history.scores(MetricKind::Mrr)[1], 0.2);
    }

    #[test]
    fn unconfigured_metric_is_empty() {
        let mut history = ValPerfHistory::new(&[MetricKind::Mrr]);
        history.record(&map(MetricKind::Accuracy, 0.9));
        assert!(history.scores(MetricKind::Accuracy).is_empty());
        assert!(history.scores(MetricKind::Mrr).is_empty());
    }
}
