//! Evaluator integration tests.
//!
//! Covers best-score tracking, the absent-validation sentinel, the frequency
//! gate, the rank table and early stopping through a full [`Evaluator`].

use gnn_eval::error::{EvalError, ShapeError};
use gnn_eval::model::ConfigError;
use gnn_eval::testing::ScriptedScorer;
use gnn_eval::training::{
    EarlyStopConfig, EarlyStopStrategy, EvalFrequency, Evaluator, LabeledPredictions, MetricKind,
    RegressionScorer, ScoreMap, NO_SCORE,
};
use ndarray::array;
use rstest::rstest;

// =============================================================================
// Helpers
// =============================================================================

fn scripted(metric: MetricKind, values: &[f64]) -> Evaluator<ScriptedScorer> {
    scripted_with(metric, values, EvalFrequency(100), EarlyStopConfig::default())
}

fn scripted_with(
    metric: MetricKind,
    values: &[f64],
    frequency: EvalFrequency,
    early_stop: EarlyStopConfig,
) -> Evaluator<ScriptedScorer> {
    Evaluator::with_parts(
        ScriptedScorer::from_values(metric, values),
        vec![metric],
        frequency,
        early_stop,
    )
    .unwrap()
}

fn early_stop(strategy: EarlyStopStrategy) -> EarlyStopConfig {
    EarlyStopConfig {
        enabled: true,
        calls_to_consider: 5,
        window_size: 3,
        strategy,
    }
}

fn score(metric: MetricKind, value: f64) -> ScoreMap {
    [(metric, value)].into_iter().collect()
}

// =============================================================================
// Best-score tracking
// =============================================================================

/// Scores are scripted validation first, then test, for each call.
#[rstest]
#[case::accuracy(
    MetricKind::Accuracy,
    &[0.7, 0.65, 0.8, 0.7, 0.76, 0.8],
    &[100, 200, 300],
    (0.8, 0.7, 200)
)]
#[case::rmse(
    MetricKind::Rmse,
    &[0.7, 0.8, 0.2, 0.23, 0.3, 0.31],
    &[100, 300, 500],
    (0.2, 0.23, 300)
)]
#[case::mrr(
    MetricKind::Mrr,
    &[0.7, 0.6, 0.8, 0.65, 0.7, 0.8],
    &[100, 200, 300],
    (0.8, 0.65, 200)
)]
fn tracks_best_scores(
    #[case] metric: MetricKind,
    #[case] script: &[f64],
    #[case] iters: &[u64],
    #[case] expected: (f64, f64, u64),
) {
    let mut evaluator = scripted(metric, script);

    for (i, &iter) in iters.iter().enumerate() {
        let (val, test) = evaluator.evaluate(Some(()), Some(()), iter).unwrap();
        assert_eq!(val[metric], script[2 * i]);
        assert_eq!(test[metric], script[2 * i + 1]);
    }

    assert_eq!(evaluator.best_val_score(metric), Some(expected.0));
    assert_eq!(evaluator.best_test_score(metric), Some(expected.1));
    assert_eq!(evaluator.best_iter_num(metric), Some(expected.2));
}

#[test]
fn absent_validation_reports_sentinel_and_keeps_best() {
    let mut evaluator = scripted(MetricKind::Mrr, &[0.6, 0.7]);

    let (val, test) = evaluator.evaluate(None, Some(()), 100).unwrap();
    assert_eq!(val[MetricKind::Mrr], NO_SCORE);
    assert_eq!(test[MetricKind::Mrr], 0.6);

    let (val, test) = evaluator.evaluate(None, Some(()), 200).unwrap();
    assert_eq!(val[MetricKind::Mrr], NO_SCORE);
    assert_eq!(test[MetricKind::Mrr], 0.7);

    assert_eq!(evaluator.best_val_score(MetricKind::Mrr), Some(0.0));
    assert_eq!(evaluator.best_test_score(MetricKind::Mrr), Some(0.0));
    assert_eq!(evaluator.best_iter_num(MetricKind::Mrr), Some(0));
    assert!(evaluator.history().is_empty());
}

#[test]
fn absent_test_reports_sentinel() {
    let mut evaluator = scripted(MetricKind::Accuracy, &[0.9]);
    let (val, test) = evaluator.evaluate(Some(()), None, 10).unwrap();
    assert_eq!(val[MetricKind::Accuracy], 0.9);
    assert_eq!(test[MetricKind::Accuracy], NO_SCORE);
    assert_eq!(evaluator.best_test_score(MetricKind::Accuracy), Some(NO_SCORE));
}

#[test]
fn evaluate_scores_each_split_once() {
    let mut evaluator = scripted(MetricKind::Rmse, &[0.5, 0.4, 0.3, 0.2, 0.1]);

    evaluator.evaluate(Some(()), Some(()), 0).unwrap();
    assert_eq!(evaluator.scorer().calls(), 2);

    evaluator.evaluate(None, Some(()), 1).unwrap();
    assert_eq!(evaluator.scorer().calls(), 3);

    evaluator.evaluate(Some(()), None, 2).unwrap();
    assert_eq!(evaluator.scorer().calls(), 4);
    assert_eq!(evaluator.history().n_records(), 2);
}

#[test]
fn shape_errors_propagate_unchanged() {
    let mut evaluator = Evaluator::with_parts(
        RegressionScorer,
        vec![MetricKind::Rmse],
        EvalFrequency(1),
        EarlyStopConfig::default(),
    )
    .unwrap();

    let preds = array![[1.0f32], [2.0], [3.0]];
    let labels = array![[1.0f32], [2.0]];
    let split = LabeledPredictions::new(preds.view(), labels.view());

    let err = evaluator.evaluate(Some(split), None, 1).unwrap_err();
    assert!(matches!(
        err,
        EvalError::Shape(ShapeError::RowMismatch {
            predictions: 3,
            labels: 2,
            ..
        })
    ));
    assert_eq!(evaluator.best_val_score(MetricKind::Rmse), Some(f64::INFINITY));
    assert!(evaluator.history().is_empty());
}

#[test]
fn non_finite_predictions_fail_evaluation() {
    let mut evaluator = Evaluator::with_parts(
        RegressionScorer,
        vec![MetricKind::Rmse],
        EvalFrequency(1),
        EarlyStopConfig::default(),
    )
    .unwrap();

    let preds = array![[f32::NAN], [2.0]];
    let labels = array![[1.0f32], [2.0]];
    let split = LabeledPredictions::new(preds.view(), labels.view());

    let err = evaluator.evaluate(Some(split), None, 1).unwrap_err();
    assert!(matches!(
        err,
        EvalError::Shape(ShapeError::NonFinite {
            what: "predictions",
            row: 0
        })
    ));
    assert_eq!(evaluator.best_val_score(MetricKind::Rmse), Some(f64::INFINITY));
    assert!(evaluator.history().is_empty());
}

#[test]
fn rejects_metrics_the_scorer_cannot_compute() {
    let result = Evaluator::with_parts(
        RegressionScorer,
        vec![MetricKind::Rmse, MetricKind::Accuracy],
        EvalFrequency(1),
        EarlyStopConfig::default(),
    );
    assert_eq!(
        result.err(),
        Some(ConfigError::UnsupportedMetric {
            metric: MetricKind::Accuracy
        })
    );

    let result = Evaluator::with_parts(
        RegressionScorer,
        Vec::new(),
        EvalFrequency(1),
        EarlyStopConfig::default(),
    );
    assert_eq!(result.err(), Some(ConfigError::NoMetrics));
}

// =============================================================================
// Frequency gate
// =============================================================================

#[rstest]
#[case(100, 120, true, true)]
#[case(100, 200, false, true)]
#[case(100, 0, false, true)]
#[case(100, 1, false, false)]
#[case(0, 120, true, true)]
#[case(0, 200, false, false)]
fn do_eval(#[case] frequency: u64, #[case] step: u64, #[case] epoch_end: bool, #[case] expected: bool) {
    let evaluator = scripted_with(
        MetricKind::Accuracy,
        &[],
        EvalFrequency(frequency),
        EarlyStopConfig::default(),
    );
    assert_eq!(evaluator.do_eval(step, epoch_end), expected);
}

// =============================================================================
// Rank table
// =============================================================================

#[rstest]
#[case::accuracy(MetricKind::Accuracy, [1, 2, 1, 3])]
#[case::mse(MetricKind::Mse, [1, 1, 3, 3])]
#[case::rmse(MetricKind::Rmse, [1, 1, 3, 3])]
#[case::mrr(MetricKind::Mrr, [1, 2, 1, 3])]
fn val_score_rank(#[case] metric: MetricKind, #[case] expected: [usize; 4]) {
    let mut evaluator = scripted(metric, &[]);
    for (value, rank) in [0.47, 0.40, 0.7, 0.47].into_iter().zip(expected) {
        assert_eq!(evaluator.get_val_score_rank(&score(metric, value)), vec![(metric, rank)]);
    }
}

#[test]
fn rank_reads_scores_recorded_by_evaluate() {
    let mut evaluator = scripted(MetricKind::Accuracy, &[0.47, 0.0, 0.40, 0.0, 0.7, 0.0]);

    let mut ranks = Vec::new();
    for iter in [100, 200, 300] {
        let (val, _) = evaluator.evaluate(Some(()), Some(()), iter).unwrap();
        ranks.push(evaluator.get_val_score_rank(&val)[0].1);
    }
    assert_eq!(ranks, vec![1, 2, 1]);
    assert_eq!(evaluator.history().scores(MetricKind::Accuracy), &[0.47, 0.40, 0.7]);
}

#[test]
fn rank_before_any_evaluation_is_first() {
    let mut evaluator = scripted(MetricKind::Rmse, &[]);
    assert_eq!(
        evaluator.get_val_score_rank(&score(MetricKind::Rmse, 3.0)),
        vec![(MetricKind::Rmse, 1)]
    );
}

// =============================================================================
// Early stopping
// =============================================================================

#[test]
fn disabled_early_stop_never_stops() {
    let mut evaluator = scripted_with(
        MetricKind::Rmse,
        &[],
        EvalFrequency(100),
        EarlyStopConfig {
            enabled: false,
            ..early_stop(EarlyStopStrategy::ConsecutiveIncrease)
        },
    );
    for _ in 0..10 {
        assert!(!evaluator.do_early_stop(&score(MetricKind::Rmse, 0.1)));
    }
}

#[rstest]
#[case::rmse_consecutive(
    MetricKind::Rmse,
    EarlyStopStrategy::ConsecutiveIncrease,
    0.5,
    0.4,
    &[(0.3, false), (0.32, false), (0.3, false), (0.32, true)]
)]
#[case::accuracy_average(
    MetricKind::Accuracy,
    EarlyStopStrategy::AverageIncrease,
    0.5,
    0.6,
    &[(0.7, false), (0.68, false), (0.66, true)]
)]
#[case::mrr_consecutive(
    MetricKind::Mrr,
    EarlyStopStrategy::ConsecutiveIncrease,
    0.5,
    0.4,
    &[(0.5, false), (0.45, false), (0.45, false), (0.45, true)]
)]
fn early_stop_sequences(
    #[case] metric: MetricKind,
    #[case] strategy: EarlyStopStrategy,
    #[case] warm_up: f64,
    #[case] filler: f64,
    #[case] tail: &[(f64, bool)],
) {
    let mut evaluator = scripted_with(metric, &[], EvalFrequency(100), early_stop(strategy));

    for _ in 0..5 {
        assert!(!evaluator.do_early_stop(&score(metric, warm_up)));
    }
    for _ in 0..3 {
        // not enough data points
        assert!(!evaluator.do_early_stop(&score(metric, filler)));
    }
    for &(value, expected) in tail {
        assert_eq!(evaluator.do_early_stop(&score(metric, value)), expected, "score {value}");
    }
}

#[test]
fn early_stop_and_rank_share_history_with_evaluate() {
    let vals = [0.5, 0.5, 0.5, 0.5, 0.5, 0.4, 0.4, 0.4, 0.3, 0.32, 0.3, 0.32];
    let script: Vec<f64> = vals.iter().flat_map(|&v| [v, 1.0]).collect();
    let mut evaluator = scripted_with(
        MetricKind::Rmse,
        &script,
        EvalFrequency(100),
        early_stop(EarlyStopStrategy::ConsecutiveIncrease),
    );

    let mut stops = Vec::new();
    for (i, _) in vals.iter().enumerate() {
        let (val, _) = evaluator.evaluate(Some(()), Some(()), i as u64 * 100).unwrap();
        evaluator.get_val_score_rank(&val);
        stops.push(evaluator.do_early_stop(&val));
    }

    assert_eq!(stops.iter().filter(|&&s| s).count(), 1);
    assert!(stops[11]);
    assert_eq!(evaluator.history().scores(MetricKind::Rmse).len(), vals.len());
}

#[test]
fn one_evaluation_is_recorded_once_even_when_nan() {
    let mut evaluator = scripted_with(
        MetricKind::Rmse,
        &[f64::NAN],
        EvalFrequency(100),
        early_stop(EarlyStopStrategy::AverageIncrease),
    );

    let (val, _) = evaluator.evaluate(Some(()), None, 100).unwrap();
    evaluator.get_val_score_rank(&val);
    assert!(!evaluator.do_early_stop(&val));
    assert_eq!(evaluator.history().n_records(), 1);
    assert_eq!(evaluator.history().scores(MetricKind::Rmse).len(), 1);
}

#[test]
fn readers_consume_the_evaluated_record_by_position() {
    let mut evaluator = scripted_with(
        MetricKind::Accuracy,
        &[0.5],
        EvalFrequency(100),
        early_stop(EarlyStopStrategy::ConsecutiveIncrease),
    );

    evaluator.evaluate(Some(()), None, 100).unwrap();
    // A copy that differs in the last bits still counts as the same evaluation.
    let copy = score(MetricKind::Accuracy, 0.5 + f64::EPSILON);
    assert_eq!(
        evaluator.get_val_score_rank(&copy),
        vec![(MetricKind::Accuracy, 1)]
    );
    evaluator.do_early_stop(&copy);
    assert_eq!(evaluator.history().n_records(), 1);

    // Nothing left unread: a further standalone score is a new record.
    evaluator.get_val_score_rank(&score(MetricKind::Accuracy, 0.6));
    assert_eq!(evaluator.history().n_records(), 2);
}

#[test]
fn early_stop_without_its_metric_continues() {
    let mut evaluator = scripted_with(
        MetricKind::Mrr,
        &[],
        EvalFrequency(100),
        EarlyStopConfig {
            calls_to_consider: 0,
            window_size: 1,
            ..early_stop(EarlyStopStrategy::ConsecutiveIncrease)
        },
    );
    for _ in 0..5 {
        assert!(!evaluator.do_early_stop(&score(MetricKind::Accuracy, 0.1)));
    }
    assert!(evaluator.history().is_empty());
}
