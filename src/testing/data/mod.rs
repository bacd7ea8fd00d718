use ndarray::{Array1, Array2};
use rand::prelude::*;

use crate::training::{EdgeType, LinkScores, RankingBatch};

/// Generate a random `[rows, cols]` score matrix.
///
/// Values are uniform in `[min, max]`.
pub fn random_scores_array(rows: usize, cols: usize, seed: u64, min: f32, max: f32) -> Array2<f32> {
	assert!(max >= min);
	let mut rng = StdRng::seed_from_u64(seed);
	let width = max - min;
	Array2::from_shape_fn((rows, cols), |_| min + rng.r#gen::<f32>() * width)
}

/// Generate class probabilities and class ids.
///
/// Each row of the returned predictions sums to one. Labels are drawn
/// uniformly and stored as `f32` in a `[rows, 1]` matrix.
pub fn random_class_predictions(rows: usize, num_classes: usize, seed: u64) -> (Array2<f32>, Array2<f32>) {
	assert!(num_classes >= 2);
	let mut rng = StdRng::seed_from_u64(seed);

	let mut predictions = Array2::from_shape_fn((rows, num_classes), |_| rng.r#gen::<f32>() + 1e-3);
	for mut row in predictions.rows_mut() {
		let total = row.sum();
		row.mapv_inplace(|v| v / total);
	}
	let labels = Array2::from_shape_fn((rows, 1), |_| rng.gen_range(0..num_classes) as f32);
	(predictions, labels)
}

/// Generate 0/1 multilabel targets with matching probabilities.
pub fn random_multilabel_predictions(rows: usize, num_labels: usize, seed: u64) -> (Array2<f32>, Array2<f32>) {
	let mut rng = StdRng::seed_from_u64(seed);
	let predictions = Array2::from_shape_fn((rows, num_labels), |_| rng.r#gen::<f32>());
	let labels = Array2::from_shape_fn((rows, num_labels), |_| if rng.r#gen::<bool>() { 1.0 } else { 0.0 });
	(predictions, labels)
}

/// Generate regression targets and predictions equal to them plus uniform noise.
///
/// Returns `(predictions, targets)`, both `[rows, num_targets]`.
pub fn random_regression_predictions(
	rows: usize,
	num_targets: usize,
	seed: u64,
	noise_amplitude: f32,
) -> (Array2<f32>, Array2<f32>) {
	let mut rng = StdRng::seed_from_u64(seed);
	let targets = Array2::from_shape_fn((rows, num_targets), |_| rng.r#gen::<f32>() * 10.0 - 5.0);
	let predictions = targets.mapv(|t| t + (rng.r#gen::<f32>() * 2.0 - 1.0) * noise_amplitude);
	(predictions, targets)
}

/// Generate one ranking batch of `num_samples` positives, each with
/// `num_negatives` negative scores. All scores are uniform in `[0, 1)`.
pub fn random_ranking_batch(num_samples: usize, num_negatives: usize, seed: u64) -> RankingBatch {
	let mut rng = StdRng::seed_from_u64(seed);
	let positive = Array1::from_shape_fn(num_samples, |_| rng.r#gen::<f32>());
	let negative = Array2::from_shape_fn((num_samples, num_negatives), |_| rng.r#gen::<f32>());
	RankingBatch::new(positive, negative)
}

/// Generate link scores for `num_etypes` relations `("u", "r{i}", "v")`,
/// each with `batches_per_etype` ranking batches.
pub fn random_link_scores(
	num_etypes: usize,
	batches_per_etype: usize,
	num_samples: usize,
	num_negatives: usize,
	seed: u64,
) -> LinkScores {
	let mut scores = LinkScores::new();
	for e in 0..num_etypes {
		let etype = EdgeType::new("u", format!("r{e}"), "v");
		for b in 0..batches_per_etype {
			let batch_seed = seed.wrapping_add((e * batches_per_etype + b) as u64);
			scores.push(etype.clone(), random_ranking_batch(num_samples, num_negatives, batch_seed));
		}
	}
	scores
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	#[test]
	fn generators_are_deterministic() {
		assert_eq!(random_scores_array(4, 3, 7, -1.0, 1.0), random_scores_array(4, 3, 7, -1.0, 1.0));
		assert_eq!(random_link_scores(2, 2, 5, 3, 1), random_link_scores(2, 2, 5, 3, 1));
	}

	#[test]
	fn class_rows_are_distributions() {
		let (preds, labels) = random_class_predictions(20, 4, 3);
		for row in preds.rows() {
			assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-5);
		}
		assert!(labels.iter().all(|&l| (0.0..4.0).contains(&l) && l.fract() == 0.0));
	}

	#[test]
	fn link_scores_shape() {
		let scores = random_link_scores(2, 3, 10, 5, 0);
		assert_eq!(scores.n_batches(), 6);
		for (_, batches) in scores.iter() {
			for batch in batches {
				assert_eq!(batch.negative.dim(), (10, 5));
			}
		}
	}
}
