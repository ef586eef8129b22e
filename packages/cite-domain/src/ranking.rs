use std::cmp::Ordering;

use crate::chunk::{Candidate, Chunk};

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RankError {
	#[error("Chunk {chunk_id} has a {actual}-dimensional embedding; expected {expected}.")]
	DimensionMismatch { chunk_id: String, expected: usize, actual: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
	pub k: usize,
	/// Candidates scoring below this are dropped. `None` keeps everything.
	pub min_score: Option<f32>,
}
impl RankOptions {
	pub fn new(k: usize) -> Self {
		Self { k: k.max(1), min_score: None }
	}

	pub fn with_min_score(mut self, min_score: Option<f32>) -> Self {
		self.min_score = min_score;

		self
	}
}
impl Default for RankOptions {
	fn default() -> Self {
		Self::new(DEFAULT_TOP_K)
	}
}

/// Scores every candidate against `query` and keeps the best `k`.
///
/// The sort is stable, so equal scores keep their input order. Non-finite scores are
/// discarded.
pub fn rank(
	query: &[f32],
	candidates: Vec<Chunk>,
	opts: RankOptions,
) -> Result<Vec<Candidate>, RankError> {
	let k = opts.k.max(1);
	let mut scored = Vec::with_capacity(candidates.len());

	for chunk in candidates {
		if chunk.embedding.len() != query.len() {
			return Err(RankError::DimensionMismatch {
				chunk_id: chunk.id,
				expected: query.len(),
				actual: chunk.embedding.len(),
			});
		}

		let similarity = cosine_similarity(query, &chunk.embedding);

		if !similarity.is_finite() {
			continue;
		}
		if let Some(min_score) = opts.min_score
			&& similarity < min_score
		{
			continue;
		}

		scored.push(Candidate { chunk, similarity });
	}

	scored.sort_by(|a, b| cmp_f32_desc(a.similarity, b.similarity));
	scored.truncate(k);

	Ok(scored)
}

/// Cosine similarity of two equal-length vectors, in `[-1, 1]`.
///
/// A zero vector on either side scores `0.0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

	let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
	let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
	let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

	if norm_a == 0.0 || norm_b == 0.0 {
		return 0.0;
	}

	dot / (norm_a * norm_b)
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
