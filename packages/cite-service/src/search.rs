use serde::{Deserialize, Serialize};
use serde_json::Value;

use cite_domain::{Candidate, RankOptions, Session, ranking};

use crate::{CiteService, Error, Result};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
	/// Kept loose so a non-string query is reported as an invalid request rather than a body
	/// parse failure.
	#[serde(default)]
	pub query: Option<Value>,
	pub k: Option<u32>,
	pub min_score: Option<f32>,
	/// File paths owned by the caller. `None` searches the whole corpus.
	pub scope: Option<Vec<String>>,
}
impl SearchRequest {
	pub fn new(query: impl Into<String>) -> Self {
		Self { query: Some(Value::String(query.into())), ..Self::default() }
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
	pub id: String,
	pub source_doc_id: Option<String>,
	pub section_heading: Option<String>,
	pub journal: Option<String>,
	pub publish_year: Option<i32>,
	pub usage_count: u64,
	pub attributes: Vec<String>,
	pub link: Option<String>,
	pub text: String,
	pub similarity: f32,
}
impl From<Candidate> for SearchHit {
	fn from(candidate: Candidate) -> Self {
		let Candidate { chunk, similarity } = candidate;
		let meta = chunk.metadata;

		Self {
			id: chunk.id,
			source_doc_id: meta.source_doc_id,
			section_heading: meta.section_heading,
			journal: meta.journal,
			publish_year: meta.publish_year,
			usage_count: chunk.usage_count,
			attributes: meta.attributes,
			link: meta.link,
			text: chunk.content,
			similarity,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
	pub query: String,
	pub results: Vec<SearchHit>,
	pub total_found: usize,
}

impl CiteService {
	/// Ranks stored chunks against `req.query` without touching usage counters.
	pub async fn search(&self, session: &Session, req: SearchRequest) -> Result<SearchResponse> {
		let query = match req.query {
			Some(Value::String(query)) if !query.trim().is_empty() => query,
			_ => {
				return Err(Error::InvalidRequest {
					message: "query must be a non-empty string.".to_string(),
				});
			},
		};
		let search_cfg = &self.cfg.search;
		let k = req.k.unwrap_or(search_cfg.default_k);

		if k == 0 || k > search_cfg.max_k {
			return Err(Error::InvalidRequest {
				message: format!("k must be between 1 and {}.", search_cfg.max_k),
			});
		}

		let min_score = req.min_score.unwrap_or(search_cfg.default_min_score);

		if !min_score.is_finite() {
			return Err(Error::InvalidRequest {
				message: "min_score must be a finite number.".to_string(),
			});
		}

		let scope_keys = match req.scope.as_deref() {
			None => None,
			Some([]) => {
				return Err(Error::InvalidRequest {
					message: "scope must list at least one file path.".to_string(),
				});
			},
			Some(paths) => Some(session.scope_keys(paths)),
		};
		let query_vec = self.embed_query(&query).await?;
		let chunks = match &scope_keys {
			Some(keys) => self.store.chunks_by_scope(keys).await?,
			None => self.store.all_chunks().await?,
		};
		let candidates_total = chunks.len();
		let opts = RankOptions::new(k as usize).with_min_score(Some(min_score));
		let results: Vec<SearchHit> =
			ranking::rank(&query_vec, chunks, opts)?.into_iter().map(SearchHit::from).collect();

		tracing::info!(
			user_id = %session.user_id,
			candidates = candidates_total,
			results = results.len(),
			"Similarity search completed."
		);

		Ok(SearchResponse { query, total_found: results.len(), results })
	}
}
