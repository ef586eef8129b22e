use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cite_domain::{Citation, SessionUsage, citation};
use cite_storage::ChunkStore;

use crate::CiteService;

#[derive(Debug, Clone, Deserialize)]
pub struct TrackRequest {
	pub response_text: String,
	#[serde(default)]
	pub usage: SessionUsage,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackResponse {
	pub citations: Vec<Citation>,
	pub usage: SessionUsage,
}

impl CiteService {
	/// Extracts citation markers from a model response and folds them into the session tally.
	pub fn track_citations(&self, req: TrackRequest) -> TrackResponse {
		let citations = citation::extract_citations(&req.response_text);
		let usage = req.usage.apply(&citations);

		tracing::debug!(
			citations = citations.len(),
			sources = usage.entries().len(),
			"Tracked citations."
		);

		TrackResponse { citations, usage }
	}
}

/// Spawns one detached `+1` per distinct chunk id. Failures are logged and never reach the
/// caller.
pub(crate) fn spawn_usage_increments(
	store: &Arc<dyn ChunkStore>,
	chunk_ids: Vec<String>,
	request_id: Uuid,
) {
	let mut unique: Vec<String> = Vec::with_capacity(chunk_ids.len());

	for id in chunk_ids {
		if !unique.contains(&id) {
			unique.push(id);
		}
	}

	for chunk_id in unique {
		let store = Arc::clone(store);

		tokio::spawn(async move {
			if let Err(err) = store.increment_usage(&chunk_id).await {
				tracing::warn!(
					%request_id,
					chunk_id = %chunk_id,
					error = %err,
					"Failed to increment chunk usage count."
				);
			}
		});
	}
}
