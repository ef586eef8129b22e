use serde::{Deserialize, Serialize};

use cite_domain::{Chunk, ChunkMetadata, Session};

use crate::{CiteService, Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct IngestRequest {
	pub file_path: String,
	pub chunks: Vec<IngestChunk>,
}

/// One pre-split passage. Citation metadata sits beside `text` in the JSON object.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestChunk {
	pub text: String,
	/// Carried over from an earlier export; new passages start at zero.
	#[serde(default)]
	pub usage_count: Option<u64>,
	#[serde(flatten)]
	pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
	pub scope_key: String,
	pub chunks_added: usize,
}

impl CiteService {
	/// Embeds and stores the passages of one file under the caller's scope. Re-ingesting a file
	/// replaces all of its previous chunks; usage counts restart unless supplied.
	pub async fn ingest(&self, session: &Session, req: IngestRequest) -> Result<IngestResponse> {
		let file_path = req.file_path.trim();

		if file_path.is_empty() {
			return Err(Error::InvalidRequest {
				message: "file_path must be non-empty.".to_string(),
			});
		}
		if req.chunks.is_empty() {
			return Err(Error::InvalidRequest {
				message: "chunks must contain at least one passage.".to_string(),
			});
		}
		if let Some(idx) = req.chunks.iter().position(|chunk| chunk.text.trim().is_empty()) {
			return Err(Error::InvalidRequest {
				message: format!("chunks[{idx}].text must be non-empty."),
			});
		}

		let cfg = &self.cfg.providers.embedding;
		let texts: Vec<String> = req.chunks.iter().map(|chunk| chunk.text.clone()).collect();
		let embeddings = self.providers.embedding.embed(cfg, &texts).await?;

		if embeddings.len() != texts.len() {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned {} vectors for {} texts.",
					embeddings.len(),
					texts.len()
				),
			});
		}
		if embeddings.iter().any(|vector| vector.len() != cfg.dimensions as usize) {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		let scope_key = session.scope_key(file_path);
		let chunks: Vec<Chunk> = req
			.chunks
			.into_iter()
			.zip(embeddings)
			.enumerate()
			.map(|(idx, (input, embedding))| {
				let mut metadata = input.metadata;

				metadata.chunk_index = metadata.chunk_index.or(i32::try_from(idx).ok());

				Chunk {
					id: format!("{scope_key}/{idx}"),
					scope_key: scope_key.clone(),
					content: input.text,
					embedding,
					metadata,
					usage_count: input.usage_count.unwrap_or(0),
				}
			})
			.collect();

		self.store.insert_chunks(&chunks).await?;

		tracing::info!(scope_key = %scope_key, chunks = chunks.len(), "Ingested chunks.");

		Ok(IngestResponse { scope_key, chunks_added: chunks.len() })
	}
}
