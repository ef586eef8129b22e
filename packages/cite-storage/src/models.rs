use serde_json::Value;

use cite_domain::{Chunk, ChunkMetadata};

#[derive(Debug, sqlx::FromRow)]
pub struct ChunkRow {
	pub id: String,
	pub file_path: String,
	pub content: String,
	pub embedding: Vec<f32>,
	pub source_doc_id: Option<String>,
	pub chunk_index: Option<i32>,
	pub section_heading: Option<String>,
	pub doi: Option<String>,
	pub journal: Option<String>,
	pub publish_year: Option<i32>,
	pub usage_count: i64,
	pub attributes: Option<Value>,
	pub link: Option<String>,
}

impl From<ChunkRow> for Chunk {
	fn from(row: ChunkRow) -> Self {
		let attributes = row
			.attributes
			.and_then(|value| serde_json::from_value::<Vec<String>>(value).ok())
			.unwrap_or_default();

		Self {
			id: row.id,
			scope_key: row.file_path,
			content: row.content,
			embedding: row.embedding,
			metadata: ChunkMetadata {
				source_doc_id: row.source_doc_id,
				chunk_index: row.chunk_index,
				section_heading: row.section_heading,
				doi: row.doi,
				journal: row.journal,
				publish_year: row.publish_year,
				attributes,
				link: row.link,
			},
			usage_count: u64::try_from(row.usage_count).unwrap_or(0),
		}
	}
}
