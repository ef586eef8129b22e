use serde::{Deserialize, Serialize};

/// A persisted, embedded passage of source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
	pub id: String,
	/// Owning scope, `"{user}/{file_path}"`.
	pub scope_key: String,
	pub content: String,
	pub embedding: Vec<f32>,
	#[serde(default)]
	pub metadata: ChunkMetadata,
	#[serde(default)]
	pub usage_count: u64,
}

/// Bibliographic metadata. Every field is optional and descriptive only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
	pub source_doc_id: Option<String>,
	pub chunk_index: Option<i32>,
	pub section_heading: Option<String>,
	pub doi: Option<String>,
	pub journal: Option<String>,
	pub publish_year: Option<i32>,
	#[serde(default)]
	pub attributes: Vec<String>,
	pub link: Option<String>,
}

/// A chunk scored against one query. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
	pub chunk: Chunk,
	pub similarity: f32,
}
