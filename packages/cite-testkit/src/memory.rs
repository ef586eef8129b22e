use std::sync::{Mutex, MutexGuard};

use cite_domain::{Chunk, ChunkMetadata};
use cite_storage::{BoxFuture, ChunkStore, Result};

/// In-process [`ChunkStore`] with the same ordering and replacement rules as the Postgres store.
#[derive(Debug, Default)]
pub struct MemoryChunkStore {
	chunks: Mutex<Vec<Chunk>>,
	increments: Mutex<Vec<String>>,
}
impl MemoryChunkStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_chunks(chunks: Vec<Chunk>) -> Self {
		let store = Self::new();

		upsert(&mut lock(&store.chunks), &chunks);

		store
	}

	pub fn usage_count(&self, chunk_id: &str) -> Option<u64> {
		lock(&self.chunks).iter().find(|chunk| chunk.id == chunk_id).map(|chunk| chunk.usage_count)
	}

	/// Chunk ids in the order increments were applied.
	pub fn increments(&self) -> Vec<String> {
		lock(&self.increments).clone()
	}

	pub fn len(&self) -> usize {
		lock(&self.chunks).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn sorted(&self, filter: impl Fn(&Chunk) -> bool) -> Vec<Chunk> {
		let mut out: Vec<Chunk> = lock(&self.chunks).iter().filter(|c| filter(c)).cloned().collect();

		out.sort_by(|a, b| {
			a.scope_key
				.cmp(&b.scope_key)
				.then_with(|| match (a.metadata.chunk_index, b.metadata.chunk_index) {
					(Some(x), Some(y)) => x.cmp(&y),
					(Some(_), None) => std::cmp::Ordering::Less,
					(None, Some(_)) => std::cmp::Ordering::Greater,
					(None, None) => std::cmp::Ordering::Equal,
				})
				.then_with(|| a.id.cmp(&b.id))
		});

		out
	}
}
impl ChunkStore for MemoryChunkStore {
	fn chunks_by_scope<'a>(
		&'a self,
		scope_keys: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Chunk>>> {
		Box::pin(async move { Ok(self.sorted(|chunk| scope_keys.contains(&chunk.scope_key))) })
	}

	fn all_chunks(&self) -> BoxFuture<'_, Result<Vec<Chunk>>> {
		Box::pin(async move { Ok(self.sorted(|_| true)) })
	}

	fn increment_usage<'a>(&'a self, chunk_id: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			if let Some(chunk) = lock(&self.chunks).iter_mut().find(|chunk| chunk.id == chunk_id) {
				chunk.usage_count += 1;
			}

			lock(&self.increments).push(chunk_id.to_string());

			Ok(())
		})
	}

	fn insert_chunks<'a>(&'a self, chunks: &'a [Chunk]) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			upsert(&mut lock(&self.chunks), chunks);

			Ok(())
		})
	}
}

/// Builds a chunk owned by `scope_key` with citation metadata derived from `id`.
pub fn chunk(id: &str, scope_key: &str, embedding: Vec<f32>) -> Chunk {
	Chunk {
		id: id.to_string(),
		scope_key: scope_key.to_string(),
		content: format!("Content of {id}."),
		embedding,
		metadata: ChunkMetadata {
			source_doc_id: Some(format!("doc-{id}")),
			section_heading: Some("Results".to_string()),
			link: Some(format!("https://example.org/{id}")),
			..ChunkMetadata::default()
		},
		usage_count: 0,
	}
}

fn upsert(stored: &mut Vec<Chunk>, chunks: &[Chunk]) {
	stored.retain(|existing| {
		!chunks.iter().any(|chunk| chunk.scope_key == existing.scope_key)
			|| chunks.iter().any(|chunk| chunk.id == existing.id)
	});

	for chunk in chunks {
		match stored.iter_mut().find(|existing| existing.id == chunk.id) {
			Some(existing) => *existing = chunk.clone(),
			None => stored.push(chunk.clone()),
		}
	}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}
