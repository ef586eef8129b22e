pub mod db;
pub mod models;
pub mod queries;
pub mod schema;

mod error;

pub use error::Error;

use std::{future::Future, pin::Pin};

use cite_domain::Chunk;

use crate::db::Db;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persistence for embedded chunks and their usage counters.
pub trait ChunkStore
where
	Self: Send + Sync,
{
	fn chunks_by_scope<'a>(
		&'a self,
		scope_keys: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Chunk>>>;

	fn all_chunks(&self) -> BoxFuture<'_, Result<Vec<Chunk>>>;

	/// Best-effort `+1`. Concurrent increments may be lost.
	fn increment_usage<'a>(&'a self, chunk_id: &'a str) -> BoxFuture<'a, Result<()>>;

	/// Replaces the chunks of every file in the batch; stale ids of those files are removed.
	fn insert_chunks<'a>(&'a self, chunks: &'a [Chunk]) -> BoxFuture<'a, Result<()>>;
}

impl ChunkStore for Db {
	fn chunks_by_scope<'a>(
		&'a self,
		scope_keys: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Chunk>>> {
		Box::pin(queries::chunks_by_scope(self, scope_keys))
	}

	fn all_chunks(&self) -> BoxFuture<'_, Result<Vec<Chunk>>> {
		Box::pin(queries::all_chunks(self))
	}

	fn increment_usage<'a>(&'a self, chunk_id: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(queries::increment_usage(self, chunk_id))
	}

	fn insert_chunks<'a>(&'a self, chunks: &'a [Chunk]) -> BoxFuture<'a, Result<()>> {
		Box::pin(queries::insert_chunks(self, chunks))
	}
}
