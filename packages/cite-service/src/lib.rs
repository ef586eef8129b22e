pub mod ingest;
pub mod middleware;
pub mod query;
pub mod search;
pub mod usage;

mod error;

pub use cite_domain::Session;
pub use cite_storage::BoxFuture;
pub use error::{Error, Result};
pub use ingest::{IngestChunk, IngestRequest, IngestResponse};
pub use query::QueryKind;
pub use search::{SearchHit, SearchRequest, SearchResponse};
pub use usage::{TrackRequest, TrackResponse};

use std::sync::Arc;

use cite_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use cite_providers::{chat, classify, embedding};
use cite_storage::ChunkStore;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, cite_providers::Result<Vec<Vec<f32>>>>;
}

pub trait GeneratorProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system: &'a str,
		prompt: &'a str,
	) -> BoxFuture<'a, cite_providers::Result<String>>;
}

/// Picks one of a closed set of labels for a piece of text.
pub trait ClassifierProvider
where
	Self: Send + Sync,
{
	fn classify<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		text: &'a str,
		labels: &'a [&'a str],
	) -> BoxFuture<'a, cite_providers::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generator: Arc<dyn GeneratorProvider>,
	pub classifier: Arc<dyn ClassifierProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		generator: Arc<dyn GeneratorProvider>,
		classifier: Arc<dyn ClassifierProvider>,
	) -> Self {
		Self { embedding, generator, classifier }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), generator: provider.clone(), classifier: provider }
	}
}

pub struct CiteService {
	pub cfg: Config,
	pub store: Arc<dyn ChunkStore>,
	pub providers: Providers,
}
impl CiteService {
	pub fn new(cfg: Config, store: Arc<dyn ChunkStore>) -> Self {
		Self { cfg, store, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, store: Arc<dyn ChunkStore>, providers: Providers) -> Self {
		Self { cfg, store, providers }
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, cite_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}
impl GeneratorProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system: &'a str,
		prompt: &'a str,
	) -> BoxFuture<'a, cite_providers::Result<String>> {
		Box::pin(chat::generate(cfg, system, prompt))
	}
}
impl ClassifierProvider for DefaultProviders {
	fn classify<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		text: &'a str,
		labels: &'a [&'a str],
	) -> BoxFuture<'a, cite_providers::Result<String>> {
		Box::pin(classify::classify(cfg, text, labels))
	}
}
