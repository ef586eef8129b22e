#![allow(dead_code)]

use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use cite_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use cite_domain::{Chunk, Message, PromptParams};
use cite_service::{
	BoxFuture, CiteService, ClassifierProvider, EmbeddingProvider, GeneratorProvider, Providers,
};
use cite_storage::ChunkStore;
use cite_testkit::MemoryChunkStore;

pub const USER: &str = "ada@example.org";

pub struct StubEmbedding {
	vector: Option<Vec<f32>>,
	pub calls: AtomicUsize,
}
impl StubEmbedding {
	pub fn returning(vector: Vec<f32>) -> Self {
		Self { vector: Some(vector), calls: AtomicUsize::new(0) }
	}

	pub fn failing() -> Self {
		Self { vector: None, calls: AtomicUsize::new(0) }
	}

	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl EmbeddingProvider for StubEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, cite_providers::Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let result = match &self.vector {
			Some(vector) => Ok(vec![vector.clone(); texts.len()]),
			None => Err(cite_providers::Error::InvalidResponse {
				message: "Embedding backend is unavailable.".to_string(),
			}),
		};

		Box::pin(async move { result })
	}
}

pub struct StubGenerator {
	answer: String,
	delay: Option<Duration>,
	pub calls: AtomicUsize,
}
impl StubGenerator {
	pub fn new(answer: &str) -> Self {
		Self { answer: answer.to_string(), delay: None, calls: AtomicUsize::new(0) }
	}

	/// Answers only after `delay` has passed.
	pub fn delayed(answer: &str, delay: Duration) -> Self {
		Self { delay: Some(delay), ..Self::new(answer) }
	}

	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl GeneratorProvider for StubGenerator {
	fn generate<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_system: &'a str,
		_prompt: &'a str,
	) -> BoxFuture<'a, cite_providers::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let answer = self.answer.clone();
		let delay = self.delay;

		Box::pin(async move {
			if let Some(delay) = delay {
				tokio::time::sleep(delay).await;
			}

			Ok(answer)
		})
	}
}

pub struct StubClassifier {
	label: String,
	pub calls: AtomicUsize,
}
impl StubClassifier {
	pub fn new(label: &str) -> Self {
		Self { label: label.to_string(), calls: AtomicUsize::new(0) }
	}

	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl ClassifierProvider for StubClassifier {
	fn classify<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_text: &'a str,
		_labels: &'a [&'a str],
	) -> BoxFuture<'a, cite_providers::Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let label = self.label.clone();

		Box::pin(async move { Ok(label) })
	}
}

/// Wraps a [`MemoryChunkStore`] and fails reads or increments on demand.
pub struct FlakyStore {
	pub inner: MemoryChunkStore,
	fail_reads: bool,
	fail_increments: bool,
	pub increment_attempts: AtomicUsize,
}
impl FlakyStore {
	pub fn failing_reads(chunks: Vec<Chunk>) -> Self {
		Self::new(chunks, true, false)
	}

	pub fn failing_increments(chunks: Vec<Chunk>) -> Self {
		Self::new(chunks, false, true)
	}

	fn new(chunks: Vec<Chunk>, fail_reads: bool, fail_increments: bool) -> Self {
		Self {
			inner: MemoryChunkStore::with_chunks(chunks),
			fail_reads,
			fail_increments,
			increment_attempts: AtomicUsize::new(0),
		}
	}

	/// Waits for detached increments to be attempted.
	pub async fn wait_for_attempts(&self, expected: usize) -> usize {
		for _ in 0..100 {
			let attempts = self.increment_attempts.load(Ordering::SeqCst);

			if attempts >= expected {
				return attempts;
			}

			tokio::time::sleep(Duration::from_millis(10)).await;
		}

		self.increment_attempts.load(Ordering::SeqCst)
	}
}
impl ChunkStore for FlakyStore {
	fn chunks_by_scope<'a>(
		&'a self,
		scope_keys: &'a [String],
	) -> BoxFuture<'a, cite_storage::Result<Vec<Chunk>>> {
		if self.fail_reads {
			return Box::pin(async { Err(cite_storage::Error::Sqlx(sqlx::Error::PoolClosed)) });
		}

		self.inner.chunks_by_scope(scope_keys)
	}

	fn all_chunks(&self) -> BoxFuture<'_, cite_storage::Result<Vec<Chunk>>> {
		if self.fail_reads {
			return Box::pin(async { Err(cite_storage::Error::Sqlx(sqlx::Error::PoolClosed)) });
		}

		self.inner.all_chunks()
	}

	fn increment_usage<'a>(
		&'a self,
		chunk_id: &'a str,
	) -> BoxFuture<'a, cite_storage::Result<()>> {
		self.increment_attempts.fetch_add(1, Ordering::SeqCst);

		if self.fail_increments {
			return Box::pin(async { Err(cite_storage::Error::Sqlx(sqlx::Error::PoolTimedOut)) });
		}

		self.inner.increment_usage(chunk_id)
	}

	fn insert_chunks<'a>(
		&'a self,
		chunks: &'a [Chunk],
	) -> BoxFuture<'a, cite_storage::Result<()>> {
		self.inner.insert_chunks(chunks)
	}
}

/// A service over `store` with default stub providers.
pub fn service_over(store: Arc<dyn ChunkStore>) -> CiteService {
	let providers = Providers::new(
		Arc::new(StubEmbedding::returning(vec![1.0, 0.0])),
		Arc::new(StubGenerator::new("Velvet bean fixes nitrogen in the soil.")),
		Arc::new(StubClassifier::new("question")),
	);

	CiteService::with_providers(cite_testkit::sample_config(2), store, providers)
}

pub struct Harness {
	pub service: CiteService,
	pub store: Arc<MemoryChunkStore>,
	pub embedding: Arc<StubEmbedding>,
	pub generator: Arc<StubGenerator>,
	pub classifier: Arc<StubClassifier>,
}

pub struct HarnessBuilder {
	cfg: Config,
	chunks: Vec<Chunk>,
	embedding: StubEmbedding,
	generator: StubGenerator,
	classifier: StubClassifier,
}
impl HarnessBuilder {
	pub fn new() -> Self {
		Self {
			cfg: cite_testkit::sample_config(2),
			chunks: Vec::new(),
			embedding: StubEmbedding::returning(vec![1.0, 0.0]),
			generator: StubGenerator::new("Velvet bean fixes nitrogen in the soil."),
			classifier: StubClassifier::new("question"),
		}
	}

	pub fn config(mut self, f: impl FnOnce(&mut Config)) -> Self {
		f(&mut self.cfg);

		self
	}

	pub fn chunks(mut self, chunks: Vec<Chunk>) -> Self {
		self.chunks = chunks;

		self
	}

	pub fn embedding(mut self, embedding: StubEmbedding) -> Self {
		self.embedding = embedding;

		self
	}

	pub fn generator(mut self, generator: StubGenerator) -> Self {
		self.generator = generator;

		self
	}

	pub fn classifier(mut self, classifier: StubClassifier) -> Self {
		self.classifier = classifier;

		self
	}

	pub fn build(self) -> Harness {
		let store = Arc::new(MemoryChunkStore::with_chunks(self.chunks));
		let embedding = Arc::new(self.embedding);
		let generator = Arc::new(self.generator);
		let classifier = Arc::new(self.classifier);
		let providers = Providers::new(embedding.clone(), generator.clone(), classifier.clone());
		let service = CiteService::with_providers(self.cfg, store.clone(), providers);

		Harness { service, store, embedding, generator, classifier }
	}
}

/// A two-dimensional unit vector whose cosine similarity with `[1, 0]` is `similarity`.
pub fn unit_with_similarity(similarity: f32) -> Vec<f32> {
	vec![similarity, (1.0 - similarity * similarity).max(0.0).sqrt()]
}

pub fn scope_key(path: &str) -> String {
	format!("{USER}/{path}")
}

pub fn prompt_with_selection(files: &[&str], messages: Vec<Message>) -> PromptParams {
	PromptParams {
		prompt: messages,
		provider_metadata: Some(serde_json::json!({ "files": { "selection": files } })),
	}
}

/// Waits for detached usage increments to land.
pub async fn wait_for_increments(store: &MemoryChunkStore, expected: usize) -> Vec<String> {
	for _ in 0..100 {
		let increments = store.increments();

		if increments.len() >= expected {
			return increments;
		}

		tokio::time::sleep(Duration::from_millis(10)).await;
	}

	store.increments()
}
