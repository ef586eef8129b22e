use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	/// Low-cost chat model used for query classification and hypothetical answers.
	pub llm_fast: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Settings for the prompt-augmentation pipeline.
#[derive(Debug, Deserialize)]
pub struct Retrieval {
	#[serde(default = "default_top_k")]
	pub top_k: u32,
	/// Queries shorter than this many characters skip retrieval.
	#[serde(default = "default_min_query_chars")]
	pub min_query_chars: u32,
	/// Similarity floor. Unset keeps every ranked candidate.
	pub min_score: Option<f32>,
	#[serde(default = "default_true")]
	pub classify: bool,
	#[serde(default = "default_true")]
	pub hypothetical_answer: bool,
	/// Upper bound for the whole pipeline. Expiry forwards the prompt untouched.
	pub deadline_ms: Option<u64>,
}

/// Defaults for the standalone similarity search endpoint.
#[derive(Debug, Deserialize)]
pub struct Search {
	#[serde(default = "default_search_k")]
	pub default_k: u32,
	#[serde(default = "default_search_max_k")]
	pub max_k: u32,
	#[serde(default = "default_search_min_score")]
	pub default_min_score: f32,
}

#[derive(Debug, Default, Deserialize)]
pub struct Security {
	pub api_auth_token: Option<String>,
}

impl Default for Retrieval {
	fn default() -> Self {
		Self {
			top_k: default_top_k(),
			min_query_chars: default_min_query_chars(),
			min_score: None,
			classify: true,
			hypothetical_answer: true,
			deadline_ms: None,
		}
	}
}

impl Default for Search {
	fn default() -> Self {
		Self {
			default_k: default_search_k(),
			max_k: default_search_max_k(),
			default_min_score: default_search_min_score(),
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_top_k() -> u32 {
	5
}

fn default_min_query_chars() -> u32 {
	3
}

fn default_true() -> bool {
	true
}

fn default_search_k() -> u32 {
	10
}

fn default_search_max_k() -> u32 {
	100
}

fn default_search_min_score() -> f32 {
	0.25
}
