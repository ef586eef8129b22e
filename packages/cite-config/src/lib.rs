mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, LlmProviderConfig, Postgres, Providers, Retrieval, Search,
	Security, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

/// Parses, normalizes and validates a TOML document.
pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	let temperature = cfg.providers.llm_fast.temperature;

	if !temperature.is_finite() || temperature < 0.0 {
		return Err(Error::Validation {
			message: "providers.llm_fast.temperature must be a finite number, zero or greater."
				.to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("llm_fast", &cfg.providers.llm_fast.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.min_query_chars == 0 {
		return Err(Error::Validation {
			message: "retrieval.min_query_chars must be greater than zero.".to_string(),
		});
	}
	if let Some(min_score) = cfg.retrieval.min_score {
		validate_score("retrieval.min_score", min_score)?;
	}
	if cfg.retrieval.deadline_ms == Some(0) {
		return Err(Error::Validation {
			message: "retrieval.deadline_ms must be greater than zero when set.".to_string(),
		});
	}
	if cfg.search.default_k == 0 {
		return Err(Error::Validation {
			message: "search.default_k must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_k < cfg.search.default_k {
		return Err(Error::Validation {
			message: "search.max_k must be at least search.default_k.".to_string(),
		});
	}

	validate_score("search.default_min_score", cfg.search.default_min_score)?;

	Ok(())
}

fn validate_score(label: &str, value: f32) -> Result<()> {
	if !value.is_finite() {
		return Err(Error::Validation { message: format!("{label} must be a finite number.") });
	}
	if !(-1.0..=1.0).contains(&value) {
		return Err(Error::Validation {
			message: format!("{label} must be in the range -1.0-1.0."),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.security.api_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.api_auth_token = None;
	}
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
