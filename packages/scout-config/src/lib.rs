mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Engine, EngineParameters, Indexing, Providers, Ranking,
	Search, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

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

	for (label, value) in [
		("engine.stack_id", &cfg.engine.stack_id),
		("engine.namespace", &cfg.engine.namespace),
		("engine.document_type", &cfg.engine.document_type),
		("engine.vector_field", &cfg.engine.vector_field),
		("engine.vector_param", &cfg.engine.vector_param),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !matches!(cfg.engine.parameters.source.as_str(), "env" | "static") {
		return Err(Error::Validation {
			message: "engine.parameters.source must be one of env or static.".to_string(),
		});
	}
	if cfg.engine.query_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "engine.query_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.engine.request_timeout_ms < cfg.engine.query_timeout_ms {
		return Err(Error::Validation {
			message: "engine.request_timeout_ms must be at least engine.query_timeout_ms."
				.to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.engine.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match engine.vector_dim.".to_string(),
		});
	}
	if cfg.providers.embedding.max_input_chars == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.max_input_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}
	if cfg.search.max_limit == 0 {
		return Err(Error::Validation {
			message: "search.max_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_limit == 0 || cfg.search.default_limit > cfg.search.max_limit {
		return Err(Error::Validation {
			message: "search.default_limit must be in the range 1-search.max_limit.".to_string(),
		});
	}

	for (label, weight) in [
		("ranking.semantic_weight", cfg.ranking.semantic_weight),
		("ranking.keyword_weight", cfg.ranking.keyword_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&weight) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if cfg.ranking.semantic_weight + cfg.ranking.keyword_weight <= 0.0 {
		return Err(Error::Validation {
			message: "ranking.semantic_weight and ranking.keyword_weight must not both be zero."
				.to_string(),
		});
	}
	if cfg.indexing.batch_size == 0 || cfg.indexing.batch_size > 100 {
		return Err(Error::Validation {
			message: "indexing.batch_size must be in the range 1-100.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.engine.stack_id = cfg.engine.stack_id.trim().to_string();
	cfg.engine.parameters.values.retain(|_, value| !value.trim().is_empty());

	if cfg.providers.embedding.api_base.ends_with('/') && cfg.providers.embedding.path.starts_with('/')
	{
		let trimmed = cfg.providers.embedding.api_base.trim_end_matches('/').to_string();

		cfg.providers.embedding.api_base = trimmed;
	}
}
