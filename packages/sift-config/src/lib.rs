mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Index, Providers, RerankProviderConfig, Retrieval, Service,
	WebSearchProviderConfig,
};

use std::{fs, path::Path};

use serde_json::{Map, Value};

/// Upper bound on web hits per call, whatever the caller asks for.
pub const WEB_RESULT_CEILING: u32 = 20;

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
	if cfg.index.path.trim().is_empty() {
		return Err(Error::Validation { message: "index.path must be non-empty.".to_string() });
	}
	if cfg.index.dimensions == 0 {
		return Err(Error::Validation {
			message: "index.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.index.dimensions {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match index.dimensions.".to_string(),
		});
	}

	for (label, timeout_ms) in [
		("providers.embedding.timeout_ms", cfg.providers.embedding.timeout_ms),
		("providers.rerank.timeout_ms", cfg.providers.rerank.timeout_ms),
		("providers.web.timeout_ms", cfg.providers.web.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}
	for (label, value) in [
		("providers.rerank.model", &cfg.providers.rerank.model),
		("providers.rerank.multilingual_model", &cfg.providers.rerank.multilingual_model),
		("providers.web.api_key_header", &cfg.providers.web.api_key_header),
		("providers.web.language", &cfg.providers.web.language),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}
	for (label, headers) in [
		("providers.embedding.default_headers", &cfg.providers.embedding.default_headers),
		("providers.rerank.default_headers", &cfg.providers.rerank.default_headers),
		("providers.web.default_headers", &cfg.providers.web.default_headers),
	] {
		validate_headers(label, headers)?;
	}

	if !(1..=WEB_RESULT_CEILING).contains(&cfg.providers.web.max_results) {
		return Err(Error::Validation {
			message: format!("providers.web.max_results must be in the range 1-{WEB_RESULT_CEILING}."),
		});
	}
	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.max_top_k < cfg.retrieval.top_k {
		return Err(Error::Validation {
			message: "retrieval.max_top_k must be greater than or equal to retrieval.top_k."
				.to_string(),
		});
	}
	if cfg.retrieval.similarity_top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.similarity_top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.language.is_empty() {
		return Err(Error::Validation {
			message: "retrieval.language must be non-empty.".to_string(),
		});
	}
	if cfg.retrieval.fallback_language.is_empty() {
		return Err(Error::Validation {
			message: "retrieval.fallback_language must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn validate_headers(label: &str, headers: &Map<String, Value>) -> Result<()> {
	for (key, value) in headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("{label}.{key} must be a string."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.retrieval.language = normalize_language(&cfg.retrieval.language);
	cfg.retrieval.fallback_language = normalize_language(&cfg.retrieval.fallback_language);
	cfg.providers.web.language = normalize_language(&cfg.providers.web.language);
	cfg.providers.web.tags = cfg
		.providers
		.web
		.tags
		.iter()
		.map(|tag| tag.trim().to_string())
		.filter(|tag| !tag.is_empty())
		.collect();
}

fn normalize_language(raw: &str) -> String {
	raw.trim().to_lowercase()
}
