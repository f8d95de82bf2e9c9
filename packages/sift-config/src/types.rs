use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub index: Index,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Index {
	/// JSON Lines artifact, one passage per line.
	pub path: String,
	pub dimensions: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub rerank: RerankProviderConfig,
	pub web: WebSearchProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
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

#[derive(Debug, Clone, Deserialize)]
pub struct RerankProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	/// Model used when the target language is the session default language.
	pub model: String,
	/// Model used for every other target language.
	pub multilingual_model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	#[serde(default = "default_api_key_header")]
	pub api_key_header: String,
	pub path: String,
	/// Prepended to every query so results stay on-brand.
	#[serde(default)]
	pub query_prefix: String,
	pub max_results: u32,
	#[serde(default = "default_web_language")]
	pub language: String,
	#[serde(default = "default_web_tags")]
	pub tags: Vec<String>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Retrieval {
	#[serde(default = "default_top_k")]
	pub top_k: u32,
	/// Largest `top_k` a single request may ask for.
	#[serde(default = "default_max_top_k")]
	pub max_top_k: u32,
	#[serde(default = "default_similarity_top_k")]
	pub similarity_top_k: u32,
	#[serde(default = "default_language")]
	pub language: String,
	#[serde(default = "default_fallback_language")]
	pub fallback_language: String,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			top_k: default_top_k(),
			max_top_k: default_max_top_k(),
			similarity_top_k: default_similarity_top_k(),
			language: default_language(),
			fallback_language: default_fallback_language(),
		}
	}
}

fn default_api_key_header() -> String {
	"X-API-Key".to_string()
}

fn default_web_language() -> String {
	"en".to_string()
}

fn default_web_tags() -> Vec<String> {
	vec!["you.com".to_string()]
}

fn default_top_k() -> u32 {
	10
}

fn default_max_top_k() -> u32 {
	100
}

fn default_similarity_top_k() -> u32 {
	10
}

fn default_language() -> String {
	"en".to_string()
}

fn default_fallback_language() -> String {
	"python".to_string()
}
