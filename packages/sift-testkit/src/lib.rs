mod error;

pub use error::{Error, Result};

use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use serde_json::Map;

use sift_config::{
	Config, EmbeddingProviderConfig, Index, Providers, RerankProviderConfig, Retrieval, Service,
	WebSearchProviderConfig,
};
use sift_domain::CandidateMetadata;
use sift_index::{Passage, PassageIndex, lexical};
use sift_providers::{
	BoxFuture, EmbeddingProvider, RerankHit, RerankProvider, WebHit, WebSearchProvider,
};

pub const TEST_DIMENSIONS: u32 = 16;
pub const DEFAULT_RERANK_MODEL: &str = "rerank-english-v2.0";
pub const MULTILINGUAL_RERANK_MODEL: &str = "rerank-multilingual-v2.0";

/// A complete config pointing every provider at an unroutable address.
pub fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		index: Index { path: "unused.jsonl".to_string(), dimensions: TEST_DIMENSIONS },
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/embeddings".to_string(),
				model: "test".to_string(),
				dimensions: TEST_DIMENSIONS,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			rerank: RerankProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/rerank".to_string(),
				model: DEFAULT_RERANK_MODEL.to_string(),
				multilingual_model: MULTILINGUAL_RERANK_MODEL.to_string(),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			web: WebSearchProviderConfig {
				provider_id: "you.com".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				api_key_header: "X-API-Key".to_string(),
				path: "/search".to_string(),
				query_prefix: "Weights & Biases ".to_string(),
				max_results: 20,
				language: "en".to_string(),
				tags: vec!["you.com".to_string()],
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		retrieval: Retrieval::default(),
	}
}

/// Bag-of-words embedding: each token is hashed into one of `dimensions` buckets.
///
/// Texts sharing words get a positive cosine similarity, so nearest-neighbour order is
/// predictable in tests.
#[derive(Debug, Clone, Copy)]
pub struct HashedEmbedding {
	pub dimensions: u32,
}
impl HashedEmbedding {
	pub fn embed_text(&self, text: &str) -> Vec<f32> {
		let dimensions = self.dimensions.max(1) as usize;
		let mut vector = vec![0.0; dimensions];

		for token in lexical::tokenize(text) {
			let hash = blake3::hash(token.as_bytes());
			let bytes = hash.as_bytes();
			let bucket = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;

			vector[bucket % dimensions] += 1.0;
		}

		vector
	}
}
impl Default for HashedEmbedding {
	fn default() -> Self {
		Self { dimensions: TEST_DIMENSIONS }
	}
}
impl EmbeddingProvider for HashedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, sift_providers::Result<Vec<Vec<f32>>>> {
		let vectors = texts.iter().map(|text| self.embed_text(text)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

pub struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_texts: &'a [String],
	) -> BoxFuture<'a, sift_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			Err(sift_providers::Error::InvalidResponse {
				message: "Embedding service unavailable.".to_string(),
			})
		})
	}
}

/// Web search that replays fixed hits, optionally after a delay, and counts calls.
#[derive(Debug, Default)]
pub struct ScriptedWeb {
	pub hits: Vec<WebHit>,
	pub delay: Option<Duration>,
	pub calls: Arc<AtomicUsize>,
	pub limits: Arc<Mutex<Vec<u32>>>,
}
impl ScriptedWeb {
	pub fn new(hits: Vec<WebHit>) -> Self {
		Self { hits, ..Default::default() }
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = Some(delay);

		self
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl WebSearchProvider for ScriptedWeb {
	fn search<'a>(
		&'a self,
		_cfg: &'a WebSearchProviderConfig,
		_query: &'a str,
		limit: u32,
	) -> BoxFuture<'a, sift_providers::Result<Vec<WebHit>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.limits.lock().unwrap_or_else(|err| err.into_inner()).push(limit);

		let hits = self.hits.clone();
		let delay = self.delay;

		Box::pin(async move {
			if let Some(delay) = delay {
				tokio::time::sleep(delay).await;
			}

			Ok(hits)
		})
	}
}

#[derive(Debug, Default)]
pub struct FailingWeb {
	pub calls: Arc<AtomicUsize>,
}
impl WebSearchProvider for FailingWeb {
	fn search<'a>(
		&'a self,
		_cfg: &'a WebSearchProviderConfig,
		_query: &'a str,
		_limit: u32,
	) -> BoxFuture<'a, sift_providers::Result<Vec<WebHit>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			Err(sift_providers::Error::InvalidResponse {
				message: "Web search returned status 503.".to_string(),
			})
		})
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct RerankCall {
	pub model: String,
	pub query: String,
	pub docs: Vec<String>,
	pub top_n: usize,
}

/// Keeps the submitted order, truncates to `top_n`, and records every call.
#[derive(Debug, Default)]
pub struct RecordingRerank {
	pub calls: Arc<Mutex<Vec<RerankCall>>>,
}
impl RecordingRerank {
	pub fn calls(&self) -> Vec<RerankCall> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl RerankProvider for RecordingRerank {
	fn rerank<'a>(
		&'a self,
		_cfg: &'a RerankProviderConfig,
		model: &'a str,
		query: &'a str,
		docs: &'a [String],
		top_n: usize,
	) -> BoxFuture<'a, sift_providers::Result<Vec<RerankHit>>> {
		self.calls.lock().unwrap_or_else(|err| err.into_inner()).push(RerankCall {
			model: model.to_string(),
			query: query.to_string(),
			docs: docs.to_vec(),
			top_n,
		});

		let hits = (0..docs.len().min(top_n))
			.map(|index| RerankHit { index, relevance_score: 1.0 / (index as f32 + 1.0) })
			.collect();

		Box::pin(async move { Ok(hits) })
	}
}

/// Returns the documents in reverse submission order.
#[derive(Debug, Default)]
pub struct ReversingRerank;
impl RerankProvider for ReversingRerank {
	fn rerank<'a>(
		&'a self,
		_cfg: &'a RerankProviderConfig,
		_model: &'a str,
		_query: &'a str,
		docs: &'a [String],
		top_n: usize,
	) -> BoxFuture<'a, sift_providers::Result<Vec<RerankHit>>> {
		let hits = (0..docs.len())
			.rev()
			.take(top_n)
			.enumerate()
			.map(|(rank, index)| RerankHit { index, relevance_score: 1.0 / (rank as f32 + 1.0) })
			.collect();

		Box::pin(async move { Ok(hits) })
	}
}

pub struct FailingRerank;
impl RerankProvider for FailingRerank {
	fn rerank<'a>(
		&'a self,
		_cfg: &'a RerankProviderConfig,
		_model: &'a str,
		_query: &'a str,
		_docs: &'a [String],
		_top_n: usize,
	) -> BoxFuture<'a, sift_providers::Result<Vec<RerankHit>>> {
		Box::pin(async move {
			Err(sift_providers::Error::InvalidResponse {
				message: "Rerank service unavailable.".to_string(),
			})
		})
	}
}

/// A web page with `snippets` numbered snippets.
pub fn web_hit(url: &str, snippets: usize) -> WebHit {
	WebHit {
		url: url.to_string(),
		title: format!("Page {url}"),
		description: format!("Web page at {url}"),
		snippets: (0..snippets).map(|idx| format!("Snippet {idx} from {url}")).collect(),
	}
}

/// A passage embedded with [`HashedEmbedding::default`].
pub fn passage(id: &str, text: &str, language: &str, tags: &[&str]) -> Passage {
	Passage {
		id: id.to_string(),
		text: text.to_string(),
		metadata: CandidateMetadata {
			origin_url: format!("https://docs.example.com/{id}"),
			source_language: language.to_string(),
			tags: tags.iter().map(|tag| tag.to_string()).collect(),
			title: id.to_string(),
			description: String::new(),
		},
		embedding: HashedEmbedding::default().embed_text(text),
	}
}

pub fn passage_index(passages: Vec<Passage>) -> Result<PassageIndex> {
	PassageIndex::from_passages(passages, TEST_DIMENSIONS as usize).map_err(Error::from)
}

/// A small support-docs corpus in two languages.
pub fn sample_passages() -> Vec<Passage> {
	vec![
		passage(
			"log-metrics",
			"Call wandb.log to record metrics such as loss and accuracy during training.",
			"en",
			&["guide", "logging"],
		),
		passage(
			"log-tables",
			"Log a wandb.Table to compare predictions across training runs.",
			"en",
			&["guide", "tables"],
		),
		passage(
			"sweeps",
			"Sweeps search hyperparameters and log metrics for every run.",
			"en",
			&["guide", "sweeps"],
		),
		passage(
			"python-init",
			"import wandb\nrun = wandb.init(project=\"demo\")\nrun.log({\"loss\": 0.1})",
			"python",
			&["code"],
		),
		passage(
			"artifacts-ja",
			"アーティファクトを使ってデータセットのバージョンを管理します。",
			"ja",
			&["guide", "artifacts"],
		),
		passage(
			"reports-fr",
			"Les rapports partagent les métriques de training avec votre équipe.",
			"fr",
			&["guide", "reports"],
		),
	]
}
