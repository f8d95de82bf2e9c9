use std::{sync::Arc, time::Duration};

use uuid::Uuid;

use sift_config::{EmbeddingProviderConfig, WEB_RESULT_CEILING, WebSearchProviderConfig};
use sift_domain::{Candidate, CandidateMetadata};
use sift_index::{LexicalIndex, PassageIndex};
use sift_providers::{EmbeddingProvider, WebHit, WebSearchProvider};

/// Retrieval sources in dedup precedence order: earlier variants win ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
	Lexical,
	Vector,
	Web,
}
impl SourceKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Lexical => "lexical",
			Self::Vector => "vector",
			Self::Web => "web",
		}
	}
}

/// What a source produced for one query.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
	Ok(Vec<Candidate>),
	/// The backend failed or timed out. Fusion treats this as zero candidates.
	Degraded { reason: String },
}
impl SourceOutcome {
	pub fn into_candidates(self) -> Vec<Candidate> {
		match self {
			Self::Ok(candidates) => candidates,
			Self::Degraded { .. } => Vec::new(),
		}
	}
}

pub enum SourceRetriever {
	Lexical(LexicalSource),
	Vector(VectorSource),
	Web(WebSource),
}
impl SourceRetriever {
	pub fn kind(&self) -> SourceKind {
		match self {
			Self::Lexical(_) => SourceKind::Lexical,
			Self::Vector(_) => SourceKind::Vector,
			Self::Web(_) => SourceKind::Web,
		}
	}

	pub async fn retrieve(&self, query: &str, limit: usize) -> SourceOutcome {
		match self {
			Self::Lexical(source) => source.retrieve(query, limit),
			Self::Vector(source) => source.retrieve(query, limit).await,
			Self::Web(source) => source.retrieve(query, limit).await,
		}
	}
}

/// BM25 over the passage store.
pub struct LexicalSource {
	index: Arc<PassageIndex>,
	lexical: LexicalIndex,
}
impl LexicalSource {
	pub fn new(index: Arc<PassageIndex>) -> Self {
		let lexical = index.lexical_index();

		Self { index, lexical }
	}

	fn retrieve(&self, query: &str, limit: usize) -> SourceOutcome {
		let candidates = self
			.lexical
			.search(query, limit)
			.into_iter()
			.filter_map(|(position, score)| {
				self.index.passage(position).map(|passage| passage.to_candidate(score))
			})
			.collect();

		SourceOutcome::Ok(candidates)
	}
}

/// Nearest neighbours of the query embedding.
pub struct VectorSource {
	index: Arc<PassageIndex>,
	provider: Arc<dyn EmbeddingProvider>,
	cfg: EmbeddingProviderConfig,
}
impl VectorSource {
	pub fn new(
		index: Arc<PassageIndex>,
		provider: Arc<dyn EmbeddingProvider>,
		cfg: EmbeddingProviderConfig,
	) -> Self {
		Self { index, provider, cfg }
	}

	async fn retrieve(&self, query: &str, limit: usize) -> SourceOutcome {
		let texts = [query.to_string()];
		let embedding = match self.provider.embed(&self.cfg, &texts).await {
			Ok(embeddings) => embeddings.into_iter().next(),
			Err(err) => return SourceOutcome::Degraded { reason: err.to_string() },
		};
		let Some(embedding) = embedding else {
			return SourceOutcome::Degraded {
				reason: "Embedding provider returned no vectors.".to_string(),
			};
		};

		match self.index.nearest(&embedding, limit) {
			Ok(hits) => SourceOutcome::Ok(
				hits.into_iter()
					.filter_map(|(position, score)| {
						self.index.passage(position).map(|passage| passage.to_candidate(score))
					})
					.collect(),
			),
			Err(err) => SourceOutcome::Degraded { reason: err.to_string() },
		}
	}
}

/// External web search. Never fails the request: errors and timeouts degrade to no results.
pub struct WebSource {
	provider: Arc<dyn WebSearchProvider>,
	cfg: WebSearchProviderConfig,
}
impl WebSource {
	pub fn new(provider: Arc<dyn WebSearchProvider>, cfg: WebSearchProviderConfig) -> Self {
		Self { provider, cfg }
	}

	async fn retrieve(&self, query: &str, limit: usize) -> SourceOutcome {
		let limit = u32::try_from(limit).unwrap_or(u32::MAX).min(WEB_RESULT_CEILING);
		let timeout = Duration::from_millis(self.cfg.timeout_ms);
		let hits =
			match tokio::time::timeout(timeout, self.provider.search(&self.cfg, query, limit)).await {
				Ok(Ok(hits)) => hits,
				Ok(Err(err)) => return SourceOutcome::Degraded { reason: err.to_string() },
				Err(_) => {
					return SourceOutcome::Degraded {
						reason: format!("Web search timed out after {} ms.", self.cfg.timeout_ms),
					};
				},
			};

		SourceOutcome::Ok(web_candidates(&self.cfg, hits))
	}
}

/// Stable id of the `ordinal`-th snippet of the hit at `position` in a search response.
pub fn web_candidate_id(url: &str, position: usize, ordinal: usize) -> String {
	let seed = format!("{url}#{position}#{ordinal}");

	Uuid::new_v5(&Uuid::NAMESPACE_URL, seed.as_bytes()).to_string()
}

/// Fans each snippet out into its own candidate sharing the page metadata.
fn web_candidates(cfg: &WebSearchProviderConfig, hits: Vec<WebHit>) -> Vec<Candidate> {
	let mut out = Vec::new();

	for (position, hit) in hits.into_iter().enumerate() {
		let metadata = CandidateMetadata {
			origin_url: hit.url.clone(),
			source_language: cfg.language.clone(),
			tags: cfg.tags.clone(),
			title: hit.title.clone(),
			description: hit.description.clone(),
		};

		for (ordinal, snippet) in hit.snippets.into_iter().enumerate() {
			let id = web_candidate_id(&hit.url, position, ordinal);

			out.push(Candidate::new(id, snippet, 1.0, metadata.clone()));
		}
	}

	out.truncate(WEB_RESULT_CEILING as usize);

	out
}
