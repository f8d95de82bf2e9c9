use serde::{Deserialize, Serialize};
use tracing::Instrument;

use sift_domain::{CandidateMetadata, Entry, LanguagePolicy, TagPolicy};

use crate::{
	Error, Result, SiftService,
	engine::{QueryEngine, QueryPolicy},
	postprocess::{Pipeline, Reranker},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrieveRequest {
	pub query: String,
	pub language: Option<String>,
	pub top_k: Option<u32>,
	pub include_tags: Option<Vec<String>>,
	pub exclude_tags: Option<Vec<String>>,
	pub avoid_extra_source: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
	Passage,
	NoResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedItem {
	pub kind: ItemKind,
	pub text: String,
	pub metadata: CandidateMetadata,
	pub score: f32,
}
impl From<Entry> for RetrievedItem {
	fn from(entry: Entry) -> Self {
		let kind = if entry.is_no_result() { ItemKind::NoResult } else { ItemKind::Passage };

		Self {
			kind,
			text: entry.text().to_string(),
			metadata: entry.metadata().clone(),
			score: entry.score(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrieveResponse {
	pub items: Vec<RetrievedItem>,
}

/// Caller-owned "skip the web source next time" intent.
///
/// Consumed by the next [`SiftService::retrieve_latched`] call whatever that call asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AvoidLatch(Option<bool>);
impl AvoidLatch {
	pub fn set(&mut self, avoid_extra_source: bool) {
		self.0 = Some(avoid_extra_source);
	}

	pub fn is_set(&self) -> bool {
		self.0.unwrap_or(false)
	}

	pub fn take(&mut self) -> bool {
		self.0.take().unwrap_or(false)
	}
}

impl SiftService {
	/// Builds a query engine over the shared fusion retriever for one call's policy.
	pub fn query_engine(&self, policy: &QueryPolicy) -> QueryEngine<'_> {
		let retrieval = &self.cfg.retrieval;
		let tags = TagPolicy::new(&policy.include_tags, &policy.exclude_tags, policy.top_k);
		let language =
			LanguagePolicy::new(&policy.language, &retrieval.fallback_language, policy.top_k);
		let reranker = Reranker {
			provider: self.providers.rerank.as_ref(),
			cfg: &self.cfg.providers.rerank,
			model: self.rerank_model(&policy.language),
			top_n: policy.top_k,
		};

		QueryEngine::new(
			self.fusion(),
			Pipeline::standard(tags, language, reranker),
			retrieval.similarity_top_k as usize,
		)
	}

	/// The default-language variant for the session language, the multilingual one otherwise.
	pub fn rerank_model(&self, language: &str) -> &str {
		let rerank = &self.cfg.providers.rerank;

		if language.trim().eq_ignore_ascii_case(&self.cfg.retrieval.language) {
			&rerank.model
		} else {
			&rerank.multilingual_model
		}
	}

	pub async fn retrieve(&self, req: RetrieveRequest) -> Result<RetrieveResponse> {
		let avoid_extra_source = req.avoid_extra_source.unwrap_or(false);

		self.run_retrieve(req, avoid_extra_source).await
	}

	/// Like [`Self::retrieve`], also honouring and clearing `latch`.
	pub async fn retrieve_latched(
		&self,
		req: RetrieveRequest,
		latch: &mut AvoidLatch,
	) -> Result<RetrieveResponse> {
		let avoid_extra_source = latch.take() || req.avoid_extra_source.unwrap_or(false);

		self.run_retrieve(req, avoid_extra_source).await
	}

	async fn run_retrieve(
		&self,
		req: RetrieveRequest,
		avoid_extra_source: bool,
	) -> Result<RetrieveResponse> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must not be empty.".to_string() });
		}

		let policy = self.resolve_policy(&req)?;
		let span = tracing::info_span!(
			"retrieve",
			query = %query,
			top_k = policy.top_k,
			language = %policy.language,
			avoid_extra_source,
		);

		async {
			let engine = self.query_engine(&policy);
			let entries = engine.execute(query, avoid_extra_source).await?;
			let items: Vec<RetrievedItem> = entries.into_iter().map(RetrievedItem::from).collect();

			tracing::debug!(count = items.len(), "Retrieved results.");

			if let Some(first) = items.first() {
				tracing::debug!(
					kind = ?first.kind,
					source = %first.metadata.origin_url,
					score = first.score,
					"First retrieval result."
				);
			}

			Ok::<_, Error>(RetrieveResponse { items })
		}
		.instrument(span)
		.await
	}

	fn resolve_policy(&self, req: &RetrieveRequest) -> Result<QueryPolicy> {
		let retrieval = &self.cfg.retrieval;
		let top_k = req.top_k.filter(|top_k| *top_k > 0).unwrap_or(retrieval.top_k);

		if top_k > retrieval.max_top_k {
			return Err(Error::InvalidRequest {
				message: format!("top_k must be at most {}.", retrieval.max_top_k),
			});
		}

		let language = req
			.language
			.as_deref()
			.map(|language| language.trim().to_lowercase())
			.filter(|language| !language.is_empty())
			.unwrap_or_else(|| retrieval.language.clone());

		Ok(QueryPolicy {
			top_k: top_k as usize,
			language,
			include_tags: req.include_tags.clone().unwrap_or_default(),
			exclude_tags: req.exclude_tags.clone().unwrap_or_default(),
		})
	}
}
