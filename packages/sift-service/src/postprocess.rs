use sift_config::RerankProviderConfig;
use sift_domain::{Entry, LanguagePolicy, TagPolicy};
use sift_providers::RerankProvider;

use crate::{Error, Result};

/// Semantic re-rank through the external rerank service.
pub struct Reranker<'a> {
	pub provider: &'a dyn RerankProvider,
	pub cfg: &'a RerankProviderConfig,
	pub model: &'a str,
	pub top_n: usize,
}
impl Reranker<'_> {
	/// Returns the service's top-n ordering. Sentinels are ranked as plain text.
	pub async fn apply(&self, query: &str, entries: Vec<Entry>) -> Result<Vec<Entry>> {
		if entries.is_empty() || self.top_n == 0 {
			return Ok(Vec::new());
		}

		let docs: Vec<String> = entries.iter().map(|entry| entry.text().to_string()).collect();
		let hits = self
			.provider
			.rerank(self.cfg, self.model, query, &docs, self.top_n)
			.await
			.map_err(|err| {
				tracing::error!(
					error = %err,
					model = self.model,
					documents = docs.len(),
					"Rerank request failed."
				);

				Error::Provider { message: err.to_string() }
			})?;
		let mut out = Vec::with_capacity(hits.len());

		for hit in hits.into_iter().take(self.top_n) {
			let Some(entry) = entries.get(hit.index) else {
				return Err(Error::Provider {
					message: format!(
						"Rerank result index {} is out of range for {} documents.",
						hit.index,
						entries.len()
					),
				});
			};

			out.push(entry.rescored(hit.relevance_score));
		}

		Ok(out)
	}
}

pub enum Postprocessor<'a> {
	Tags(TagPolicy),
	Language(LanguagePolicy),
	Rerank(Reranker<'a>),
}
impl Postprocessor<'_> {
	pub fn name(&self) -> &'static str {
		match self {
			Self::Tags(_) => "tags",
			Self::Language(_) => "language",
			Self::Rerank(_) => "rerank",
		}
	}

	pub async fn apply(&self, query: &str, entries: Vec<Entry>) -> Result<Vec<Entry>> {
		match self {
			Self::Tags(policy) => Ok(policy.apply(entries)),
			Self::Language(policy) => Ok(policy.apply(entries)),
			Self::Rerank(reranker) => reranker.apply(query, entries).await,
		}
	}
}

/// Ordered post-processing stages. Each stage sees the previous stage's output.
pub struct Pipeline<'a> {
	stages: Vec<Postprocessor<'a>>,
}
impl<'a> Pipeline<'a> {
	pub fn new(stages: Vec<Postprocessor<'a>>) -> Self {
		Self { stages }
	}

	/// Tags, then language, then rerank.
	pub fn standard(tags: TagPolicy, language: LanguagePolicy, reranker: Reranker<'a>) -> Self {
		Self::new(vec![
			Postprocessor::Tags(tags),
			Postprocessor::Language(language),
			Postprocessor::Rerank(reranker),
		])
	}

	pub fn stage_names(&self) -> Vec<&'static str> {
		self.stages.iter().map(Postprocessor::name).collect()
	}

	pub async fn apply(&self, query: &str, mut entries: Vec<Entry>) -> Result<Vec<Entry>> {
		for stage in &self.stages {
			let before = entries.len();

			entries = stage.apply(query, entries).await?;

			tracing::debug!(
				stage = stage.name(),
				before,
				after = entries.len(),
				sentinels = entries.iter().filter(|entry| entry.is_no_result()).count(),
				"Post-processing stage applied."
			);
		}

		Ok(entries)
	}
}
