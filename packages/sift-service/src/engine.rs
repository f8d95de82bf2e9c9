use sift_domain::Entry;

use crate::{Result, fusion::FusionRetriever, postprocess::Pipeline};

/// Per-call retrieval policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPolicy {
	pub top_k: usize,
	pub language: String,
	pub include_tags: Vec<String>,
	pub exclude_tags: Vec<String>,
}

/// A shared fusion retriever bound to one call's pipeline. Cheap to build per request.
pub struct QueryEngine<'a> {
	fusion: &'a FusionRetriever,
	pipeline: Pipeline<'a>,
	limit: usize,
}
impl<'a> QueryEngine<'a> {
	pub fn new(fusion: &'a FusionRetriever, pipeline: Pipeline<'a>, limit: usize) -> Self {
		Self { fusion, pipeline, limit }
	}

	pub fn pipeline(&self) -> &Pipeline<'a> {
		&self.pipeline
	}

	pub async fn execute(&self, query: &str, avoid_extra_source: bool) -> Result<Vec<Entry>> {
		let candidates = self.fusion.retrieve(query, self.limit, avoid_extra_source).await;
		let entries = candidates.into_iter().map(Entry::from).collect();

		self.pipeline.apply(query, entries).await
	}
}
