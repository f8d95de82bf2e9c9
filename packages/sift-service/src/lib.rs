pub mod engine;
pub mod error;
pub mod fusion;
pub mod postprocess;
pub mod retrieve;
pub mod source;

pub use engine::{QueryEngine, QueryPolicy};
pub use error::{Error, Result};
pub use fusion::FusionRetriever;
pub use postprocess::{Pipeline, Postprocessor, Reranker};
pub use retrieve::{AvoidLatch, ItemKind, RetrieveRequest, RetrieveResponse, RetrievedItem};
pub use sift_providers::{EmbeddingProvider, RerankProvider, WebSearchProvider};
pub use source::{SourceKind, SourceOutcome, SourceRetriever};

use std::{path::Path, sync::Arc};

use sift_config::Config;
use sift_index::PassageIndex;
use sift_providers::HttpProviders;

use crate::source::{LexicalSource, VectorSource, WebSource};

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub rerank: Arc<dyn RerankProvider>,
	pub web: Arc<dyn WebSearchProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		rerank: Arc<dyn RerankProvider>,
		web: Arc<dyn WebSearchProvider>,
	) -> Self {
		Self { embedding, rerank, web }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(HttpProviders);

		Self { embedding: provider.clone(), rerank: provider.clone(), web: provider }
	}
}

/// The retrieval session: configuration plus a fusion retriever over the shared passage index.
///
/// Holds no per-call mutable state, so one instance serves concurrent requests.
pub struct SiftService {
	pub cfg: Config,
	pub providers: Providers,
	fusion: FusionRetriever,
}
impl SiftService {
	pub fn new(cfg: Config, index: PassageIndex) -> Self {
		Self::with_providers(cfg, index, Providers::default())
	}

	pub fn with_providers(cfg: Config, index: PassageIndex, providers: Providers) -> Self {
		let index = Arc::new(index);
		let fusion = FusionRetriever::new(vec![
			SourceRetriever::Lexical(LexicalSource::new(index.clone())),
			SourceRetriever::Vector(VectorSource::new(
				index.clone(),
				providers.embedding.clone(),
				cfg.providers.embedding.clone(),
			)),
			SourceRetriever::Web(WebSource::new(providers.web.clone(), cfg.providers.web.clone())),
		]);

		Self { cfg, providers, fusion }
	}

	/// Loads the passage artifact named by `index.path` and wires the HTTP providers.
	pub fn load(cfg: Config) -> Result<Self> {
		let index = PassageIndex::load(Path::new(&cfg.index.path), cfg.index.dimensions as usize)?;

		Ok(Self::new(cfg, index))
	}

	pub fn fusion(&self) -> &FusionRetriever {
		&self.fusion
	}
}
