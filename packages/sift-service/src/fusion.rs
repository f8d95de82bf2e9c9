use std::collections::HashSet;

use futures_util::future;

use crate::source::{SourceKind, SourceOutcome, SourceRetriever};
use sift_domain::Candidate;

/// Runs every source concurrently and merges their candidates.
///
/// Merge order is lexical, then vector, then web. When two sources return the same passage id,
/// the copy from the earlier source is kept along with its score.
pub struct FusionRetriever {
	sources: Vec<SourceRetriever>,
}
impl FusionRetriever {
	pub fn new(sources: Vec<SourceRetriever>) -> Self {
		Self { sources }
	}

	pub async fn retrieve(
		&self,
		query: &str,
		limit: usize,
		avoid_extra_source: bool,
	) -> Vec<Candidate> {
		let active: Vec<&SourceRetriever> = self
			.sources
			.iter()
			.filter(|source| !(avoid_extra_source && source.kind() == SourceKind::Web))
			.collect();
		let mut outcomes = future::join_all(active.iter().map(|source| async move {
			(source.kind(), source.retrieve(query, limit).await)
		}))
		.await;

		outcomes.sort_by_key(|(kind, _)| *kind);

		let mut seen = HashSet::new();
		let mut merged = Vec::new();

		for (kind, outcome) in outcomes {
			if let SourceOutcome::Degraded { reason } = &outcome {
				tracing::warn!(
					source = kind.as_str(),
					reason = %reason,
					"Retrieval source degraded. Continuing without it."
				);
			}

			let candidates = outcome.into_candidates();
			let produced = candidates.len();
			let before = merged.len();

			for candidate in candidates {
				if seen.insert(candidate.id().to_string()) {
					merged.push(candidate);
				}
			}

			tracing::debug!(
				source = kind.as_str(),
				produced,
				kept = merged.len() - before,
				"Merged source candidates."
			);
		}

		tracing::debug!(fused = merged.len(), avoid_extra_source, "Fused source candidates.");

		merged
	}
}
