mod error;

pub mod lexical;

pub use error::{Error, Result};
pub use lexical::LexicalIndex;

use std::{cmp::Ordering, collections::HashSet, fs, path::Path};

use serde::Deserialize;

use sift_domain::{Candidate, CandidateMetadata};

/// One indexed passage as stored in the artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct Passage {
	pub id: String,
	pub text: String,
	pub metadata: CandidateMetadata,
	#[serde(default)]
	pub embedding: Vec<f32>,
}
impl Passage {
	pub fn to_candidate(&self, score: f32) -> Candidate {
		Candidate::new(self.id.clone(), self.text.clone(), score, self.metadata.clone())
	}
}

/// Read-only passage store with dense nearest-neighbour search.
#[derive(Debug)]
pub struct PassageIndex {
	passages: Vec<Passage>,
	norms: Vec<f32>,
	dimensions: usize,
}
impl PassageIndex {
	pub fn load(path: &Path, dimensions: usize) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadArtifact { path: path.to_path_buf(), source: err })?;
		let mut passages = Vec::new();

		for (idx, line) in raw.lines().enumerate() {
			if line.trim().is_empty() {
				continue;
			}

			let passage: Passage = serde_json::from_str(line).map_err(|err| {
				Error::ParseArtifact { path: path.to_path_buf(), line: idx + 1, source: err }
			})?;

			passages.push(passage);
		}

		let index = Self::from_passages(passages, dimensions)?;

		tracing::info!(path = %path.display(), passages = index.len(), "Passage index loaded.");

		Ok(index)
	}

	pub fn from_passages(passages: Vec<Passage>, dimensions: usize) -> Result<Self> {
		let mut seen = HashSet::with_capacity(passages.len());
		let mut norms = Vec::with_capacity(passages.len());

		for passage in &passages {
			if !seen.insert(passage.id.as_str()) {
				return Err(Error::DuplicatePassage { id: passage.id.clone() });
			}
			if passage.embedding.len() != dimensions {
				return Err(Error::DimensionMismatch {
					context: format!("passage {}", passage.id),
					expected: dimensions,
					actual: passage.embedding.len(),
				});
			}

			norms.push(l2_norm(&passage.embedding));
		}

		Ok(Self { passages, norms, dimensions })
	}

	pub fn len(&self) -> usize {
		self.passages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.passages.is_empty()
	}

	pub fn passage(&self, position: usize) -> Option<&Passage> {
		self.passages.get(position)
	}

	pub fn lexical_index(&self) -> LexicalIndex {
		LexicalIndex::build(&self.passages)
	}

	/// Cosine similarity search, best first. Ties keep store order.
	pub fn nearest(&self, query: &[f32], limit: usize) -> Result<Vec<(usize, f32)>> {
		if query.len() != self.dimensions {
			return Err(Error::DimensionMismatch {
				context: "query".to_string(),
				expected: self.dimensions,
				actual: query.len(),
			});
		}

		let query_norm = l2_norm(query);

		if query_norm == 0.0 || limit == 0 {
			return Ok(Vec::new());
		}

		let mut scored: Vec<(usize, f32)> = self
			.passages
			.iter()
			.zip(&self.norms)
			.enumerate()
			.filter(|(_, (_, norm))| **norm > 0.0)
			.map(|(position, (passage, norm))| {
				let dot: f32 = passage.embedding.iter().zip(query).map(|(a, b)| a * b).sum();

				(position, dot / (norm * query_norm))
			})
			.collect();

		scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
		scored.truncate(limit);

		Ok(scored)
	}
}

fn l2_norm(vec: &[f32]) -> f32 {
	vec.iter().map(|value| value * value).sum::<f32>().sqrt()
}
