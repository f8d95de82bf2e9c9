use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Text carried by the no-result placeholder.
pub const NO_RESULT_TEXT: &str = "No results found";
/// Reserved `source` value that marks the no-result placeholder in projected metadata.
pub const NO_RESULT_SOURCE: &str = "no-result";

static NO_RESULT_METADATA: LazyLock<CandidateMetadata> = LazyLock::new(|| CandidateMetadata {
	origin_url: NO_RESULT_SOURCE.to_string(),
	source_language: "en".to_string(),
	tags: vec![NO_RESULT_SOURCE.to_string()],
	title: "No Result".to_string(),
	description: "Placeholder used when too few passages survive filtering.".to_string(),
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMetadata {
	#[serde(rename = "source")]
	pub origin_url: String,
	#[serde(rename = "language")]
	pub source_language: String,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub description: String,
}

/// A scored passage produced by one source retriever.
///
/// Fields are private: once produced, a candidate is only ever filtered, reordered, or replaced
/// by a rescored copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
	id: String,
	text: String,
	score: f32,
	metadata: CandidateMetadata,
}
impl Candidate {
	pub fn new(
		id: impl Into<String>,
		text: impl Into<String>,
		score: f32,
		metadata: CandidateMetadata,
	) -> Self {
		Self { id: id.into(), text: text.into(), score, metadata }
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn score(&self) -> f32 {
		self.score
	}

	pub fn metadata(&self) -> &CandidateMetadata {
		&self.metadata
	}

	pub fn rescored(&self, score: f32) -> Self {
		Self { score, ..self.clone() }
	}
}

/// One slot in a post-processed result list.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
	Passage(Candidate),
	/// Padding inserted to satisfy a minimum result size. Carries no content.
	NoResult { score: f32 },
}
impl Entry {
	pub fn no_result() -> Self {
		Self::NoResult { score: 0.0 }
	}

	pub fn is_no_result(&self) -> bool {
		matches!(self, Self::NoResult { .. })
	}

	pub fn candidate(&self) -> Option<&Candidate> {
		match self {
			Self::Passage(candidate) => Some(candidate),
			Self::NoResult { .. } => None,
		}
	}

	pub fn text(&self) -> &str {
		match self {
			Self::Passage(candidate) => candidate.text(),
			Self::NoResult { .. } => NO_RESULT_TEXT,
		}
	}

	pub fn score(&self) -> f32 {
		match self {
			Self::Passage(candidate) => candidate.score(),
			Self::NoResult { score } => *score,
		}
	}

	pub fn metadata(&self) -> &CandidateMetadata {
		match self {
			Self::Passage(candidate) => candidate.metadata(),
			Self::NoResult { .. } => &NO_RESULT_METADATA,
		}
	}

	pub fn rescored(&self, score: f32) -> Self {
		match self {
			Self::Passage(candidate) => Self::Passage(candidate.rescored(score)),
			Self::NoResult { .. } => Self::NoResult { score },
		}
	}
}
impl From<Candidate> for Entry {
	fn from(candidate: Candidate) -> Self {
		Self::Passage(candidate)
	}
}
