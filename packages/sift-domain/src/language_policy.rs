use crate::{CandidateMetadata, Entry};

/// Keeps passages written in the target language or the fallback language.
///
/// When fewer than `min_result_size` passages match, the matches are topped up from the front of
/// the unfiltered input, so a match that also sits near the front of the input appears twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePolicy {
	languages: Vec<String>,
	min_result_size: usize,
}
impl LanguagePolicy {
	pub fn new(target_language: &str, fallback_language: &str, min_result_size: usize) -> Self {
		let mut languages = vec![normalize_language(target_language)];
		let fallback = normalize_language(fallback_language);

		if !languages.contains(&fallback) {
			languages.push(fallback);
		}

		languages.retain(|language| !language.is_empty());

		Self { languages, min_result_size }
	}

	pub fn languages(&self) -> &[String] {
		&self.languages
	}

	pub fn accepts(&self, metadata: &CandidateMetadata) -> bool {
		let language = normalize_language(&metadata.source_language);

		self.languages.iter().any(|accepted| *accepted == language)
	}

	pub fn apply(&self, entries: Vec<Entry>) -> Vec<Entry> {
		let mut matched: Vec<Entry> =
			entries.iter().filter(|entry| self.accepts(entry.metadata())).cloned().collect();

		if matched.len() < self.min_result_size {
			let missing = self.min_result_size - matched.len();

			matched.extend(entries.into_iter().take(missing));
		}

		matched
	}
}

fn normalize_language(raw: &str) -> String {
	raw.trim().to_lowercase()
}
