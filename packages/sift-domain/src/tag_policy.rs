use std::collections::BTreeSet;

use crate::{CandidateMetadata, Entry};

/// Include/exclude tag filter with minimum-size padding.
///
/// A candidate passes when it carries every include tag and does not carry the whole exclude
/// set. Exclusion is "all of", not "any of": `{a, b, c}` is dropped by `{a, b}` but kept by
/// `{a, d}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPolicy {
	include: BTreeSet<String>,
	exclude: BTreeSet<String>,
	min_result_size: usize,
}
impl TagPolicy {
	pub fn new<I, E>(include: I, exclude: E, min_result_size: usize) -> Self
	where
		I: IntoIterator,
		I::Item: AsRef<str>,
		E: IntoIterator,
		E::Item: AsRef<str>,
	{
		Self { include: normalize_tags(include), exclude: normalize_tags(exclude), min_result_size }
	}

	pub fn is_passthrough(&self) -> bool {
		self.include.is_empty() && self.exclude.is_empty()
	}

	pub fn admits(&self, metadata: &CandidateMetadata) -> bool {
		let tags = normalize_tags(&metadata.tags);

		if !self.include.is_empty() && !self.include.is_subset(&tags) {
			return false;
		}
		if !self.exclude.is_empty() && self.exclude.is_subset(&tags) {
			return false;
		}

		true
	}

	pub fn apply(&self, entries: Vec<Entry>) -> Vec<Entry> {
		if self.is_passthrough() {
			return entries;
		}

		let mut kept: Vec<Entry> =
			entries.into_iter().filter(|entry| self.admits(entry.metadata())).collect();

		if kept.len() < self.min_result_size {
			kept.resize(self.min_result_size, Entry::no_result());
		}

		kept
	}
}

fn normalize_tags<I>(tags: I) -> BTreeSet<String>
where
	I: IntoIterator,
	I::Item: AsRef<str>,
{
	tags.into_iter()
		.map(|tag| tag.as_ref().trim().to_lowercase())
		.filter(|tag| !tag.is_empty())
		.collect()
}
