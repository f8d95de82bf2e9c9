//! BM25 Okapi lexical index over the passage store.

use std::{cmp::Ordering, collections::HashMap};

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::Passage;

const BM25_K1: f32 = 1.2;
const BM25_B: f32 = 0.75;

#[derive(Debug, Clone, Copy)]
struct Posting {
	passage: u32,
	term_frequency: u32,
}

#[derive(Debug, Default)]
pub struct LexicalIndex {
	postings: HashMap<String, Vec<Posting>>,
	passage_lengths: Vec<u32>,
	total_length: u64,
}
impl LexicalIndex {
	pub fn build(passages: &[Passage]) -> Self {
		let mut index = Self::default();

		for (position, passage) in passages.iter().enumerate() {
			index.add(position as u32, &passage.text);
		}

		index
	}

	pub fn len(&self) -> usize {
		self.passage_lengths.len()
	}

	pub fn is_empty(&self) -> bool {
		self.passage_lengths.is_empty()
	}

	/// Scores passages against `query`, best first. Returns store positions.
	pub fn search(&self, query: &str, limit: usize) -> Vec<(usize, f32)> {
		let terms = tokenize(query);

		if terms.is_empty() || self.is_empty() || limit == 0 {
			return Vec::new();
		}

		let n = self.len() as f32;
		let avg_len = self.total_length as f32 / n;
		let mut scores: HashMap<u32, f32> = HashMap::new();

		for term in &terms {
			let Some(postings) = self.postings.get(term) else {
				continue;
			};
			let df = postings.len() as f32;
			let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

			for posting in postings {
				let len = self.passage_lengths[posting.passage as usize] as f32;
				let tf = posting.term_frequency as f32;
				let norm = if avg_len > 0.0 { len / avg_len } else { 0.0 };
				let tf_part = (tf * (BM25_K1 + 1.0)) / (tf + BM25_K1 * (1.0 - BM25_B + BM25_B * norm));

				*scores.entry(posting.passage).or_insert(0.0) += idf * tf_part;
			}
		}

		let mut ranked: Vec<(usize, f32)> =
			scores.into_iter().map(|(passage, score)| (passage as usize, score)).collect();

		ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
		ranked.truncate(limit);

		ranked
	}

	fn add(&mut self, position: u32, text: &str) {
		let tokens = tokenize(text);
		let mut frequencies: HashMap<String, u32> = HashMap::new();

		for token in &tokens {
			*frequencies.entry(token.clone()).or_insert(0) += 1;
		}
		for (term, term_frequency) in frequencies {
			self.postings
				.entry(term)
				.or_default()
				.push(Posting { passage: position, term_frequency });
		}

		self.passage_lengths.push(tokens.len() as u32);
		self.total_length += tokens.len() as u64;
	}
}

pub fn tokenize(text: &str) -> Vec<String> {
	let normalized: String = text.nfkc().collect::<String>().to_lowercase();

	normalized.unicode_words().map(str::to_string).collect()
}
