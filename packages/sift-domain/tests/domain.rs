use sift_domain::{Candidate, CandidateMetadata, Entry, LanguagePolicy, NO_RESULT_TEXT, TagPolicy};

fn passage(id: &str, language: &str, tags: &[&str]) -> Entry {
	Entry::Passage(Candidate::new(
		id,
		format!("text of {id}"),
		1.0,
		CandidateMetadata {
			origin_url: format!("https://docs.example.com/{id}"),
			source_language: language.to_string(),
			tags: tags.iter().map(|tag| tag.to_string()).collect(),
			title: id.to_string(),
			description: String::new(),
		},
	))
}

fn ids(entries: &[Entry]) -> Vec<Option<&str>> {
	entries.iter().map(|entry| entry.candidate().map(Candidate::id)).collect()
}

#[test]
fn tag_policy_without_tags_is_a_passthrough() {
	let input = vec![passage("a", "en", &[]), passage("b", "en", &["x"])];
	let policy = TagPolicy::new(Vec::<String>::new(), Vec::<String>::new(), 10);
	let output = policy.apply(input.clone());

	assert_eq!(output, input);
}

#[test]
fn tag_policy_pads_to_minimum_with_no_result_entries() {
	let mut input = Vec::new();

	for idx in 0..6 {
		let tags: &[&str] = if idx % 2 == 0 { &["sdk"] } else { &["forum"] };

		input.push(passage(&format!("doc-{idx}"), "en", tags));
	}

	let policy = TagPolicy::new(["sdk"], Vec::<String>::new(), 10);
	let output = policy.apply(input);

	assert_eq!(output.len(), 10);
	assert_eq!(&ids(&output)[..3], &[Some("doc-0"), Some("doc-2"), Some("doc-4")]);
	assert!(output[3..].iter().all(Entry::is_no_result));
	assert!(output[3..].iter().all(|entry| entry.text() == NO_RESULT_TEXT));
}

#[test]
fn tag_policy_does_not_truncate_when_above_minimum() {
	let input: Vec<Entry> = (0..5).map(|idx| passage(&format!("doc-{idx}"), "en", &["sdk"])).collect();
	let policy = TagPolicy::new(["sdk"], Vec::<String>::new(), 2);

	assert_eq!(policy.apply(input).len(), 5);
}

#[test]
fn tag_policy_exclusion_uses_all_of_semantics() {
	let input = vec![passage("abc", "en", &["a", "b", "c"]), passage("a", "en", &["a"])];
	let subset = TagPolicy::new(Vec::<String>::new(), ["a", "b"], 0).apply(input.clone());
	let not_subset = TagPolicy::new(Vec::<String>::new(), ["a", "d"], 0).apply(input);

	assert_eq!(ids(&subset), vec![Some("a")]);
	assert_eq!(ids(&not_subset), vec![Some("abc"), Some("a")]);
}

#[test]
fn language_policy_pads_from_front_of_unfiltered_list() {
	let input = vec![
		passage("en-0", "en", &[]),
		passage("en-1", "en", &[]),
		passage("en-2", "en", &[]),
		passage("fr-0", "fr", &[]),
		passage("en-3", "en", &[]),
		passage("en-4", "en", &[]),
		passage("en-5", "en", &[]),
		passage("en-6", "en", &[]),
	];
	let policy = LanguagePolicy::new("fr", "python", 5);
	let output = policy.apply(input);

	assert_eq!(
		ids(&output),
		vec![Some("fr-0"), Some("en-0"), Some("en-1"), Some("en-2"), Some("fr-0")]
	);
}

#[test]
fn language_policy_padding_can_duplicate_a_leading_match() {
	let input = vec![
		passage("fr-0", "fr", &[]),
		passage("en-0", "en", &[]),
		passage("en-1", "en", &[]),
		passage("en-2", "en", &[]),
	];
	let policy = LanguagePolicy::new("fr", "python", 3);
	let output = policy.apply(input);

	assert_eq!(ids(&output), vec![Some("fr-0"), Some("fr-0"), Some("en-0")]);
}

#[test]
fn language_policy_stops_when_unfiltered_input_is_exhausted() {
	let input = vec![passage("en-0", "en", &[]), passage("en-1", "en", &[])];
	let policy = LanguagePolicy::new("fr", "python", 5);
	let output = policy.apply(input);

	assert_eq!(ids(&output), vec![Some("en-0"), Some("en-1")]);
}

#[test]
fn language_policy_keeps_fallback_language_matches() {
	let input = vec![
		passage("py-0", "python", &[]),
		passage("en-0", "en", &[]),
		passage("ja-0", "ja", &[]),
	];
	let policy = LanguagePolicy::new("ja", "python", 1);
	let output = policy.apply(input);

	assert_eq!(ids(&output), vec![Some("py-0"), Some("ja-0")]);
}

#[test]
fn metadata_serializes_with_wire_field_names() {
	let entry = passage("doc", "en", &["sdk"]);
	let json = serde_json::to_value(entry.metadata()).expect("Failed to serialize metadata.");

	assert_eq!(json["source"], "https://docs.example.com/doc");
	assert_eq!(json["language"], "en");
	assert_eq!(json["tags"][0], "sdk");
}
