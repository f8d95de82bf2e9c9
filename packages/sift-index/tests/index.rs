use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
};

use sift_domain::CandidateMetadata;
use sift_index::{Error, Passage, PassageIndex};

fn write_temp_artifact(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let mut path = env::temp_dir();

	path.push(format!("sift_index_test_{}_{ordinal}.jsonl", std::process::id()));

	fs::write(&path, payload).expect("Failed to write test artifact.");

	path
}

fn passage(id: &str, embedding: Vec<f32>) -> Passage {
	Passage {
		id: id.to_string(),
		text: format!("passage {id}"),
		metadata: CandidateMetadata {
			origin_url: format!("https://docs.example.com/{id}"),
			source_language: "en".to_string(),
			tags: Vec::new(),
			title: id.to_string(),
			description: String::new(),
		},
		embedding,
	}
}

#[test]
fn loads_jsonl_and_skips_blank_lines() {
	let payload = r#"{"id":"a","text":"Log metrics.","metadata":{"source":"https://docs/a","language":"en","tags":["guide"],"title":"A","description":""},"embedding":[1.0,0.0]}

{"id":"b","text":"Import wandb.","metadata":{"source":"https://docs/b","language":"python","tags":[],"title":"B","description":""},"embedding":[0.0,1.0]}
"#;
	let path = write_temp_artifact(payload);
	let result = PassageIndex::load(&path, 2);

	fs::remove_file(&path).expect("Failed to remove test artifact.");

	let index = result.expect("Expected artifact to load.");

	assert_eq!(index.len(), 2);
	assert_eq!(
		index.passage(1).map(|passage| passage.metadata.source_language.as_str()),
		Some("python")
	);
	assert_eq!(
		index.passage(0).map(|passage| passage.metadata.tags.clone()),
		Some(vec!["guide".to_string()])
	);
}

#[test]
fn parse_errors_report_the_line() {
	let payload = "{\"id\":\"a\",\"text\":\"t\",\"metadata\":{\"source\":\"s\",\"language\":\"en\"},\"embedding\":[1.0]}\nnot json\n";
	let path = write_temp_artifact(payload);
	let result = PassageIndex::load(&path, 1);

	fs::remove_file(&path).expect("Failed to remove test artifact.");

	match result {
		Err(Error::ParseArtifact { line, .. }) => assert_eq!(line, 2),
		other => panic!("Unexpected result: {other:?}"),
	}
}

#[test]
fn rejects_duplicate_ids_and_wrong_widths() {
	let duplicate =
		PassageIndex::from_passages(vec![passage("a", vec![1.0]), passage("a", vec![0.5])], 1);

	assert!(matches!(duplicate, Err(Error::DuplicatePassage { .. })));

	let narrow = PassageIndex::from_passages(vec![passage("a", vec![1.0])], 2);

	assert!(matches!(narrow, Err(Error::DimensionMismatch { expected: 2, actual: 1, .. })));
}

#[test]
fn nearest_orders_by_cosine_similarity() {
	let index = PassageIndex::from_passages(
		vec![
			passage("east", vec![1.0, 0.0]),
			passage("north", vec![0.0, 1.0]),
			passage("north-east", vec![1.0, 1.0]),
			passage("empty", vec![0.0, 0.0]),
		],
		2,
	)
	.expect("Failed to build index.");
	let hits = index.nearest(&[0.0, 2.0], 10).expect("Search failed.");
	let ids: Vec<&str> = hits
		.iter()
		.map(|(position, _)| index.passage(*position).map(|p| p.id.as_str()).unwrap_or_default())
		.collect();

	assert_eq!(ids, vec!["north", "north-east", "east"]);
	assert!((hits[0].1 - 1.0).abs() < 1e-6);
	assert_eq!(index.nearest(&[0.0, 2.0], 1).expect("Search failed.").len(), 1);
}

#[test]
fn nearest_rejects_wrong_query_width() {
	let index = PassageIndex::from_passages(vec![passage("a", vec![1.0, 0.0])], 2)
		.expect("Failed to build index.");

	assert!(matches!(index.nearest(&[1.0], 5), Err(Error::DimensionMismatch { .. })));
}

#[test]
fn lexical_index_covers_the_store() {
	let index = PassageIndex::from_passages(
		vec![passage("alpha", vec![1.0]), passage("beta", vec![1.0])],
		1,
	)
	.expect("Failed to build index.");
	let lexical = index.lexical_index();
	let hits = lexical.search("beta", 5);

	assert_eq!(lexical.len(), 2);
	assert_eq!(hits.len(), 1);
	assert_eq!(index.passage(hits[0].0).map(|p| p.id.as_str()), Some("beta"));
}
