use std::sync::Arc;

use sift_config::Config;
use sift_domain::NO_RESULT_TEXT;
use sift_service::{
	AvoidLatch, Error, ItemKind, Providers, QueryPolicy, RetrieveRequest, SiftService,
};
use sift_testkit::{
	DEFAULT_RERANK_MODEL, FailingRerank, FailingWeb, HashedEmbedding, MULTILINGUAL_RERANK_MODEL,
	RecordingRerank, ReversingRerank, ScriptedWeb, passage_index, sample_passages, test_config,
	web_hit,
};

struct Harness {
	service: SiftService,
	web: Arc<ScriptedWeb>,
	rerank: Arc<RecordingRerank>,
}

fn harness() -> Harness {
	harness_with_config(test_config())
}

fn harness_with_config(cfg: Config) -> Harness {
	let web = Arc::new(ScriptedWeb::new(vec![web_hit("https://web.example/guide", 2)]));
	let rerank = Arc::new(RecordingRerank::default());
	let providers =
		Providers::new(Arc::new(HashedEmbedding::default()), rerank.clone(), web.clone());
	let index = passage_index(sample_passages()).expect("Failed to build sample index.");

	Harness { service: SiftService::with_providers(cfg, index, providers), web, rerank }
}

fn request(query: &str) -> RetrieveRequest {
	RetrieveRequest { query: query.to_string(), ..Default::default() }
}

#[tokio::test]
async fn returns_exactly_top_k_items() {
	let harness = harness();
	let res = harness
		.service
		.retrieve(RetrieveRequest { top_k: Some(3), ..request("metrics training") })
		.await
		.expect("Retrieve failed.");

	assert_eq!(res.items.len(), 3);
	assert!(res.items.iter().all(|item| item.kind == ItemKind::Passage));

	let calls = harness.rerank.calls();

	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].top_n, 3);
	assert_eq!(calls[0].query, "metrics training");
}

#[tokio::test]
async fn zero_top_k_falls_back_to_the_default() {
	let harness = harness();

	harness
		.service
		.retrieve(RetrieveRequest { top_k: Some(0), ..request("metrics training") })
		.await
		.expect("Retrieve failed.");

	assert_eq!(harness.rerank.calls()[0].top_n, 10);
}

#[tokio::test]
async fn blank_query_is_rejected() {
	let harness = harness();
	let err = harness.service.retrieve(request("   ")).await.expect_err("Expected rejection.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert_eq!(harness.web.call_count(), 0);
}

#[tokio::test]
async fn top_k_above_the_configured_maximum_is_rejected() {
	let harness = harness();
	let err = harness
		.service
		.retrieve(RetrieveRequest {
			top_k: Some(u32::MAX),
			include_tags: Some(vec!["no-such-tag".to_string()]),
			..request("metrics training")
		})
		.await
		.expect_err("Expected rejection.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert_eq!(harness.web.call_count(), 0);
	assert!(harness.rerank.calls().is_empty());
}

#[tokio::test]
async fn top_k_at_the_configured_maximum_is_served() {
	let mut cfg = test_config();

	cfg.retrieval.max_top_k = 5;

	let harness = harness_with_config(cfg);
	let res = harness
		.service
		.retrieve(RetrieveRequest { top_k: Some(5), ..request("metrics training") })
		.await
		.expect("Retrieve failed.");

	assert_eq!(res.items.len(), 5);

	let err = harness
		.service
		.retrieve(RetrieveRequest { top_k: Some(6), ..request("metrics training") })
		.await
		.expect_err("Expected rejection.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn unmatched_include_tags_pad_with_sentinels() {
	let harness = harness();
	let res = harness
		.service
		.retrieve(RetrieveRequest {
			top_k: Some(4),
			include_tags: Some(vec!["no-such-tag".to_string()]),
			..request("metrics training")
		})
		.await
		.expect("Retrieve failed.");

	assert_eq!(res.items.len(), 4);
	assert!(res.items.iter().all(|item| item.kind == ItemKind::NoResult));

	let calls = harness.rerank.calls();

	assert!(calls[0].docs.iter().all(|doc| doc == NO_RESULT_TEXT));
}

#[tokio::test]
async fn exclusion_requires_every_excluded_tag() {
	let metrics_text = sample_passages()
		.into_iter()
		.find(|passage| passage.id == "log-metrics")
		.map(|passage| passage.text)
		.expect("Missing log-metrics fixture.");
	let exclude = |tags: &[&str]| RetrieveRequest {
		exclude_tags: Some(tags.iter().map(|tag| tag.to_string()).collect()),
		avoid_extra_source: Some(true),
		..request("metrics training")
	};
	let partial = harness();

	partial.service.retrieve(exclude(&["guide", "reports"])).await.expect("Retrieve failed.");

	assert!(partial.rerank.calls()[0].docs.contains(&metrics_text));

	let full = harness();

	full.service.retrieve(exclude(&["logging", "GUIDE "])).await.expect("Retrieve failed.");

	assert!(!full.rerank.calls()[0].docs.contains(&metrics_text));
}

#[tokio::test]
async fn request_flag_skips_web_for_that_call_only() {
	let harness = harness();

	harness
		.service
		.retrieve(RetrieveRequest { avoid_extra_source: Some(true), ..request("metrics") })
		.await
		.expect("Retrieve failed.");

	assert_eq!(harness.web.call_count(), 0);

	harness.service.retrieve(request("metrics")).await.expect("Retrieve failed.");

	assert_eq!(harness.web.call_count(), 1);
}

#[tokio::test]
async fn latch_is_consumed_by_the_next_call() {
	let harness = harness();
	let mut latch = AvoidLatch::default();

	latch.set(true);

	harness
		.service
		.retrieve_latched(request("metrics"), &mut latch)
		.await
		.expect("Retrieve failed.");

	assert_eq!(harness.web.call_count(), 0);
	assert!(!latch.is_set());

	harness
		.service
		.retrieve_latched(request("metrics"), &mut latch)
		.await
		.expect("Retrieve failed.");

	assert_eq!(harness.web.call_count(), 1);

	harness
		.service
		.retrieve_latched(
			RetrieveRequest { avoid_extra_source: Some(true), ..request("metrics") },
			&mut latch,
		)
		.await
		.expect("Retrieve failed.");

	assert_eq!(harness.web.call_count(), 1);
}

#[tokio::test]
async fn web_outage_still_serves_the_request() {
	let rerank = Arc::new(RecordingRerank::default());
	let providers = Providers::new(
		Arc::new(HashedEmbedding::default()),
		rerank.clone(),
		Arc::new(FailingWeb::default()),
	);
	let index = passage_index(sample_passages()).expect("Failed to build sample index.");
	let service = SiftService::with_providers(test_config(), index, providers);
	let res = service
		.retrieve(RetrieveRequest { top_k: Some(2), ..request("metrics training") })
		.await
		.expect("Retrieve failed.");

	assert_eq!(res.items.len(), 2);
	assert_eq!(rerank.calls().len(), 1);
}

#[tokio::test]
async fn rerank_failure_fails_the_request() {
	let providers = Providers::new(
		Arc::new(HashedEmbedding::default()),
		Arc::new(FailingRerank),
		Arc::new(ScriptedWeb::default()),
	);
	let index = passage_index(sample_passages()).expect("Failed to build sample index.");
	let service = SiftService::with_providers(test_config(), index, providers);
	let err = service.retrieve(request("metrics training")).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Provider { .. }));
}

#[tokio::test]
async fn rerank_ordering_is_returned_as_is() {
	let providers = Providers::new(
		Arc::new(HashedEmbedding::default()),
		Arc::new(ReversingRerank),
		Arc::new(ScriptedWeb::default()),
	);
	let index = passage_index(sample_passages()).expect("Failed to build sample index.");
	let service = SiftService::with_providers(test_config(), index, providers);
	let res = service
		.retrieve(RetrieveRequest { top_k: Some(3), ..request("metrics training") })
		.await
		.expect("Retrieve failed.");
	let scores: Vec<f32> = res.items.iter().map(|item| item.score).collect();

	assert_eq!(scores, vec![1.0, 0.5, 1.0 / 3.0]);
}

#[tokio::test]
async fn rerank_model_follows_the_target_language() {
	let harness = harness();

	for language in [None, Some("EN"), Some("fr"), Some("ja")] {
		harness
			.service
			.retrieve(RetrieveRequest {
				language: language.map(str::to_string),
				avoid_extra_source: Some(true),
				..request("metrics")
			})
			.await
			.expect("Retrieve failed.");
	}

	let models: Vec<String> = harness.rerank.calls().into_iter().map(|call| call.model).collect();

	assert_eq!(
		models,
		vec![
			DEFAULT_RERANK_MODEL.to_string(),
			DEFAULT_RERANK_MODEL.to_string(),
			MULTILINGUAL_RERANK_MODEL.to_string(),
			MULTILINGUAL_RERANK_MODEL.to_string(),
		]
	);
}

#[tokio::test]
async fn query_engine_runs_the_standard_pipeline() {
	let harness = harness();
	let policy = QueryPolicy {
		top_k: 2,
		language: "en".to_string(),
		include_tags: Vec::new(),
		exclude_tags: Vec::new(),
	};
	let engine = harness.service.query_engine(&policy);

	assert_eq!(engine.pipeline().stage_names(), vec!["tags", "language", "rerank"]);

	let entries = engine.execute("metrics training", true).await.expect("Execute failed.");

	assert_eq!(entries.len(), 2);
	assert_eq!(harness.web.call_count(), 0);
}

#[tokio::test]
async fn language_filter_keeps_target_and_fallback_languages() {
	let mut cfg = test_config();

	cfg.retrieval.fallback_language = "ja".to_string();

	let harness = harness_with_config(cfg);
	let res = harness
		.service
		.retrieve(RetrieveRequest {
			language: Some("fr".to_string()),
			top_k: Some(2),
			avoid_extra_source: Some(true),
			..request("rapports métriques アーティファクト")
		})
		.await
		.expect("Retrieve failed.");
	let docs = &harness.rerank.calls()[0].docs;

	assert_eq!(res.items.len(), 2);
	assert_eq!(docs.len(), 2);
	assert!(docs.iter().any(|doc| doc.starts_with("Les rapports")));
	assert!(docs.iter().any(|doc| doc.starts_with("アーティファクト")));
}
