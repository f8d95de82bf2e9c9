// std
use std::time::Duration as StdDuration;

// crates.io
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// One re-ranked document: its position in the submitted list and its relevance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankHit {
	pub index: usize,
	pub relevance_score: f32,
}

pub async fn rerank(
	cfg: &sift_config::RerankProviderConfig,
	model: &str,
	query: &str,
	docs: &[String],
	top_n: usize,
) -> Result<Vec<RerankHit>> {
	let client = Client::builder().timeout(StdDuration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": model,
		"query": query,
		"documents": docs,
		"top_n": top_n,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_rerank_response(json, docs.len(), top_n)
}

/// Keeps the service's ordering; only truncates to `top_n`.
fn parse_rerank_response(json: Value, doc_count: usize, top_n: usize) -> Result<Vec<RerankHit>> {
	let results = json
		.get("results")
		.or_else(|| json.get("data"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Rerank response is missing results array.".to_string(),
		})?;
	let mut hits = Vec::with_capacity(results.len().min(top_n));

	for item in results.iter().take(top_n) {
		let index = item.get("index").and_then(|v| v.as_u64()).ok_or_else(|| {
			Error::InvalidResponse { message: "Rerank result missing index.".to_string() }
		})? as usize;
		let relevance_score = item
			.get("relevance_score")
			.or_else(|| item.get("score"))
			.and_then(|v| v.as_f64())
			.ok_or_else(|| Error::InvalidResponse {
				message: "Rerank result missing score.".to_string(),
			})? as f32;

		if index >= doc_count {
			return Err(Error::InvalidResponse {
				message: format!("Rerank result index {index} is out of range for {doc_count} documents."),
			});
		}

		hits.push(RerankHit { index, relevance_score });
	}

	Ok(hits)
}
