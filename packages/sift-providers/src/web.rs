use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

/// One matched web page. Every snippet is a separate passage of the same page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebHit {
	pub url: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub snippets: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
	hits: Vec<WebHit>,
}

pub async fn search(
	cfg: &sift_config::WebSearchProviderConfig,
	query: &str,
	limit: u32,
) -> Result<Vec<WebHit>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let num_web_results = result_limit(cfg, limit);
	let res = client
		.get(url)
		.headers(crate::api_key_headers(&cfg.api_key_header, &cfg.api_key, &cfg.default_headers)?)
		.query(&[
			("query", qualify_query(cfg, query)),
			("num_web_results", num_web_results.to_string()),
		])
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(json)
}

pub fn qualify_query(cfg: &sift_config::WebSearchProviderConfig, query: &str) -> String {
	format!("{}{}", cfg.query_prefix, query)
}

pub fn result_limit(cfg: &sift_config::WebSearchProviderConfig, limit: u32) -> u32 {
	limit.min(cfg.max_results).min(sift_config::WEB_RESULT_CEILING)
}

fn parse_search_response(json: Value) -> Result<Vec<WebHit>> {
	let response: SearchResponse = serde_json::from_value(json)?;

	Ok(response.hits)
}
