use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Embeds `texts` with an OpenAI-style endpoint, one vector per text in input order.
///
/// Vectors must have `cfg.dimensions` entries so they stay comparable with the passage index.
pub async fn embed(
	cfg: &sift_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_vectors(json, texts.len(), cfg.dimensions as usize)
}

fn parse_vectors(json: Value, expected: usize, dimensions: usize) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(Value::as_array).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response has no data array.".to_string() }
	})?;

	if data.len() != expected {
		return Err(Error::InvalidResponse {
			message: format!("Expected {expected} embeddings, got {}.", data.len()),
		});
	}

	let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];

	for (position, item) in data.iter().enumerate() {
		let slot = item.get("index").and_then(Value::as_u64).map_or(position, |index| index as usize);
		let values = item.get("embedding").and_then(Value::as_array).ok_or_else(|| {
			Error::InvalidResponse { message: format!("Embedding {slot} has no vector.") }
		})?;

		if values.len() != dimensions {
			return Err(Error::InvalidResponse {
				message: format!(
					"Embedding {slot} has {} dimensions, expected {dimensions}.",
					values.len()
				),
			});
		}

		let vector = values
			.iter()
			.map(|value| value.as_f64().map(|number| number as f32))
			.collect::<Option<Vec<f32>>>()
			.ok_or_else(|| Error::InvalidResponse {
				message: format!("Embedding {slot} has a non-numeric value."),
			})?;

		let Some(entry) = slots.get_mut(slot).filter(|entry| entry.is_none()) else {
			return Err(Error::InvalidResponse {
				message: format!("Embedding index {slot} is out of range or repeated."),
			});
		};

		*entry = Some(vector);
	}

	slots.into_iter().collect::<Option<Vec<_>>>().ok_or_else(|| Error::InvalidResponse {
		message: "Embedding response left an input without a vector.".to_string(),
	})
}
