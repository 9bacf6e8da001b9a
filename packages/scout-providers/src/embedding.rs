use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

use crate::{Error, Result};

/// Calls the embedding endpoint for a single text. The text is sent as given; use
/// [`prepare_input`] first. The returned vector is checked against `cfg.dimensions`.
pub async fn embed(cfg: &scout_config::EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": text,
		"dimensions": cfg.dimensions,
		"normalize": cfg.normalize,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vector = parse_embedding_response(&json)?;

	if vector.len() != cfg.dimensions as usize {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding dimension mismatch: expected {}, got {}.",
				cfg.dimensions,
				vector.len()
			),
		});
	}

	tracing::debug!(model = %cfg.model, chars = text.chars().count(), "Embedding generated.");

	Ok(vector)
}

/// NFKC-normalizes, collapses whitespace, and cuts the text to at most `max_chars` characters.
/// The cut is a plain prefix and never fails.
pub fn prepare_input(text: &str, max_chars: usize) -> String {
	let normalized: String = text.nfkc().collect();

	normalized.split_whitespace().collect::<Vec<_>>().join(" ").chars().take(max_chars).collect()
}

fn parse_embedding_response(json: &Value) -> Result<Vec<f32>> {
	let values = json
		.get("vector")
		.or_else(|| json.get("embedding"))
		.or_else(|| {
			json.get("data")
				.and_then(Value::as_array)
				.and_then(|data| data.first())
				.and_then(|item| item.get("embedding"))
		})
		.and_then(Value::as_array)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Embedding response is missing a vector array.".to_string(),
		})?;
	let mut vec = Vec::with_capacity(values.len());

	for value in values {
		let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
			message: "Embedding value must be numeric.".to_string(),
		})?;

		vec.push(number as f32);
	}

	Ok(vec)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_vector_shape() {
		let json = serde_json::json!({ "vector": [0.5, 1.5] });

		assert_eq!(parse_embedding_response(&json).expect("parse failed"), vec![0.5, 1.5]);
	}

	#[test]
	fn parses_openai_shape() {
		let json = serde_json::json!({ "data": [{ "index": 0, "embedding": [2.0, 3.0] }] });

		assert_eq!(parse_embedding_response(&json).expect("parse failed"), vec![2.0, 3.0]);
	}

	#[test]
	fn rejects_non_numeric_values() {
		let json = serde_json::json!({ "vector": [0.5, "x"] });

		assert!(parse_embedding_response(&json).is_err());
	}

	#[test]
	fn rejects_non_array_vector() {
		let json = serde_json::json!({ "vector": { "values": [1.0] } });

		assert!(parse_embedding_response(&json).is_err());
	}

	#[test]
	fn prepare_input_truncates_by_characters() {
		let text = "é".repeat(10);

		assert_eq!(prepare_input(&text, 4).chars().count(), 4);
	}

	#[test]
	fn prepare_input_collapses_whitespace_and_normalizes() {
		assert_eq!(prepare_input("  Ｒｕｓｔ \n\t developer ", 100), "Rust developer");
	}
}
