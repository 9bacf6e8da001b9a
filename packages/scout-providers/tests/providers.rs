use httpmock::prelude::*;
use reqwest::header::AUTHORIZATION;
use serde_json::{Map, json};

use scout_config::EmbeddingProviderConfig;
use scout_providers::{Error, embedding};

fn provider_config(api_base: String, dimensions: u32) -> EmbeddingProviderConfig {
	EmbeddingProviderConfig {
		provider_id: "test".to_string(),
		api_base,
		api_key: "secret".to_string(),
		path: "/v1/embeddings".to_string(),
		model: "text-embedding-test".to_string(),
		dimensions,
		timeout_ms: 2_000,
		max_input_chars: 8_000,
		normalize: true,
		default_headers: Map::new(),
	}
}

#[test]
fn builds_bearer_auth_header() {
	let headers =
		scout_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn rejects_non_string_default_headers() {
	let mut headers = Map::new();

	headers.insert("x-tenant".to_string(), json!(42));

	let err = scout_providers::auth_headers("secret", &headers).expect_err("Expected error.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[tokio::test]
async fn sends_model_dimensions_and_normalize_flag() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/v1/embeddings")
				.header("authorization", "Bearer secret")
				.json_body_partial(
					r#"{"model":"text-embedding-test","input":"hello","dimensions":3,"normalize":true}"#,
				);
			then.status(200).json_body(json!({ "vector": [0.0, 0.6, 0.8] }));
		})
		.await;
	let cfg = provider_config(server.base_url(), 3);
	let vector = embedding::embed(&cfg, "hello").await.expect("Embedding should succeed.");

	mock.assert_async().await;

	assert_eq!(vector, vec![0.0, 0.6, 0.8]);
}

#[tokio::test]
async fn dimension_mismatch_is_an_invalid_response() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/embeddings");
			then.status(200).json_body(json!({ "vector": [1.0, 0.0] }));
		})
		.await;

	let cfg = provider_config(server.base_url(), 3);
	let err = embedding::embed(&cfg, "hello").await.expect_err("Expected mismatch.");

	assert!(matches!(err, Error::InvalidResponse { .. }), "Unexpected error: {err:?}");
}

#[tokio::test]
async fn provider_errors_surface_as_reqwest_errors() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/embeddings");
			then.status(503).body("overloaded");
		})
		.await;

	let cfg = provider_config(server.base_url(), 3);
	let err = embedding::embed(&cfg, "hello").await.expect_err("Expected status error.");

	assert!(matches!(err, Error::Reqwest(_)), "Unexpected error: {err:?}");
}
