use std::{
	collections::HashMap,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use httpmock::prelude::*;
use serde_json::{Map, Value, json};

use scout_domain::{RankingStrategy, SearchFilters, SearchRequest};
use scout_engine::{
	BoxFuture, EngineAuth, EngineClient, EngineSettings, EngineSettingsCell, Error,
	ParameterStore, QueryLayout, StaticParameterStore, build, resolve_settings,
};

fn engine_config() -> scout_config::Engine {
	scout_config::Engine {
		stack_id: "dev".to_string(),
		namespace: "user_profile".to_string(),
		document_type: "user_profile".to_string(),
		vector_field: "profileVector".to_string(),
		vector_param: "query_embedding".to_string(),
		vector_dim: 4,
		query_timeout_ms: 5_000,
		request_timeout_ms: 10_000,
		parameters: Default::default(),
	}
}

fn bearer_client(endpoint: String) -> EngineClient {
	let settings =
		EngineSettings { endpoint, auth: EngineAuth::Bearer { token: "engine-token".to_string() } };

	EngineClient::new(&settings, &engine_config()).expect("client")
}

fn fields(user_id: &str) -> Map<String, Value> {
	json!({ "userId": user_id, "industry": "Technology" })
		.as_object()
		.cloned()
		.expect("object")
}

#[tokio::test]
async fn query_sends_engine_parameters_with_bearer_auth() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/search/")
				.header("authorization", "Bearer engine-token")
				.query_param("hits", "3")
				.query_param("ranking", "default")
				.query_param("format", "json")
				.query_param("timeout", "5s")
				.query_param_exists("yql");
			then.status(200).json_body(json!({
				"root": {
					"fields": { "totalCount": 1 },
					"children": [{ "relevance": 0.7, "fields": { "userId": "u1" } }]
				}
			}));
		})
		.await;
	let client = bearer_client(server.base_url());
	let request = SearchRequest { limit: 3, ..SearchRequest::new("rust", RankingStrategy::Default) };
	let query = build(&request, &QueryLayout::from_config(&engine_config())).expect("build");
	let hits = client.query(&query).await.expect("query");

	mock.assert_async().await;

	assert_eq!(hits.total, Some(1));
	assert_eq!(hits.hits[0].relevance, 0.7);
}

#[tokio::test]
async fn semantic_query_binds_vector_input() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/search/")
				.query_param("ranking", "semantic")
				.query_param("input.query(query_embedding)", "[0.5,0.5,0.5,0.5]");
			then.status(200).json_body(json!({ "root": { "fields": { "totalCount": 0 } } }));
		})
		.await;
	let client = bearer_client(server.base_url());
	let request = SearchRequest {
		query_vector: Some(vec![0.5; 4]),
		strategy: RankingStrategy::Semantic,
		filters: SearchFilters { industry: Some("Technology".to_string()), ..Default::default() },
		..Default::default()
	};
	let query = build(&request, &QueryLayout::from_config(&engine_config())).expect("build");
	let hits = client.query(&query).await.expect("query");

	mock.assert_async().await;

	assert!(hits.hits.is_empty());
}

#[tokio::test]
async fn query_failure_reports_status_and_reason() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/search/");
			then.status(503).body("overloaded");
		})
		.await;

	let client = bearer_client(server.base_url());
	let query = build(&SearchRequest::default(), &QueryLayout::from_config(&engine_config()))
		.expect("build");
	let err = client.query(&query).await.expect_err("Expected failure.");

	match err {
		Error::Status { status, reason, body } => {
			assert_eq!(status, 503);
			assert_eq!(reason, "Service Unavailable");
			assert_eq!(body, "overloaded");
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn put_posts_document_with_put_id() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/document/v1/user_profile/user_profile/docid/u1").json_body(
				json!({
					"put": "id:user_profile:user_profile::u1",
					"fields": { "userId": "u1", "industry": "Technology" }
				}),
			);
			then.status(200).json_body(json!({ "id": "id:user_profile:user_profile::u1" }));
		})
		.await;
	let client = bearer_client(server.base_url());

	client.put("u1", fields("u1")).await.expect("put");

	mock.assert_async().await;
}

#[tokio::test]
async fn update_assigns_each_field() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(PUT).path("/document/v1/user_profile/user_profile/docid/u1").json_body(
				json!({
					"update": "id:user_profile:user_profile::u1",
					"fields": {
						"userId": { "assign": "u1" },
						"industry": { "assign": "Technology" }
					}
				}),
			);
			then.status(200).json_body(json!({}));
		})
		.await;
	let client = bearer_client(server.base_url());

	client.update("u1", fields("u1")).await.expect("update");

	mock.assert_async().await;
}

#[tokio::test]
async fn put_failure_is_a_hard_error() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/document/v1/user_profile/user_profile/docid/u1");
			then.status(400).body("bad field");
		})
		.await;

	let client = bearer_client(server.base_url());
	let err = client.put("u1", fields("u1")).await.expect_err("Expected failure.");

	assert!(matches!(err, Error::Status { status: 400, .. }), "Unexpected error: {err:?}");
}

#[tokio::test]
async fn get_maps_not_found_to_none() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/document/v1/user_profile/user_profile/docid/missing");
			then.status(404).json_body(json!({ "message": "not found" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/document/v1/user_profile/user_profile/docid/u1");
			then.status(200).json_body(json!({ "fields": { "userId": "u1" } }));
		})
		.await;

	let client = bearer_client(server.base_url());

	assert_eq!(client.get("missing").await.expect("get"), None);
	assert_eq!(
		client.get("u1").await.expect("get").and_then(|fields| fields.get("userId").cloned()),
		Some(json!("u1"))
	);
}

#[tokio::test]
async fn delete_is_idempotent() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/document/v1/user_profile/user_profile/docid/u1");
			then.status(404);
		})
		.await;
	let client = bearer_client(server.base_url());

	client.delete("u1").await.expect("first delete");
	client.delete("u1").await.expect("second delete");

	mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn user_ids_are_path_encoded() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/document/v1/user_profile/user_profile/docid/a%2Fb");
			then.status(200);
		})
		.await;
	let client = bearer_client(server.base_url());

	client.delete("a/b").await.expect("delete");

	mock.assert_async().await;
}

#[tokio::test]
async fn missing_auth_fails_before_any_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.any_request();
			then.status(200);
		})
		.await;
	let settings = EngineSettings { endpoint: server.base_url(), auth: EngineAuth::None };
	let client = EngineClient::new(&settings, &engine_config()).expect("client");
	let err = client.delete("u1").await.expect_err("Expected auth failure.");

	assert!(matches!(err, Error::NoAuthConfigured));
	assert!(err.is_configuration());

	mock.assert_hits_async(0).await;
}

struct CountingStore {
	inner: StaticParameterStore,
	calls: Arc<AtomicUsize>,
	failing: Option<String>,
}
impl ParameterStore for CountingStore {
	fn get<'a>(&'a self, name: &'a str) -> BoxFuture<'a, scout_engine::Result<Option<String>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			tokio::time::sleep(Duration::from_millis(10)).await;

			if self.failing.as_deref() == Some(name) {
				return Err(Error::Parameter {
					name: name.to_string(),
					message: "access denied".to_string(),
				});
			}

			self.inner.get(name).await
		})
	}
}

fn counting_store(values: &[(&str, &str)], failing: Option<&str>) -> CountingStore {
	let values = values
		.iter()
		.map(|(key, value)| (key.to_string(), value.to_string()))
		.collect::<HashMap<_, _>>();

	CountingStore {
		inner: StaticParameterStore::new(values),
		calls: Arc::new(AtomicUsize::new(0)),
		failing: failing.map(str::to_string),
	}
}

#[tokio::test]
async fn one_failing_parameter_does_not_block_the_others() {
	let store = counting_store(
		&[
			("/dev/search/endpoint", "https://search.example.test/"),
			("/dev/search/token", "t"),
			("/dev/search/cert", "cert"),
		],
		Some("/dev/search/key"),
	);
	let settings = resolve_settings(&store, "dev").await.expect("resolve");

	assert_eq!(settings.endpoint, "https://search.example.test");
	assert_eq!(settings.auth, EngineAuth::Bearer { token: "t".to_string() });
	assert_eq!(store.calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn missing_endpoint_is_fatal() {
	let store = counting_store(&[("/dev/search/token", "t")], None);
	let err = resolve_settings(&store, "dev").await.expect_err("Expected failure.");

	assert!(matches!(err, Error::MissingParameter { ref name } if name == "/dev/search/endpoint"));
}

#[tokio::test]
async fn failing_endpoint_lookup_is_fatal() {
	let store = counting_store(&[("/dev/search/token", "t")], Some("/dev/search/endpoint"));
	let err = resolve_settings(&store, "dev").await.expect_err("Expected failure.");

	assert!(matches!(err, Error::MissingParameter { .. }));
}

#[tokio::test]
async fn settings_cell_resolves_once_for_concurrent_callers() {
	let store = counting_store(
		&[("/dev/search/endpoint", "https://search.example.test"), ("/dev/search/token", "t")],
		None,
	);
	let calls = store.calls.clone();
	let cell = Arc::new(EngineSettingsCell::new(Arc::new(store), "dev"));
	let mut handles = Vec::new();

	for _ in 0..8 {
		let cell = cell.clone();

		handles.push(tokio::spawn(async move { cell.get().await.map(|s| s.endpoint.clone()) }));
	}
	for handle in handles {
		assert_eq!(handle.await.expect("join").expect("settings"), "https://search.example.test");
	}

	cell.get().await.expect("settings");

	assert_eq!(calls.load(Ordering::SeqCst), 4);
}
