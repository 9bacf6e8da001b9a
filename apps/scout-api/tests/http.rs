use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use scout_api::{routes, state::AppState};
use scout_testkit::{FixedEmbedding, InMemoryEngine, test_config};

fn app() -> (Router, Arc<InMemoryEngine>) {
	let backend = Arc::new(InMemoryEngine::new("profileVector"));
	let service = scout_testkit::service(
		test_config(4),
		backend.clone(),
		Arc::new(FixedEmbedding::new(vec![0.5; 4])),
	);

	(routes::router(AppState::from_service(service)), backend)
}

async fn post_action(app: &Router, body: Value) -> (StatusCode, Value) {
	let request = Request::builder()
		.method("POST")
		.uri("/v1/search/action")
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from(body.to_string()))
		.expect("Failed to build request.");
	let response = app.clone().oneshot(request).await.expect("Failed to call route.");
	let status = response.status();
	let bytes = body::to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body.");
	let json = serde_json::from_slice(&bytes).expect("Body is not JSON.");

	(status, json)
}

#[tokio::test]
async fn health_ok() {
	let (app, _) = app();
	let response = app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
		.await
		.expect("Failed to call health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn index_then_search_over_http() {
	let (app, backend) = app();
	let (status, body) = post_action(
		&app,
		json!({
			"action": "index_user",
			"userId": "u1",
			"userProfile": {
				"fullName": "Ada",
				"jobRole": "React Developer",
				"skills": ["React"],
				"isOnboardingComplete": true
			}
		}),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, json!({ "success": true }));
	assert_eq!(backend.len(), 1);

	let (status, body) =
		post_action(&app, json!({ "action": "search_users", "query": "React developer" })).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["success"], json!(true));
	assert_eq!(body["total"], json!(1));
	assert_eq!(body["results"][0]["userId"], json!("u1"));
}

#[tokio::test]
async fn unknown_action_is_a_bad_request() {
	let (app, _) = app();
	let (status, body) = post_action(&app, json!({ "action": "explode" })).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["success"], json!(false));
	assert!(body["error"].as_str().unwrap_or_default().contains("explode"));
}

#[tokio::test]
async fn engine_failure_is_a_bad_gateway() {
	let (app, backend) = app();

	backend.fail_writes_for("u1");

	let (status, body) = post_action(&app, json!({ "action": "delete_user", "userId": "u1" })).await;

	assert_eq!(status, StatusCode::BAD_GATEWAY);
	assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn malformed_json_keeps_the_envelope() {
	let (app, _) = app();
	let request = Request::builder()
		.method("POST")
		.uri("/v1/search/action")
		.header(header::CONTENT_TYPE, "application/json")
		.body(Body::from("{not json"))
		.expect("Failed to build request.");
	let response = app.oneshot(request).await.expect("Failed to call route.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let bytes = body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
	let body: Value = serde_json::from_slice(&bytes).expect("json");

	assert_eq!(body["success"], json!(false));
}
