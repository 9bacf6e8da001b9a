use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde_json::Value;

use crate::state::AppState;
use scout_service::{ActionResponse, Error};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search/action", post(action))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn action(
	State(state): State<AppState>,
	payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
	let Json(raw) = payload
		.map_err(|err| ApiError::from(Error::InvalidRequest { message: err.body_text() }))?;
	let response = state.service.dispatch(raw).await?;

	Ok(Json(response))
}

/// A failed action: the usual `{success: false, error}` envelope with a matching status.
#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	body: ActionResponse,
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let status = match &err {
			Error::InvalidRequest { .. } | Error::UnknownAction { .. } => StatusCode::BAD_REQUEST,
			Error::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
			Error::Engine { .. } => StatusCode::BAD_GATEWAY,
		};

		Self { status, body: ActionResponse::failure(&err) }
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status, Json(self.body)).into_response()
	}
}
