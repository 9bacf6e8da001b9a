//! The multiplexed caller-facing entry point.
//!
//! Requests arrive as one JSON object whose `action` field selects the operation. Parsing checks
//! the action name first so an unknown action and a missing field produce different errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use scout_domain::{ProfileSource, RankingStrategy, SearchFilters, SearchRequest};

use crate::{Error, Result, ScoutService, SearchOutcome, SearchResult};

pub const ACTIONS: [&str; 7] = [
	"search_users",
	"semantic_search",
	"hybrid_search",
	"index_user",
	"get_user",
	"update_user",
	"delete_user",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ActionRequest {
	/// Ranked with `rankingProfile`, `default` when absent.
	SearchUsers(SearchParams),
	SemanticSearch(SearchParams),
	HybridSearch(SearchParams),
	IndexUser { user_id: String, user_profile: ProfileSource },
	GetUser { user_id: String },
	UpdateUser { user_id: String, user_profile: ProfileSource },
	DeleteUser { user_id: String },
}
impl ActionRequest {
	pub fn parse(raw: Value) -> Result<Self> {
		let action = match raw.get("action") {
			Some(Value::String(action)) => action.clone(),
			Some(_) => {
				return Err(Error::InvalidRequest { message: "action must be a string.".to_string() });
			},
			None => {
				return Err(Error::InvalidRequest { message: "missing field `action`.".to_string() });
			},
		};

		if !ACTIONS.contains(&action.as_str()) {
			return Err(Error::UnknownAction { action });
		}

		serde_json::from_value(raw)
			.map_err(|err| Error::InvalidRequest { message: format!("{action}: {err}") })
	}

	pub fn name(&self) -> &'static str {
		match self {
			Self::SearchUsers(_) => "search_users",
			Self::SemanticSearch(_) => "semantic_search",
			Self::HybridSearch(_) => "hybrid_search",
			Self::IndexUser { .. } => "index_user",
			Self::GetUser { .. } => "get_user",
			Self::UpdateUser { .. } => "update_user",
			Self::DeleteUser { .. } => "delete_user",
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
	#[serde(default)]
	pub query: Option<String>,
	#[serde(default)]
	pub query_vector: Option<Vec<f32>>,
	#[serde(default)]
	pub limit: Option<u32>,
	#[serde(default)]
	pub filters: Option<SearchFilters>,
	#[serde(default)]
	pub ranking_profile: Option<String>,
	#[serde(default)]
	pub include_score_breakdown: bool,
}
impl SearchParams {
	pub fn into_request(self, strategy: RankingStrategy, default_limit: u32) -> SearchRequest {
		SearchRequest {
			query: self.query,
			query_vector: self.query_vector,
			limit: self.limit.unwrap_or(default_limit),
			strategy,
			filters: self.filters.unwrap_or_default(),
			include_score_breakdown: self.include_score_breakdown,
		}
	}

	fn ranking_profile(&self) -> Result<Option<RankingStrategy>> {
		self.ranking_profile
			.as_deref()
			.map(str::parse::<RankingStrategy>)
			.transpose()
			.map_err(|err| Error::InvalidRequest { message: err.to_string() })
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
	pub success: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub results: Option<Vec<SearchResult>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}
impl ActionResponse {
	pub fn ok() -> Self {
		Self { success: true, ..Default::default() }
	}

	pub fn found(outcome: SearchOutcome) -> Self {
		Self { success: true, results: Some(outcome.results), total: Some(outcome.total), error: None }
	}

	pub fn failure(err: &Error) -> Self {
		Self { success: false, error: Some(err.to_string()), ..Default::default() }
	}
}

impl ScoutService {
	/// Parses and runs one action. Errors are typed; see [`ScoutService::handle`] for the
	/// envelope form.
	pub async fn dispatch(&self, raw: Value) -> Result<ActionResponse> {
		let request = ActionRequest::parse(raw)?;
		let action = request.name();

		tracing::debug!(action, "Dispatching action.");

		self.execute(request).await.inspect_err(|err| {
			tracing::warn!(action, error = %err, "Action failed.");
		})
	}

	/// Runs one action and folds any failure into `{success: false, error}`.
	pub async fn handle(&self, raw: Value) -> ActionResponse {
		match self.dispatch(raw).await {
			Ok(response) => response,
			Err(err) => ActionResponse::failure(&err),
		}
	}

	pub async fn execute(&self, request: ActionRequest) -> Result<ActionResponse> {
		let default_limit = self.cfg.search.default_limit;

		match request {
			ActionRequest::SearchUsers(params) => {
				let strategy = params.ranking_profile()?.unwrap_or_default();
				let outcome = self.search(params.into_request(strategy, default_limit)).await?;

				Ok(ActionResponse::found(outcome))
			},
			ActionRequest::SemanticSearch(params) => {
				let outcome = self
					.search(params.into_request(RankingStrategy::Semantic, default_limit))
					.await?;

				Ok(ActionResponse::found(outcome))
			},
			ActionRequest::HybridSearch(params) => {
				let outcome =
					self.search(params.into_request(RankingStrategy::Hybrid, default_limit)).await?;

				Ok(ActionResponse::found(outcome))
			},
			ActionRequest::IndexUser { user_id, user_profile } => {
				self.index_user(&user_id, &user_profile).await?;

				Ok(ActionResponse::ok())
			},
			ActionRequest::GetUser { user_id } => {
				let results = self.get_user(&user_id).await?.into_iter().collect::<Vec<_>>();
				let total = results.len() as u64;

				Ok(ActionResponse::found(SearchOutcome { results, total }))
			},
			ActionRequest::UpdateUser { user_id, user_profile } => {
				self.update_user(&user_id, &user_profile).await?;

				Ok(ActionResponse::ok())
			},
			ActionRequest::DeleteUser { user_id } => {
				self.delete_user(&user_id).await?;

				Ok(ActionResponse::ok())
			},
		}
	}
}
