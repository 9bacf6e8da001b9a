use serde::{Deserialize, Serialize};

use crate::{RankingStrategy, SearchFilters};

pub const DEFAULT_LIMIT: u32 = 10;

/// One search, scoped to a single call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
	#[serde(default)]
	pub query: Option<String>,
	#[serde(default)]
	pub query_vector: Option<Vec<f32>>,
	#[serde(default = "default_limit")]
	pub limit: u32,
	#[serde(default)]
	pub strategy: RankingStrategy,
	#[serde(default)]
	pub filters: SearchFilters,
	/// Ask for separate semantic and keyword scores next to the final score.
	#[serde(default)]
	pub include_score_breakdown: bool,
}
impl SearchRequest {
	pub fn new(query: impl Into<String>, strategy: RankingStrategy) -> Self {
		Self { query: Some(query.into()), strategy, ..Default::default() }
	}

	/// Trimmed query text, or `None` when blank.
	pub fn query_text(&self) -> Option<&str> {
		self.query.as_deref().map(str::trim).filter(|query| !query.is_empty())
	}
}
impl Default for SearchRequest {
	fn default() -> Self {
		Self {
			query: None,
			query_vector: None,
			limit: DEFAULT_LIMIT,
			strategy: RankingStrategy::Default,
			filters: SearchFilters::default(),
			include_score_breakdown: false,
		}
	}
}

fn default_limit() -> u32 {
	DEFAULT_LIMIT
}
