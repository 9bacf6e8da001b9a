use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use scout_config::Ranking;
use scout_domain::{ProfileView, RankingStrategy, SearchRequest};
use scout_engine::{RawHit, RawHits};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
	pub user_id: String,
	pub score: f64,
	pub profile: ProfileView,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub score_breakdown: Option<ScoreBreakdown>,
}

/// Component scores of a hit. `None` means the engine did not report that component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
	pub semantic: Option<f64>,
	pub keyword: Option<f64>,
}
impl ScoreBreakdown {
	fn is_complete(&self) -> bool {
		self.semantic.is_some() && self.keyword.is_some()
	}
}

/// Maps engine hits to results: dedupes by user, optionally blends hybrid component scores,
/// and caps the list at the request limit.
pub fn rank(hits: RawHits, request: &SearchRequest, cfg: &Ranking) -> Vec<SearchResult> {
	let mut seen = HashSet::new();
	let mut results = Vec::with_capacity(hits.hits.len());

	for hit in hits.hits {
		let profile = ProfileView::from_fields(&hit.fields);
		let Some(user_id) = profile.user_id.clone().or_else(|| user_id_from_document_id(&hit))
		else {
			tracing::warn!(id = ?hit.id, "Dropping engine hit without a user id.");

			continue;
		};

		if !seen.insert(user_id.clone()) {
			continue;
		}

		let score_breakdown = request.include_score_breakdown.then(|| ScoreBreakdown {
			semantic: feature(&hit, &cfg.semantic_feature),
			keyword: feature(&hit, &cfg.keyword_feature),
		});

		results.push(SearchResult { user_id, score: hit.relevance, profile, score_breakdown });
	}

	// Blending mixes score scales, so it applies only when every hit carries both components.
	let blend = request.strategy == RankingStrategy::Hybrid
		&& !results.is_empty()
		&& results.iter().all(|result| {
			result.score_breakdown.as_ref().is_some_and(ScoreBreakdown::is_complete)
		});

	if blend {
		for result in &mut results {
			if let Some(ScoreBreakdown { semantic: Some(semantic), keyword: Some(keyword) }) =
				result.score_breakdown
			{
				result.score = blended_score(semantic, keyword, cfg);
			}
		}

		results.sort_by(|a, b| b.score.total_cmp(&a.score));
	}

	results.truncate(request.limit as usize);

	results
}

pub fn blended_score(semantic: f64, keyword: f64, cfg: &Ranking) -> f64 {
	f64::from(cfg.semantic_weight) * semantic + f64::from(cfg.keyword_weight) * keyword
}

fn feature(hit: &RawHit, name: &str) -> Option<f64> {
	hit.match_features.get(name).and_then(Value::as_f64)
}

fn user_id_from_document_id(hit: &RawHit) -> Option<String> {
	let (_, user_id) = hit.id.as_deref()?.rsplit_once("::")?;

	(!user_id.is_empty()).then(|| user_id.to_string())
}
