use serde::{Deserialize, Serialize};

use scout_domain::SearchRequest;

use crate::{Error, Result, ScoutService, SearchResult, ranking};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
	pub results: Vec<SearchResult>,
	/// Total matches the engine reported, which can exceed `results.len()`.
	pub total: u64,
}

impl ScoutService {
	/// Embeds the query when the strategy needs a vector and none was supplied, then builds,
	/// executes, and ranks the engine query.
	pub async fn search(&self, mut request: SearchRequest) -> Result<SearchOutcome> {
		request.limit = self.clamp_limit(request.limit)?;

		if request.strategy.wants_vector()
			&& request.query_vector.is_none()
			&& let Some(text) = request.query_text()
		{
			let vector = self.embed_text(text).await;

			request.query_vector = Some(vector);
		}

		let query = scout_engine::build(&request, self.layout())?;
		let hits = self.backend.query(&query).await?;
		let total = hits.total;
		let results = ranking::rank(hits, &request, &self.cfg.ranking);
		let total = total.unwrap_or(results.len() as u64);

		tracing::info!(
			strategy = %request.strategy,
			limit = request.limit,
			results = results.len(),
			total,
			"Search completed."
		);

		Ok(SearchOutcome { results, total })
	}

	fn clamp_limit(&self, limit: u32) -> Result<u32> {
		if limit == 0 {
			return Err(Error::InvalidRequest {
				message: "limit must be greater than zero.".to_string(),
			});
		}

		let max = self.cfg.search.max_limit;

		if limit > max {
			tracing::debug!(requested = limit, max, "Clamping search limit.");
		}

		Ok(limit.min(max))
	}
}
