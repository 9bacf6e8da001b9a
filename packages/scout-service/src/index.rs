use serde_json::Value;

use scout_domain::{ProfileSource, ProfileView, fields};

use crate::{Result, ScoutService, SearchResult};

/// Score reported for a profile fetched by id rather than matched by a query.
pub const DIRECT_LOOKUP_SCORE: f64 = 1.0;

impl ScoutService {
	/// Composes, embeds, and stores the full document for `user_id`, replacing any previous one.
	pub async fn index_user(&self, user_id: &str, source: &ProfileSource) -> Result<()> {
		let user_id = crate::validate_user_id(user_id)?;
		let mut profile = scout_domain::compose(user_id, source);
		let now = crate::now_millis();

		profile.profile_vector = Some(self.embed_text(&profile.searchable_content).await);
		profile.created_at = Some(now);
		profile.updated_at = Some(now);

		self.backend.put(user_id, profile.to_fields(&self.layout().vector_field)).await?;

		tracing::info!(user_id, "Profile indexed.");

		Ok(())
	}

	/// Overlays `source` on the stored document, then recomposes and re-embeds the merged
	/// profile. Only the fields present in `source` are assigned, together with the derived
	/// content, vector, and `updatedAt`. A blank string clears its field.
	pub async fn update_user(&self, user_id: &str, source: &ProfileSource) -> Result<()> {
		let user_id = crate::validate_user_id(user_id)?;
		let stored = self
			.backend
			.get(user_id)
			.await?
			.map(|doc| ProfileSource::from_view(&ProfileView::from_fields(&doc)))
			.unwrap_or_default();
		let mut profile = scout_domain::compose(user_id, &stored.overlay(source));

		profile.profile_vector = Some(self.embed_text(&profile.searchable_content).await);
		profile.updated_at = Some(crate::now_millis());

		let vector_field = self.layout().vector_field.as_str();
		let assigned = source.present_fields();
		let mut document = profile.to_fields(vector_field);

		document.retain(|name, _| {
			assigned.iter().any(|field| *field == name.as_str())
				|| [fields::SEARCHABLE_CONTENT, fields::UPDATED_AT, vector_field]
					.contains(&name.as_str())
		});

		for name in assigned {
			document.entry(name).or_insert(Value::Null);
		}

		self.backend.update(user_id, document).await?;

		tracing::info!(user_id, "Profile updated.");

		Ok(())
	}

	/// `Ok(None)` when the engine has no document for `user_id`.
	pub async fn get_user(&self, user_id: &str) -> Result<Option<SearchResult>> {
		let user_id = crate::validate_user_id(user_id)?;
		let Some(stored) = self.backend.get(user_id).await? else {
			tracing::debug!(user_id, "Profile not found.");

			return Ok(None);
		};
		let profile = ProfileView::from_fields(&stored);

		Ok(Some(SearchResult {
			user_id: profile.user_id.clone().unwrap_or_else(|| user_id.to_string()),
			score: DIRECT_LOOKUP_SCORE,
			profile,
			score_breakdown: None,
		}))
	}

	pub async fn delete_user(&self, user_id: &str) -> Result<()> {
		let user_id = crate::validate_user_id(user_id)?;

		self.backend.delete(user_id).await?;

		tracing::info!(user_id, "Profile deleted.");

		Ok(())
	}
}
