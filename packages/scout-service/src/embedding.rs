use scout_config::EmbeddingProviderConfig;
use scout_providers::embedding::prepare_input;

use crate::{EmbeddingProvider, ScoutService};

impl ScoutService {
	/// Embeds `text` for indexing or querying. Never fails: any provider error yields a zero vector
	/// of the engine's dimension.
	pub async fn embed_text(&self, text: &str) -> Vec<f32> {
		generate(
			self.providers.embedding.as_ref(),
			&self.cfg.providers.embedding,
			self.layout().vector_dim,
			text,
		)
		.await
	}
}

pub async fn generate(
	provider: &dyn EmbeddingProvider,
	cfg: &EmbeddingProviderConfig,
	dim: usize,
	text: &str,
) -> Vec<f32> {
	let input = prepare_input(text, cfg.max_input_chars);

	match provider.embed(cfg, &input).await {
		Ok(vector) if vector.len() == dim => vector,
		Ok(vector) => {
			tracing::warn!(
				provider_id = %cfg.provider_id,
				expected = dim,
				actual = vector.len(),
				"Embedding has the wrong dimension. Using a zero vector."
			);

			zero_vector(dim)
		},
		Err(err) => {
			tracing::warn!(
				provider_id = %cfg.provider_id,
				error = %err,
				"Embedding provider failed. Using a zero vector."
			);

			zero_vector(dim)
		},
	}
}

pub fn zero_vector(dim: usize) -> Vec<f32> {
	vec![0.0; dim]
}
