use std::sync::Arc;

use scout_service::{LazyEngine, ScoutService};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ScoutService>,
}
impl AppState {
	/// Builds the service over the real engine. Engine settings are resolved eagerly so
	/// misconfiguration shows up in the startup log; a failure here is retried on first use.
	pub async fn new(config: scout_config::Config) -> Self {
		let engine = Arc::new(LazyEngine::new(&config.engine));

		if let Err(err) = engine.connect().await {
			tracing::warn!(error = %err, "Search engine is not reachable yet.");
		}

		Self { service: Arc::new(ScoutService::new(config, engine)) }
	}

	pub fn from_service(service: Arc<ScoutService>) -> Self {
		Self { service }
	}
}
