pub mod action;
pub mod bulk;
pub mod embedding;
pub mod index;
pub mod ranking;
pub mod search;

mod error;

pub use action::{ActionRequest, ActionResponse, SearchParams};
pub use bulk::{BulkIndexReport, ProfileRecord};
pub use error::{Error, Result};
pub use ranking::{ScoreBreakdown, SearchResult};
pub use search::SearchOutcome;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::{Map, Value};
use tokio::sync::OnceCell;

use scout_config::{Config, EmbeddingProviderConfig};
use scout_engine::{EngineClient, EngineQuery, EngineSettingsCell, QueryLayout, RawHits};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, scout_providers::Result<Vec<f32>>>;
}

/// Document and query operations the orchestrator needs from the search engine.
pub trait SearchBackend
where
	Self: Send + Sync,
{
	fn query<'a>(&'a self, query: &'a EngineQuery) -> BoxFuture<'a, scout_engine::Result<RawHits>>;

	fn put<'a>(
		&'a self,
		user_id: &'a str,
		fields: Map<String, Value>,
	) -> BoxFuture<'a, scout_engine::Result<()>>;

	fn update<'a>(
		&'a self,
		user_id: &'a str,
		fields: Map<String, Value>,
	) -> BoxFuture<'a, scout_engine::Result<()>>;

	fn get<'a>(
		&'a self,
		user_id: &'a str,
	) -> BoxFuture<'a, scout_engine::Result<Option<Map<String, Value>>>>;

	fn delete<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, scout_engine::Result<()>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}

/// Engine backend that resolves endpoint and credentials on first use and keeps the client for
/// the lifetime of the process.
pub struct LazyEngine {
	cfg: scout_config::Engine,
	settings: EngineSettingsCell,
	client: OnceCell<EngineClient>,
}

pub struct ScoutService {
	pub cfg: Config,
	pub backend: Arc<dyn SearchBackend>,
	pub providers: Providers,
	layout: QueryLayout,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, scout_providers::Result<Vec<f32>>> {
		Box::pin(scout_providers::embedding::embed(cfg, text))
	}
}

impl SearchBackend for EngineClient {
	fn query<'a>(&'a self, query: &'a EngineQuery) -> BoxFuture<'a, scout_engine::Result<RawHits>> {
		Box::pin(EngineClient::query(self, query))
	}

	fn put<'a>(
		&'a self,
		user_id: &'a str,
		fields: Map<String, Value>,
	) -> BoxFuture<'a, scout_engine::Result<()>> {
		Box::pin(EngineClient::put(self, user_id, fields))
	}

	fn update<'a>(
		&'a self,
		user_id: &'a str,
		fields: Map<String, Value>,
	) -> BoxFuture<'a, scout_engine::Result<()>> {
		Box::pin(EngineClient::update(self, user_id, fields))
	}

	fn get<'a>(
		&'a self,
		user_id: &'a str,
	) -> BoxFuture<'a, scout_engine::Result<Option<Map<String, Value>>>> {
		Box::pin(EngineClient::get(self, user_id))
	}

	fn delete<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, scout_engine::Result<()>> {
		Box::pin(EngineClient::delete(self, user_id))
	}
}

impl SearchBackend for LazyEngine {
	fn query<'a>(&'a self, query: &'a EngineQuery) -> BoxFuture<'a, scout_engine::Result<RawHits>> {
		Box::pin(async move { self.client().await?.query(query).await })
	}

	fn put<'a>(
		&'a self,
		user_id: &'a str,
		fields: Map<String, Value>,
	) -> BoxFuture<'a, scout_engine::Result<()>> {
		Box::pin(async move { self.client().await?.put(user_id, fields).await })
	}

	fn update<'a>(
		&'a self,
		user_id: &'a str,
		fields: Map<String, Value>,
	) -> BoxFuture<'a, scout_engine::Result<()>> {
		Box::pin(async move { self.client().await?.update(user_id, fields).await })
	}

	fn get<'a>(
		&'a self,
		user_id: &'a str,
	) -> BoxFuture<'a, scout_engine::Result<Option<Map<String, Value>>>> {
		Box::pin(async move { self.client().await?.get(user_id).await })
	}

	fn delete<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, scout_engine::Result<()>> {
		Box::pin(async move { self.client().await?.delete(user_id).await })
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}

impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

impl LazyEngine {
	pub fn new(cfg: &scout_config::Engine) -> Self {
		let store = scout_engine::parameter_store(&cfg.parameters);

		Self {
			cfg: cfg.clone(),
			settings: EngineSettingsCell::new(store, cfg.stack_id.clone()),
			client: OnceCell::new(),
		}
	}

	/// Resolves settings and builds the client now instead of on the first request.
	pub async fn connect(&self) -> scout_engine::Result<()> {
		self.client().await.map(|_| ())
	}

	async fn client(&self) -> scout_engine::Result<&EngineClient> {
		self.client
			.get_or_try_init(|| async {
				let settings = self.settings.get().await?;

				EngineClient::new(&settings, &self.cfg)
			})
			.await
	}
}

impl ScoutService {
	pub fn new(cfg: Config, backend: Arc<dyn SearchBackend>) -> Self {
		Self::with_providers(cfg, backend, Providers::default())
	}

	pub fn with_providers(
		cfg: Config,
		backend: Arc<dyn SearchBackend>,
		providers: Providers,
	) -> Self {
		let layout = QueryLayout::from_config(&cfg.engine);

		Self { cfg, backend, providers, layout }
	}

	pub fn layout(&self) -> &QueryLayout {
		&self.layout
	}
}

pub(crate) fn validate_user_id(user_id: &str) -> Result<&str> {
	let trimmed = user_id.trim();

	if trimmed.is_empty() {
		return Err(Error::InvalidRequest { message: "userId must be non-empty.".to_string() });
	}

	Ok(trimmed)
}

pub(crate) fn now_millis() -> i64 {
	(time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
