use std::{collections::HashMap, env, fmt, sync::Arc};

use tokio::sync::OnceCell;

use crate::{BoxFuture, Error, Result};

/// Secret/parameter store the engine endpoint and credentials are read from.
pub trait ParameterStore
where
	Self: Send + Sync,
{
	/// `Ok(None)` means the parameter does not exist.
	fn get<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<String>>>;
}

/// Reads `/<stack>/search/endpoint` from `<PREFIX>_<STACK>_SEARCH_ENDPOINT`.
#[derive(Debug, Clone)]
pub struct EnvParameterStore {
	prefix: String,
}
impl EnvParameterStore {
	pub fn new(prefix: impl Into<String>) -> Self {
		Self { prefix: prefix.into() }
	}

	pub fn variable_name(&self, name: &str) -> String {
		let suffix = name
			.trim_matches('/')
			.chars()
			.map(|ch| if ch.is_ascii_alphanumeric() { ch.to_ascii_uppercase() } else { '_' })
			.collect::<String>();

		format!("{}_{suffix}", self.prefix.to_ascii_uppercase())
	}
}
impl ParameterStore for EnvParameterStore {
	fn get<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
		let variable = self.variable_name(name);

		Box::pin(async move {
			match env::var(&variable) {
				Ok(value) => Ok(Some(value)),
				Err(env::VarError::NotPresent) => Ok(None),
				Err(err) => Err(Error::Parameter { name: name.to_string(), message: err.to_string() }),
			}
		})
	}
}

#[derive(Debug, Clone, Default)]
pub struct StaticParameterStore {
	values: HashMap<String, String>,
}
impl StaticParameterStore {
	pub fn new(values: HashMap<String, String>) -> Self {
		Self { values }
	}
}
impl ParameterStore for StaticParameterStore {
	fn get<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
		let value = self.values.get(name).cloned();

		Box::pin(async move { Ok(value) })
	}
}

/// Builds the store selected by `[engine.parameters]`.
pub fn parameter_store(cfg: &scout_config::EngineParameters) -> Arc<dyn ParameterStore> {
	match cfg.source.as_str() {
		"static" => Arc::new(StaticParameterStore::new(cfg.values.clone())),
		_ => Arc::new(EnvParameterStore::new(cfg.env_prefix.clone())),
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterNames {
	pub endpoint: String,
	pub token: String,
	pub cert: String,
	pub key: String,
}
impl ParameterNames {
	pub fn for_stack(stack_id: &str) -> Self {
		let base = format!("/{}/search", stack_id.trim_matches('/'));

		Self {
			endpoint: format!("{base}/endpoint"),
			token: format!("{base}/token"),
			cert: format!("{base}/cert"),
			key: format!("{base}/key"),
		}
	}
}

/// How requests to the engine authenticate. At most one scheme is active.
#[derive(Clone, PartialEq, Eq)]
pub enum EngineAuth {
	MutualTls { cert_pem: String, key_pem: String },
	Bearer { token: String },
	None,
}
impl EngineAuth {
	/// Picks the scheme from whatever credentials resolved. A complete certificate pair wins over
	/// a token.
	pub fn select(token: Option<String>, cert: Option<String>, key: Option<String>) -> Self {
		match (cert, key, token) {
			(Some(cert_pem), Some(key_pem), token) => {
				if token.is_some() {
					tracing::warn!(
						"Both a client certificate and a bearer token are configured; using mutual TLS."
					);
				}

				Self::MutualTls { cert_pem, key_pem }
			},
			(_, _, Some(token)) => Self::Bearer { token },
			_ => Self::None,
		}
	}

	pub fn scheme(&self) -> &'static str {
		match self {
			Self::MutualTls { .. } => "mtls",
			Self::Bearer { .. } => "bearer",
			Self::None => "none",
		}
	}
}
impl fmt::Debug for EngineAuth {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "EngineAuth({})", self.scheme())
	}
}

/// Resolved endpoint and credentials. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
	pub endpoint: String,
	pub auth: EngineAuth,
}

/// Fetches the four engine parameters concurrently. A failed fetch of one parameter is logged and
/// treated as absent so the others still resolve; only a missing endpoint is fatal.
pub async fn resolve_settings(store: &dyn ParameterStore, stack_id: &str) -> Result<EngineSettings> {
	let names = ParameterNames::for_stack(stack_id);
	let (endpoint, token, cert, key) = tokio::join!(
		fetch(store, &names.endpoint),
		fetch(store, &names.token),
		fetch(store, &names.cert),
		fetch(store, &names.key)
	);
	let endpoint = endpoint
		.filter(|value| !is_placeholder(value))
		.ok_or_else(|| Error::MissingParameter { name: names.endpoint.clone() })?;
	let auth = EngineAuth::select(token, cert, key);

	tracing::info!(stack_id, scheme = auth.scheme(), "Search engine settings resolved.");

	Ok(EngineSettings { endpoint: endpoint.trim_end_matches('/').to_string(), auth })
}

/// Lazily resolved, process-wide engine settings. The first caller resolves; concurrent callers
/// wait for that resolution; later callers reuse it. A failed resolution is not cached.
pub struct EngineSettingsCell {
	store: Arc<dyn ParameterStore>,
	stack_id: String,
	cell: OnceCell<Arc<EngineSettings>>,
}
impl EngineSettingsCell {
	pub fn new(store: Arc<dyn ParameterStore>, stack_id: impl Into<String>) -> Self {
		Self { store, stack_id: stack_id.into(), cell: OnceCell::new() }
	}

	pub async fn get(&self) -> Result<Arc<EngineSettings>> {
		let settings = self
			.cell
			.get_or_try_init(|| async {
				resolve_settings(self.store.as_ref(), &self.stack_id).await.map(Arc::new)
			})
			.await?;

		Ok(settings.clone())
	}
}

async fn fetch(store: &dyn ParameterStore, name: &str) -> Option<String> {
	match store.get(name).await {
		Ok(value) => value.map(|value| value.trim().to_string()).filter(|value| !value.is_empty()),
		Err(err) => {
			tracing::warn!(parameter = name, error = %err, "Engine parameter lookup failed.");

			None
		},
	}
}

fn is_placeholder(value: &str) -> bool {
	let lowered = value.to_ascii_lowercase();

	lowered.contains("placeholder") || lowered.contains("changeme") || value.contains('<')
}
