use std::time::Duration;

use reqwest::{Client, Identity, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::{Map, Value};

use crate::{EngineAuth, EngineQuery, EngineSettings, Error, Result};

const MAX_ERROR_BODY_CHARS: usize = 512;

/// One ranked hit as returned by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHit {
	pub id: Option<String>,
	pub relevance: f64,
	pub fields: Map<String, Value>,
	/// Named ranking features the engine exposed for this hit, if any.
	pub match_features: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawHits {
	pub total: Option<u64>,
	pub hits: Vec<RawHit>,
}

/// HTTP client for the search engine's query and document APIs.
pub struct EngineClient {
	http: Client,
	endpoint: Url,
	auth: EngineAuth,
	namespace: String,
	document_type: String,
}
impl EngineClient {
	pub fn new(settings: &EngineSettings, cfg: &scout_config::Engine) -> Result<Self> {
		let endpoint = Url::parse(&settings.endpoint).map_err(|err| Error::InvalidConfig {
			message: format!("engine endpoint is not a valid URL: {err}"),
		})?;

		if endpoint.cannot_be_a_base() {
			return Err(Error::InvalidConfig {
				message: "engine endpoint must be an absolute http(s) URL.".to_string(),
			});
		}

		let mut builder =
			Client::builder().timeout(Duration::from_millis(cfg.request_timeout_ms));

		if let EngineAuth::MutualTls { cert_pem, key_pem } = &settings.auth {
			let pem = format!("{}\n{}", cert_pem.trim_end(), key_pem.trim_end());
			let identity = Identity::from_pem(pem.as_bytes()).map_err(|err| {
				Error::InvalidConfig { message: format!("client certificate is invalid: {err}") }
			})?;

			builder = builder.identity(identity);
		}

		Ok(Self {
			http: builder.build()?,
			endpoint,
			auth: settings.auth.clone(),
			namespace: cfg.namespace.clone(),
			document_type: cfg.document_type.clone(),
		})
	}

	/// Engine-wide document id for `user_id`.
	pub fn document_id(&self, user_id: &str) -> String {
		format!("id:{}:{}::{user_id}", self.namespace, self.document_type)
	}

	pub async fn query(&self, query: &EngineQuery) -> Result<RawHits> {
		let url = self.url(&["search", ""])?;
		let params = query.parameters()?;
		let res = self.request(Method::GET, url)?.query(&params).send().await?;
		let json: Value = ensure_success(res).await?.json().await?;
		let hits = parse_query_response(&json)?;

		tracing::debug!(
			strategy = %query.strategy,
			hits = hits.hits.len(),
			total = ?hits.total,
			"Engine query completed."
		);

		Ok(hits)
	}

	pub async fn put(&self, user_id: &str, fields: Map<String, Value>) -> Result<()> {
		let body = serde_json::json!({ "put": self.document_id(user_id), "fields": fields });
		let res =
			self.request(Method::POST, self.document_url(user_id)?)?.json(&body).send().await?;

		ensure_success(res).await?;

		Ok(())
	}

	/// Partial update: every given field is assigned, every other stored field is left alone.
	pub async fn update(&self, user_id: &str, fields: Map<String, Value>) -> Result<()> {
		let assignments = fields
			.into_iter()
			.map(|(name, value)| (name, serde_json::json!({ "assign": value })))
			.collect::<Map<_, _>>();
		let body = serde_json::json!({ "update": self.document_id(user_id), "fields": assignments });
		let res =
			self.request(Method::PUT, self.document_url(user_id)?)?.json(&body).send().await?;

		ensure_success(res).await?;

		Ok(())
	}

	/// Stored fields for `user_id`, or `None` when the engine has no such document.
	pub async fn get(&self, user_id: &str) -> Result<Option<Map<String, Value>>> {
		let res = self.request(Method::GET, self.document_url(user_id)?)?.send().await?;

		if res.status() == StatusCode::NOT_FOUND {
			return Ok(None);
		}

		let json: Value = ensure_success(res).await?.json().await?;
		let fields = json.get("fields").and_then(Value::as_object).cloned().ok_or_else(|| {
			Error::InvalidResponse { message: "Document response is missing fields.".to_string() }
		})?;

		Ok(Some(fields))
	}

	/// Idempotent: deleting a document that does not exist succeeds.
	pub async fn delete(&self, user_id: &str) -> Result<()> {
		let res = self.request(Method::DELETE, self.document_url(user_id)?)?.send().await?;

		if res.status() == StatusCode::NOT_FOUND {
			tracing::debug!(user_id, "Engine document already absent.");

			return Ok(());
		}

		ensure_success(res).await?;

		Ok(())
	}

	fn request(&self, method: Method, url: Url) -> Result<RequestBuilder> {
		let builder = self.http.request(method, url);

		match &self.auth {
			EngineAuth::MutualTls { .. } => Ok(builder),
			EngineAuth::Bearer { token } => Ok(builder.bearer_auth(token)),
			EngineAuth::None => Err(Error::NoAuthConfigured),
		}
	}

	fn document_url(&self, user_id: &str) -> Result<Url> {
		self.url(&["document", "v1", &self.namespace, &self.document_type, "docid", user_id])
	}

	fn url(&self, segments: &[&str]) -> Result<Url> {
		let mut url = self.endpoint.clone();

		url.path_segments_mut()
			.map_err(|_| Error::InvalidConfig {
				message: "engine endpoint cannot carry a path.".to_string(),
			})?
			.pop_if_empty()
			.extend(segments);

		Ok(url)
	}
}

async fn ensure_success(res: Response) -> Result<Response> {
	let status = res.status();

	if status.is_success() {
		return Ok(res);
	}

	let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
	let body = res.text().await.unwrap_or_default().chars().take(MAX_ERROR_BODY_CHARS).collect();

	Err(Error::Status { status: status.as_u16(), reason, body })
}

fn parse_query_response(json: &Value) -> Result<RawHits> {
	let root = json.get("root").ok_or_else(|| Error::InvalidResponse {
		message: "Query response is missing root.".to_string(),
	})?;
	let children = root.get("children").and_then(Value::as_array);

	if children.is_none()
		&& let Some(first) = root.get("errors").and_then(Value::as_array).and_then(|e| e.first())
	{
		let message = first.get("message").and_then(Value::as_str).unwrap_or("unknown error");

		return Err(Error::InvalidResponse { message: format!("Engine reported: {message}") });
	}

	let mut hits = Vec::new();

	for child in children.into_iter().flatten() {
		let mut fields = child.get("fields").and_then(Value::as_object).cloned().unwrap_or_default();
		let match_features = fields
			.remove("matchfeatures")
			.or_else(|| child.get("matchfeatures").cloned())
			.and_then(|value| value.as_object().cloned())
			.unwrap_or_default();

		hits.push(RawHit {
			id: child.get("id").and_then(Value::as_str).map(str::to_string),
			relevance: child.get("relevance").and_then(Value::as_f64).unwrap_or(0.0),
			fields,
			match_features,
		});
	}

	let total =
		root.get("fields").and_then(|fields| fields.get("totalCount")).and_then(Value::as_u64);

	Ok(RawHits { total, hits })
}
