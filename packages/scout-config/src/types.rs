use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub engine: Engine,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub indexing: Indexing,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Engine {
	/// Deployment identifier. Engine parameters are looked up under `/<stack_id>/search/...`.
	pub stack_id: String,
	pub namespace: String,
	pub document_type: String,
	#[serde(default = "default_vector_field")]
	pub vector_field: String,
	#[serde(default = "default_vector_param")]
	pub vector_param: String,
	#[serde(default = "default_vector_dim")]
	pub vector_dim: u32,
	/// Server-side query budget, sent as the engine's `timeout` parameter.
	#[serde(default = "default_query_timeout_ms")]
	pub query_timeout_ms: u64,
	/// Client-side bound on a whole HTTP exchange.
	#[serde(default = "default_request_timeout_ms")]
	pub request_timeout_ms: u64,
	#[serde(default)]
	pub parameters: EngineParameters,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineParameters {
	/// `env` or `static`.
	pub source: String,
	pub env_prefix: String,
	/// Parameter path to value, consulted only by the `static` source.
	pub values: HashMap<String, String>,
}
impl Default for EngineParameters {
	fn default() -> Self {
		Self { source: "env".to_string(), env_prefix: "SCOUT".to_string(), values: HashMap::new() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default = "default_max_input_chars")]
	pub max_input_chars: usize,
	#[serde(default = "default_true")]
	pub normalize: bool,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_limit: u32,
	pub max_limit: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { default_limit: 10, max_limit: 100 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub semantic_weight: f32,
	pub keyword_weight: f32,
	/// Match-feature carrying the vector similarity component of a hybrid hit.
	pub semantic_feature: String,
	/// Match-feature carrying the lexical component of a hybrid hit.
	pub keyword_feature: String,
}
impl Default for Ranking {
	fn default() -> Self {
		Self {
			semantic_weight: 0.6,
			keyword_weight: 0.4,
			semantic_feature: "closeness(field,profileVector)".to_string(),
			keyword_feature: "nativeRank".to_string(),
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Indexing {
	pub batch_size: u32,
	pub batch_pause_ms: u64,
}
impl Default for Indexing {
	fn default() -> Self {
		Self { batch_size: 10, batch_pause_ms: 1_000 }
	}
}

fn default_vector_field() -> String {
	"profileVector".to_string()
}

fn default_vector_param() -> String {
	"query_embedding".to_string()
}

fn default_vector_dim() -> u32 {
	1_024
}

fn default_query_timeout_ms() -> u64 {
	5_000
}

fn default_request_timeout_ms() -> u64 {
	10_000
}

fn default_max_input_chars() -> usize {
	8_000
}

fn default_true() -> bool {
	true
}
