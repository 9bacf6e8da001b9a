//! Test doubles for the search engine and the embedding provider.

use std::{
	collections::{BTreeMap, HashMap, HashSet},
	sync::{
		Arc, Mutex, MutexGuard,
		atomic::{AtomicUsize, Ordering},
	},
};

use serde_json::{Map, Value};

use scout_config::{
	Config, EmbeddingProviderConfig, Engine, EngineParameters, Indexing, Providers, Ranking,
	Search, Service,
};
use scout_engine::{EngineQuery, Literal, Predicate, RawHit, RawHits};
use scout_service::{BoxFuture, EmbeddingProvider, ScoutService, SearchBackend};

pub const TEST_STACK: &str = "test";

/// Config with small vectors, tiny batches, and no pause between batches.
pub fn test_config(vector_dim: u32) -> Config {
	let values = HashMap::from([
		(format!("/{TEST_STACK}/search/endpoint"), "http://127.0.0.1:1".to_string()),
		(format!("/{TEST_STACK}/search/token"), "test-token".to_string()),
	]);

	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		engine: Engine {
			stack_id: TEST_STACK.to_string(),
			namespace: "user_profile".to_string(),
			document_type: "user_profile".to_string(),
			vector_field: "profileVector".to_string(),
			vector_param: "query_embedding".to_string(),
			vector_dim,
			query_timeout_ms: 5_000,
			request_timeout_ms: 10_000,
			parameters: EngineParameters {
				source: "static".to_string(),
				env_prefix: "SCOUT".to_string(),
				values,
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/embeddings".to_string(),
				model: "test-embedding".to_string(),
				dimensions: vector_dim,
				timeout_ms: 1_000,
				max_input_chars: 8_000,
				normalize: true,
				default_headers: Map::new(),
			},
		},
		search: Search { default_limit: 10, max_limit: 50 },
		ranking: Ranking::default(),
		indexing: Indexing { batch_size: 2, batch_pause_ms: 0 },
	}
}

pub fn service(
	cfg: Config,
	backend: Arc<InMemoryEngine>,
	embedding: Arc<dyn EmbeddingProvider>,
) -> Arc<ScoutService> {
	Arc::new(ScoutService::with_providers(
		cfg,
		backend,
		scout_service::Providers::new(embedding),
	))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Calls {
	pub query: usize,
	pub put: usize,
	pub update: usize,
	pub get: usize,
	pub delete: usize,
}

/// Search engine fake that evaluates the predicate tree over documents held in memory.
///
/// Lexical clauses match when any query term occurs in any listed field (case-insensitive) and
/// score the fraction of terms found. Nearest-neighbor clauses score cosine similarity.
pub struct InMemoryEngine {
	vector_field: String,
	match_features: Option<(String, String)>,
	state: Mutex<State>,
}
impl InMemoryEngine {
	pub fn new(vector_field: impl Into<String>) -> Self {
		Self { vector_field: vector_field.into(), match_features: None, state: Default::default() }
	}

	/// Reports the semantic and keyword components of each hit under the given feature names.
	pub fn with_match_features(
		mut self,
		semantic: impl Into<String>,
		keyword: impl Into<String>,
	) -> Self {
		self.match_features = Some((semantic.into(), keyword.into()));

		self
	}

	/// Writes for `user_id` fail with a 500 from now on.
	pub fn fail_writes_for(&self, user_id: &str) {
		self.lock().failing.insert(user_id.to_string());
	}

	pub fn insert(&self, user_id: &str, fields: Map<String, Value>) {
		self.lock().docs.insert(user_id.to_string(), fields);
	}

	pub fn document(&self, user_id: &str) -> Option<Map<String, Value>> {
		self.lock().docs.get(user_id).cloned()
	}

	pub fn len(&self) -> usize {
		self.lock().docs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn queries(&self) -> Vec<EngineQuery> {
		self.lock().queries.clone()
	}

	pub fn calls(&self) -> Calls {
		self.lock().calls
	}

	fn lock(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn search(&self, query: &EngineQuery) -> RawHits {
		let mut state = self.lock();

		state.calls.query += 1;
		state.queries.push(query.clone());

		let vector = query.vector.as_ref().map(|input| input.values.as_slice());
		let mut matched = state
			.docs
			.iter()
			.filter_map(|(user_id, doc)| {
				let mut scores = Scores::default();

				evaluate(&query.predicate, doc, vector, &mut scores)
					.then(|| (user_id.clone(), doc.clone(), scores))
			})
			.collect::<Vec<_>>();

		matched.sort_by(|a, b| b.2.relevance().total_cmp(&a.2.relevance()).then(a.0.cmp(&b.0)));

		let total = matched.len() as u64;
		let hits = matched
			.into_iter()
			.take(query.hits as usize)
			.map(|(user_id, mut fields, scores)| {
				let mut match_features = Map::new();

				fields.remove(&self.vector_field);

				if let Some((semantic, keyword)) = self.match_features.as_ref() {
					if let Some(score) = scores.semantic {
						match_features.insert(semantic.clone(), Value::from(score));
					}
					if query.predicate.has_lexical() {
						match_features.insert(keyword.clone(), Value::from(scores.lexical));
					}
				}

				RawHit {
					id: Some(format!("id:memory:memory::{user_id}")),
					relevance: scores.relevance(),
					fields,
					match_features,
				}
			})
			.collect();

		RawHits { total: Some(total), hits }
	}

	fn write(&self, user_id: &str, apply: impl FnOnce(&mut State)) -> scout_engine::Result<()> {
		let mut state = self.lock();

		if state.failing.contains(user_id) {
			return Err(scout_engine::Error::Status {
				status: 500,
				reason: "Internal Server Error".to_string(),
				body: "injected failure".to_string(),
			});
		}

		apply(&mut state);

		Ok(())
	}
}
impl SearchBackend for InMemoryEngine {
	fn query<'a>(&'a self, query: &'a EngineQuery) -> BoxFuture<'a, scout_engine::Result<RawHits>> {
		let hits = self.search(query);

		Box::pin(async move { Ok(hits) })
	}

	fn put<'a>(
		&'a self,
		user_id: &'a str,
		fields: Map<String, Value>,
	) -> BoxFuture<'a, scout_engine::Result<()>> {
		let result = self.write(user_id, |state| {
			state.calls.put += 1;
			state.docs.insert(user_id.to_string(), fields);
		});

		Box::pin(async move { result })
	}

	fn update<'a>(
		&'a self,
		user_id: &'a str,
		fields: Map<String, Value>,
	) -> BoxFuture<'a, scout_engine::Result<()>> {
		let result = self.write(user_id, |state| {
			state.calls.update += 1;

			// Updating a missing document is a no-op, as on the real engine.
			if let Some(doc) = state.docs.get_mut(user_id) {
				for (name, value) in fields {
					// Assigning null clears the field.
					if value.is_null() {
						doc.remove(&name);
					} else {
						doc.insert(name, value);
					}
				}
			}
		});

		Box::pin(async move { result })
	}

	fn get<'a>(
		&'a self,
		user_id: &'a str,
	) -> BoxFuture<'a, scout_engine::Result<Option<Map<String, Value>>>> {
		let doc = {
			let mut state = self.lock();

			state.calls.get += 1;
			state.docs.get(user_id).cloned()
		};

		Box::pin(async move { Ok(doc) })
	}

	fn delete<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, scout_engine::Result<()>> {
		let result = self.write(user_id, |state| {
			state.calls.delete += 1;
			state.docs.remove(user_id);
		});

		Box::pin(async move { result })
	}
}

pub struct FixedEmbedding {
	vector: Vec<f32>,
}
impl FixedEmbedding {
	pub fn new(vector: Vec<f32>) -> Self {
		Self { vector }
	}
}
impl EmbeddingProvider for FixedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_text: &'a str,
	) -> BoxFuture<'a, scout_providers::Result<Vec<f32>>> {
		let vector = self.vector.clone();

		Box::pin(async move { Ok(vector) })
	}
}

pub struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		_text: &'a str,
	) -> BoxFuture<'a, scout_providers::Result<Vec<f32>>> {
		Box::pin(async move {
			Err(scout_providers::Error::InvalidResponse {
				message: "Embedding provider unavailable.".to_string(),
			})
		})
	}
}

/// One dimension per vocabulary term: 1.0 when the text mentions the term.
pub struct TermEmbedding {
	vocabulary: Vec<String>,
}
impl TermEmbedding {
	pub fn new(vocabulary: &[&str]) -> Self {
		Self { vocabulary: vocabulary.iter().map(|term| term.to_lowercase()).collect() }
	}
}
impl EmbeddingProvider for TermEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, scout_providers::Result<Vec<f32>>> {
		let text = text.to_lowercase();
		let vector = self
			.vocabulary
			.iter()
			.map(|term| if text.contains(term.as_str()) { 1.0 } else { 0.0 })
			.collect::<Vec<f32>>();

		Box::pin(async move { Ok(vector) })
	}
}

/// Records every input it is asked to embed.
pub struct SpyEmbedding {
	vector: Vec<f32>,
	calls: AtomicUsize,
	inputs: Mutex<Vec<String>>,
}
impl SpyEmbedding {
	pub fn new(vector: Vec<f32>) -> Self {
		Self { vector, calls: AtomicUsize::new(0), inputs: Mutex::new(Vec::new()) }
	}

	pub fn count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn inputs(&self) -> Vec<String> {
		self.inputs.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl EmbeddingProvider for SpyEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, scout_providers::Result<Vec<f32>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inputs.lock().unwrap_or_else(|err| err.into_inner()).push(text.to_string());

		let vector = self.vector.clone();

		Box::pin(async move { Ok(vector) })
	}
}

#[derive(Default)]
struct State {
	docs: BTreeMap<String, Map<String, Value>>,
	queries: Vec<EngineQuery>,
	calls: Calls,
	failing: HashSet<String>,
}

#[derive(Debug, Default)]
struct Scores {
	lexical: f64,
	semantic: Option<f64>,
}
impl Scores {
	fn relevance(&self) -> f64 {
		self.lexical + self.semantic.unwrap_or(0.0)
	}
}

fn evaluate(
	predicate: &Predicate,
	doc: &Map<String, Value>,
	vector: Option<&[f32]>,
	scores: &mut Scores,
) -> bool {
	match predicate {
		Predicate::True => true,
		Predicate::Lexical { fields, text, .. } => {
			let haystack = fields
				.iter()
				.filter_map(|field| doc.get(field))
				.flat_map(text_values)
				.collect::<Vec<_>>()
				.join(" ")
				.to_lowercase();
			let terms = text.to_lowercase();
			let terms = terms.split_whitespace().collect::<Vec<_>>();
			let found = terms.iter().filter(|term| haystack.contains(**term)).count();

			if found == 0 {
				return false;
			}

			scores.lexical += found as f64 / terms.len() as f64;

			true
		},
		Predicate::NearestNeighbor { field, .. } => {
			let (Some(query), Some(stored)) = (vector, stored_vector(doc, field)) else {
				return false;
			};
			let similarity = cosine(query, &stored);

			scores.semantic = Some(scores.semantic.map_or(similarity, |s| s.max(similarity)));

			true
		},
		Predicate::Equals { field, value } => match (value, doc.get(field)) {
			(Literal::Str(expected), Some(actual)) =>
				text_values(actual).iter().any(|v| v.eq_ignore_ascii_case(expected)),
			(Literal::Bool(expected), Some(actual)) => actual.as_bool() == Some(*expected),
			(Literal::Int(expected), Some(actual)) => actual.as_i64() == Some(*expected),
			(_, None) => false,
		},
		Predicate::Range { field, min, max } => {
			let Some(actual) = doc.get(field).and_then(Value::as_i64) else {
				return false;
			};

			min.is_none_or(|min| actual >= min) && max.is_none_or(|max| actual <= max)
		},
		Predicate::Contains { field, value } => doc.get(field).is_some_and(|actual| {
			let needle = value.to_lowercase();

			match actual {
				Value::Array(_) => text_values(actual).iter().any(|v| v.to_lowercase() == needle),
				_ => text_values(actual).iter().any(|v| v.to_lowercase().contains(&needle)),
			}
		}),
		Predicate::And(nodes) => nodes.iter().all(|node| evaluate(node, doc, vector, scores)),
		Predicate::Or(nodes) => {
			let mut any = false;

			for node in nodes {
				any |= evaluate(node, doc, vector, scores);
			}

			any
		},
	}
}

fn text_values(value: &Value) -> Vec<String> {
	match value {
		Value::String(text) => vec![text.clone()],
		Value::Array(items) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
		_ => Vec::new(),
	}
}

fn stored_vector(doc: &Map<String, Value>, field: &str) -> Option<Vec<f32>> {
	let values = doc.get(field)?.get("values")?.as_array()?;

	Some(values.iter().filter_map(Value::as_f64).map(|v| v as f32).collect())
}

fn cosine(a: &[f32], b: &[f32]) -> f64 {
	if a.len() != b.len() {
		return 0.0;
	}

	let dot = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum::<f64>();
	let norm_a = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
	let norm_b = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();

	if norm_a == 0.0 || norm_b == 0.0 {
		return 0.0;
	}

	dot / (norm_a * norm_b)
}
