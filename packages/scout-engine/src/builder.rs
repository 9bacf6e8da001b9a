use std::time::Duration;

use scout_domain::{RankingStrategy, SearchFilters, SearchRequest, fields};

use crate::{Error, LexicalMode, Literal, Predicate, Result};

const WEAK_AND_MIN_TARGET_HITS: u32 = 100;

/// Engine-side names and limits the builder needs. Taken from the `[engine]` config section.
#[derive(Debug, Clone)]
pub struct QueryLayout {
	pub document_type: String,
	pub vector_field: String,
	pub vector_param: String,
	pub vector_dim: usize,
	pub timeout: Duration,
}
impl QueryLayout {
	pub fn from_config(cfg: &scout_config::Engine) -> Self {
		Self {
			document_type: cfg.document_type.clone(),
			vector_field: cfg.vector_field.clone(),
			vector_param: cfg.vector_param.clone(),
			vector_dim: cfg.vector_dim as usize,
			timeout: Duration::from_millis(cfg.query_timeout_ms),
		}
	}
}

/// Query vector bound as a named engine input instead of being inlined into the YQL.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorInput {
	pub param: String,
	pub values: Vec<f32>,
}
impl VectorInput {
	pub fn parameter_name(&self) -> String {
		format!("input.query({})", self.param)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineQuery {
	pub predicate: Predicate,
	pub yql: String,
	pub hits: u32,
	pub strategy: RankingStrategy,
	pub timeout: Duration,
	pub vector: Option<VectorInput>,
}
impl EngineQuery {
	/// Query-string parameters for the engine's search endpoint.
	pub fn parameters(&self) -> Result<Vec<(String, String)>> {
		let mut params = vec![
			("yql".to_string(), self.yql.clone()),
			("hits".to_string(), self.hits.to_string()),
			("ranking".to_string(), self.strategy.profile_name().to_string()),
			("format".to_string(), "json".to_string()),
			("timeout".to_string(), format_timeout(self.timeout)),
		];

		if let Some(vector) = self.vector.as_ref() {
			params.push((vector.parameter_name(), serde_json::to_string(&vector.values)?));
		}

		Ok(params)
	}
}

/// Builds the engine query for `request`.
///
/// Predicate selection, first match wins:
/// 1. `semantic`: nearest neighbor only.
/// 2. `hybrid` with a vector: lexical disjunction OR nearest neighbor.
/// 3. Non-empty text: weak AND across the lexical fields.
/// 4. Otherwise: `true`.
///
/// Filters are then AND-ed on, and `isOnboardingComplete = true` always comes last.
pub fn build(request: &SearchRequest, layout: &QueryLayout) -> Result<EngineQuery> {
	if request.limit == 0 {
		return Err(Error::InvalidQuery { message: "limit must be greater than zero.".to_string() });
	}

	if let Some(vector) = request.query_vector.as_ref()
		&& vector.len() != layout.vector_dim
	{
		return Err(Error::VectorDimension { expected: layout.vector_dim, actual: vector.len() });
	}

	let text = request.query_text();
	let nearest = || Predicate::NearestNeighbor {
		field: layout.vector_field.clone(),
		param: layout.vector_param.clone(),
		target_hits: request.limit,
	};
	let (base, vector) = match (request.strategy, request.query_vector.as_ref()) {
		(RankingStrategy::Semantic, Some(values)) => (nearest(), Some(values)),
		(RankingStrategy::Semantic, None) => {
			return Err(Error::InvalidQuery {
				message: "semantic ranking requires a query vector.".to_string(),
			});
		},
		(RankingStrategy::Hybrid, Some(values)) => {
			let predicate = match text {
				Some(text) => Predicate::Or(vec![lexical(text, LexicalMode::Any), nearest()]),
				None => nearest(),
			};

			(predicate, Some(values))
		},
		_ => match text {
			Some(text) => (
				lexical(
					text,
					LexicalMode::WeakAnd {
						target_hits: request.limit.max(WEAK_AND_MIN_TARGET_HITS),
					},
				),
				None,
			),
			None => (Predicate::True, None),
		},
	};
	let mut clauses = vec![base];

	clauses.extend(filter_clauses(&request.filters));
	clauses.push(Predicate::equals(fields::IS_ONBOARDING_COMPLETE, Literal::Bool(true)));

	let predicate = Predicate::And(clauses);
	let yql = format!("select * from {} where {}", layout.document_type, predicate.render());

	Ok(EngineQuery {
		predicate,
		yql,
		hits: request.limit,
		strategy: request.strategy,
		timeout: layout.timeout,
		vector: vector
			.map(|values| VectorInput { param: layout.vector_param.clone(), values: values.clone() }),
	})
}

fn lexical(text: &str, mode: LexicalMode) -> Predicate {
	Predicate::Lexical {
		fields: fields::LEXICAL.iter().map(|field| field.to_string()).collect(),
		text: text.to_string(),
		mode,
	}
}

fn filter_clauses(filters: &SearchFilters) -> Vec<Predicate> {
	let mut clauses = Vec::new();

	if let Some(industry) = filters.industry_value() {
		clauses.push(Predicate::equals(fields::INDUSTRY, Literal::Str(industry.to_string())));
	}
	if filters.min_experience.is_some() || filters.max_experience.is_some() {
		clauses.push(Predicate::Range {
			field: fields::YEARS_OF_EXPERIENCE.to_string(),
			min: filters.min_experience.map(i64::from),
			max: filters.max_experience.map(i64::from),
		});
	}

	let skills: Vec<Predicate> =
		filters.skill_values().map(|skill| Predicate::contains(fields::SKILLS, skill)).collect();

	if !skills.is_empty() {
		clauses.push(Predicate::Or(skills));
	}

	clauses
}

fn format_timeout(timeout: Duration) -> String {
	let millis = timeout.as_millis();

	if millis % 1_000 == 0 { format!("{}s", millis / 1_000) } else { format!("{millis}ms") }
}
