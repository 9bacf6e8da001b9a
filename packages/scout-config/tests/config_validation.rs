use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use scout_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let mut table = root.as_table_mut().expect("Template config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("scout_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> scout_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = scout_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn expect_validation(payload: String, expected: &str) {
	let err = load_payload(payload).expect_err("Expected validation error.");

	assert!(matches!(err, Error::Validation { .. }), "Unexpected error kind: {err:?}");

	let message = err.to_string();

	assert!(message.contains(expected), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads() {
	let cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Sample config should load.");

	assert_eq!(cfg.engine.vector_dim, 1_024);
	assert_eq!(cfg.engine.query_timeout_ms, 5_000);
	assert_eq!(cfg.search.default_limit, 10);
	assert_eq!(cfg.engine.parameters.values.len(), 2);
}

#[test]
fn optional_sections_fall_back_to_defaults() {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let table = root.as_table_mut().expect("Template config must be a table.");

	table.remove("search");
	table.remove("ranking");
	table.remove("indexing");

	let cfg = load_payload(toml::to_string(&root).expect("Failed to render config."))
		.expect("Config without optional sections should load.");

	assert_eq!(cfg.search.default_limit, 10);
	assert_eq!(cfg.ranking.semantic_weight, 0.6);
	assert_eq!(cfg.ranking.keyword_weight, 0.4);
	assert_eq!(cfg.indexing.batch_size, 10);
}

#[test]
fn embedding_dimensions_must_match_vector_dim() {
	expect_validation(
		sample_with("providers.embedding", "dimensions", Value::Integer(512)),
		"providers.embedding.dimensions must match engine.vector_dim.",
	);
}

#[test]
fn parameter_source_must_be_known() {
	expect_validation(
		sample_with("engine.parameters", "source", Value::String("vault".to_string())),
		"engine.parameters.source must be one of env or static.",
	);
}

#[test]
fn weights_must_be_in_unit_range() {
	expect_validation(
		sample_with("ranking", "semantic_weight", Value::Float(1.5)),
		"ranking.semantic_weight must be in the range 0.0-1.0.",
	);
}

#[test]
fn weights_must_not_both_be_zero() {
	let payload = sample_with("ranking", "semantic_weight", Value::Float(0.0));
	let mut root: Value = toml::from_str(&payload).expect("Failed to parse config.");

	root.get_mut("ranking")
		.and_then(Value::as_table_mut)
		.expect("Config must include [ranking].")
		.insert("keyword_weight".to_string(), Value::Float(0.0));

	expect_validation(
		toml::to_string(&root).expect("Failed to render config."),
		"must not both be zero",
	);
}

#[test]
fn batch_size_is_bounded() {
	expect_validation(
		sample_with("indexing", "batch_size", Value::Integer(5_000)),
		"indexing.batch_size must be in the range 1-100.",
	);
}

#[test]
fn default_limit_cannot_exceed_max_limit() {
	expect_validation(
		sample_with("search", "default_limit", Value::Integer(500)),
		"search.default_limit must be in the range 1-search.max_limit.",
	);
}

#[test]
fn stack_id_must_be_non_empty() {
	expect_validation(
		sample_with("engine", "stack_id", Value::String("  ".to_string())),
		"engine.stack_id must be non-empty.",
	);
}

#[test]
fn blank_static_parameters_are_dropped() {
	let cfg = load_payload(sample_with(
		"engine.parameters.values",
		"/dev/search/cert",
		Value::String("   ".to_string()),
	))
	.expect("Config should load.");

	assert!(!cfg.engine.parameters.values.contains_key("/dev/search/cert"));
}

#[test]
fn missing_file_reports_path() {
	let path = env::temp_dir().join("scout_config_missing_file.toml");
	let err = scout_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }));
}
