use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::eyre;

use scout_service::{LazyEngine, ProfileRecord, ScoutService};

/// Re-indexes every profile in a JSON-lines export of `{"userId": ..., "profile": {...}}`.
#[derive(Debug, Parser)]
#[command(
	version = scout_cli::VERSION,
	rename_all = "kebab",
	styles = scout_cli::styles(),
)]
pub struct Args {
	#[command(flatten)]
	pub config: scout_cli::ConfigArgs,
	#[arg(long, short = 'i', value_name = "FILE")]
	pub input: PathBuf,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = scout_config::load(&args.config.config)?;

	scout_cli::init_tracing(&config.service.log_level);

	let raw = tokio::fs::read_to_string(&args.input).await?;
	let records = parse_records(&raw)?;
	let engine = Arc::new(LazyEngine::new(&config.engine));

	engine.connect().await?;

	tracing::info!(records = records.len(), input = %args.input.display(), "Starting bulk index.");

	let service = Arc::new(ScoutService::new(config, engine));
	let report = service.bulk_index(records).await;

	println!("{}", serde_json::to_string_pretty(&report)?);

	Ok(())
}

/// Parses one record per non-blank line. The first malformed line aborts with its line number.
pub fn parse_records(raw: &str) -> color_eyre::Result<Vec<ProfileRecord>> {
	let mut records = Vec::new();

	for (index, line) in raw.lines().enumerate() {
		let line = line.trim();

		if line.is_empty() {
			continue;
		}

		let record = serde_json::from_str(line)
			.map_err(|err| eyre::eyre!("Invalid profile record on line {}: {err}", index + 1))?;

		records.push(record);
	}

	Ok(records)
}
