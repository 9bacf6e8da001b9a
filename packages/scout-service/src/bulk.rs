use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use scout_domain::ProfileSource;

use crate::ScoutService;

/// One line of a profile export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
	pub user_id: String,
	pub profile: ProfileSource,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkIndexReport {
	pub indexed: u64,
	pub skipped: u64,
	pub errored: u64,
}

impl ScoutService {
	/// Indexes `records` in batches of `indexing.batch_size`, pausing between batches. Profiles
	/// that have not finished onboarding are skipped. A failed item is counted and logged; it
	/// never stops the rest of its batch or later batches.
	pub async fn bulk_index(self: &Arc<Self>, records: Vec<ProfileRecord>) -> BulkIndexReport {
		let batch_size = (self.cfg.indexing.batch_size as usize).max(1);
		let pause = Duration::from_millis(self.cfg.indexing.batch_pause_ms);
		let mut report = BulkIndexReport::default();
		let mut pending = records.into_iter().peekable();
		let mut batch = 0_usize;

		while pending.peek().is_some() {
			if batch > 0 && !pause.is_zero() {
				tokio::time::sleep(pause).await;
			}

			let mut tasks = JoinSet::new();

			for record in pending.by_ref().take(batch_size) {
				if record.user_id.trim().is_empty()
					|| !record.profile.is_onboarding_complete.unwrap_or(false)
				{
					tracing::debug!(user_id = %record.user_id, "Skipping profile.");

					report.skipped += 1;

					continue;
				}

				let service = Arc::clone(self);

				tasks.spawn(async move {
					let result = service.index_user(&record.user_id, &record.profile).await;

					(record.user_id, result)
				});
			}

			while let Some(joined) = tasks.join_next().await {
				match joined {
					Ok((_, Ok(()))) => report.indexed += 1,
					Ok((user_id, Err(err))) => {
						tracing::error!(user_id, error = %err, "Failed to index profile.");

						report.errored += 1;
					},
					Err(err) => {
						tracing::error!(error = %err, "Indexing task failed.");

						report.errored += 1;
					},
				}
			}

			batch += 1;

			tracing::info!(
				batch,
				indexed = report.indexed,
				skipped = report.skipped,
				errored = report.errored,
				"Bulk index batch finished."
			);
		}

		report
	}
}
