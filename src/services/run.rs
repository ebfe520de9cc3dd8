use crate::core::GroupBuilder;
use crate::models::{RunOutcome, RunReport};
use crate::services::materializer::{EventMaterializer, GroupOutcome};
use crate::services::supabase::{SupabaseClient, SupabaseError};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// A run needs at least one pair to be worth attempting
const MIN_POOL_SIZE: usize = 2;

/// Errors that abort a run outright. Everything past the pool read is
/// isolated per group and reported, not raised.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to read the user pool: {0}")]
    PoolRead(#[from] SupabaseError),
}

/// Orchestrates one matchmaking run
///
/// Stateless and re-entrant: every invocation starts from a fresh pool read
/// and holds no state between runs. Overlapping invocations are not guarded
/// against and can create duplicate events for the same users.
pub struct MatchmakingRun {
    store: Arc<SupabaseClient>,
    builder: GroupBuilder,
    materializer: EventMaterializer,
}

impl MatchmakingRun {
    pub fn new(
        store: Arc<SupabaseClient>,
        builder: GroupBuilder,
        materializer: EventMaterializer,
    ) -> Self {
        Self {
            store,
            builder,
            materializer,
        }
    }

    /// Execute one run: read the pool, build groups, materialize each group,
    /// aggregate the report
    pub async fn execute(&self) -> Result<RunOutcome, RunError> {
        let run_at = Utc::now();

        // The pool read is the only hard failure point
        let pool = self.store.list_eligible_users().await?;

        if pool.len() < MIN_POOL_SIZE {
            info!(
                "Skipping matchmaking run: {} eligible user(s), need at least {}",
                pool.len(),
                MIN_POOL_SIZE
            );
            return Ok(RunOutcome::Skipped {
                eligible: pool.len(),
            });
        }

        // The pool snapshot is immutable from here on
        let grouping = self.builder.build_groups(&pool);

        info!(
            "Built {} group(s) from {} eligible users, {} unplaced",
            grouping.groups.len(),
            pool.len(),
            grouping.unplaced.len()
        );

        let mut events = Vec::new();
        let mut failures = Vec::new();

        for group in &grouping.groups {
            match self.materializer.materialize(group, run_at).await {
                GroupOutcome::Created { event, .. } => {
                    info!(
                        "Materialized event {} for {} participants at {}",
                        event.event_id, event.participant_count, event.location
                    );
                    events.push(event);
                }
                GroupOutcome::Failed(failure) => {
                    error!(
                        "Group failed at {} stage: {} (members: {:?})",
                        failure.stage, failure.detail, failure.member_ids
                    );
                    failures.push(failure);
                }
            }
        }

        Ok(RunOutcome::Completed(RunReport {
            pool_size: pool.len(),
            groups_attempted: grouping.groups.len(),
            events,
            failures,
        }))
    }
}
