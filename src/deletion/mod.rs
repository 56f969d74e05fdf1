// ============================================================================
// Cascading Talk Delete
// ============================================================================
//
// A talk is removed together with its links, track associations and speaker
// associations inside one transaction. The work is an ordered list of
// DeleteSteps; the talk row is always the last step because every other
// table references it.
//
// Any failing step (storage error or unexpected row count) rolls the whole
// transaction back. Callers see Committed or RolledBack, never a partial
// delete.
//
// ============================================================================

mod step;

pub use step::{DeletePhase, DeleteStep, RowExpectation};

use tracing::{debug, info, warn};

use crate::core::{Result, TalkId};
use crate::interface::DatabaseClient;

/// Result of [`CascadingDeleteCoordinator::delete_talk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Every step succeeded; `rows_removed` counts the talk row too.
    Committed { rows_removed: u64 },
    /// Nothing was changed.
    RolledBack { failed_at: DeletePhase },
}

impl DeleteOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    pub fn phase(&self) -> DeletePhase {
        match self {
            Self::Committed { .. } => DeletePhase::Committed,
            Self::RolledBack { .. } => DeletePhase::RolledBack,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CascadingDeleteCoordinator {
    dependents: Vec<DeleteStep>,
    talk_row: DeleteStep,
}

impl CascadingDeleteCoordinator {
    pub fn new() -> Self {
        Self {
            dependents: vec![
                DeleteStep::builtin(
                    DeletePhase::RemoveLinks,
                    "talk_links",
                    "talk_id",
                    RowExpectation::Any,
                ),
                DeleteStep::builtin(
                    DeletePhase::RemoveTrackAssociations,
                    "talk_tracks",
                    "talk_id",
                    RowExpectation::Any,
                ),
                DeleteStep::builtin(
                    DeletePhase::RemoveSpeakerAssociations,
                    "talk_speakers",
                    "talk_id",
                    RowExpectation::Any,
                ),
            ],
            talk_row: DeleteStep::builtin(
                DeletePhase::RemoveTalkRow,
                "talks",
                "id",
                RowExpectation::ExactlyOne,
            ),
        }
    }

    /// Register another table whose rows reference the talk through `key_column`.
    ///
    /// The step runs after the built-in dependents and before the talk row.
    pub fn with_dependent_step(mut self, table: &str, key_column: &str) -> Result<Self> {
        let step = DeleteStep::new(
            DeletePhase::RemoveDependent(table.to_string()),
            table,
            key_column,
            RowExpectation::Any,
        )?;
        self.dependents.push(step);
        Ok(self)
    }

    /// Steps in execution order.
    pub fn steps(&self) -> impl Iterator<Item = &DeleteStep> {
        self.dependents.iter().chain(std::iter::once(&self.talk_row))
    }

    /// Delete a talk and everything attached to it, atomically.
    ///
    /// Step failures are reported as [`DeleteOutcome::RolledBack`]. `Err` is
    /// returned only when the transaction could not be opened or rolled back.
    pub async fn delete_talk<C>(&self, client: &mut C, talk_id: TalkId) -> Result<DeleteOutcome>
    where
        C: DatabaseClient + ?Sized,
    {
        client.begin().await?;
        debug!(talk_id, phase = %DeletePhase::Start, "talk delete started");

        let mut rows_removed = 0;

        for step in self.steps() {
            let failure = match step.run(client, talk_id).await {
                Ok(affected) if step.expectation().is_met(affected) => {
                    debug!(talk_id, phase = %step.phase(), affected, "delete step done");
                    rows_removed += affected;
                    None
                }
                Ok(affected) => Some(format!(
                    "{} rows affected, expected {:?}",
                    affected,
                    step.expectation()
                )),
                Err(err) => Some(err.to_string()),
            };

            if let Some(reason) = failure {
                warn!(talk_id, phase = %step.phase(), %reason, "talk delete rolled back");
                client.rollback().await?;
                return Ok(DeleteOutcome::RolledBack {
                    failed_at: step.phase().clone(),
                });
            }
        }

        if let Err(err) = client.commit().await {
            warn!(talk_id, error = %err, "talk delete commit failed, rolling back");
            client.rollback().await?;
            return Ok(DeleteOutcome::RolledBack {
                failed_at: DeletePhase::Committed,
            });
        }

        info!(talk_id, rows_removed, "talk deleted");
        Ok(DeleteOutcome::Committed { rows_removed })
    }
}

impl Default for CascadingDeleteCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let coordinator = CascadingDeleteCoordinator::new();
        let tables: Vec<&str> = coordinator.steps().map(DeleteStep::table).collect();
        assert_eq!(tables, vec!["talk_links", "talk_tracks", "talk_speakers", "talks"]);
    }

    #[test]
    fn test_dependent_step_keeps_talk_row_last() {
        let coordinator = CascadingDeleteCoordinator::new()
            .with_dependent_step("talk_comments", "talk_id")
            .unwrap();

        let phases: Vec<DeletePhase> = coordinator.steps().map(|s| s.phase().clone()).collect();
        assert_eq!(phases.len(), 5);
        assert_eq!(phases[3], DeletePhase::RemoveDependent("talk_comments".into()));
        assert_eq!(phases[4], DeletePhase::RemoveTalkRow);
    }

    #[test]
    fn test_outcome_phase() {
        assert!(DeleteOutcome::Committed { rows_removed: 1 }.is_committed());
        let rolled = DeleteOutcome::RolledBack {
            failed_at: DeletePhase::RemoveLinks,
        };
        assert!(!rolled.is_committed());
        assert_eq!(rolled.phase(), DeletePhase::RolledBack);
    }
}
