use std::fmt;

use crate::core::{Result, StoreError, TalkId, Value};
use crate::interface::DatabaseClient;

/// Position of a talk delete in its linear state machine.
///
/// ```text
/// Start -> RemoveLinks -> RemoveTrackAssociations -> RemoveSpeakerAssociations
///       -> [RemoveDependent ...] -> RemoveTalkRow -> Committed
///
/// any step ──failure──> RolledBack
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePhase {
    Start,
    RemoveLinks,
    RemoveTrackAssociations,
    RemoveSpeakerAssociations,
    /// A dependent table registered with `with_dependent_step`.
    RemoveDependent(String),
    RemoveTalkRow,
    Committed,
    RolledBack,
}

impl DeletePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }
}

impl fmt::Display for DeletePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::RemoveLinks => write!(f, "remove_links"),
            Self::RemoveTrackAssociations => write!(f, "remove_track_associations"),
            Self::RemoveSpeakerAssociations => write!(f, "remove_speaker_associations"),
            Self::RemoveDependent(table) => write!(f, "remove_{}", table),
            Self::RemoveTalkRow => write!(f, "remove_talk_row"),
            Self::Committed => write!(f, "committed"),
            Self::RolledBack => write!(f, "rolled_back"),
        }
    }
}

/// How many rows a step must touch to count as successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowExpectation {
    /// Dependents may legitimately be absent.
    Any,
    ExactlyOne,
}

impl RowExpectation {
    pub fn is_met(&self, affected_rows: u64) -> bool {
        match self {
            Self::Any => true,
            Self::ExactlyOne => affected_rows == 1,
        }
    }
}

/// One `DELETE ... WHERE <key> = talk_id` inside the delete transaction.
#[derive(Debug, Clone)]
pub struct DeleteStep {
    phase: DeletePhase,
    table: String,
    sql: String,
    expectation: RowExpectation,
}

impl DeleteStep {
    pub(crate) fn new(
        phase: DeletePhase,
        table: &str,
        key_column: &str,
        expectation: RowExpectation,
    ) -> Result<Self> {
        check_identifier(table)?;
        check_identifier(key_column)?;
        Ok(Self::builtin(phase, table, key_column, expectation))
    }

    /// For the compiled-in tables, whose names need no checking.
    pub(crate) fn builtin(
        phase: DeletePhase,
        table: &str,
        key_column: &str,
        expectation: RowExpectation,
    ) -> Self {
        Self {
            phase,
            table: table.to_string(),
            sql: format!("DELETE FROM {} WHERE {} = ?", table, key_column),
            expectation,
        }
    }

    pub fn phase(&self) -> &DeletePhase {
        &self.phase
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn expectation(&self) -> RowExpectation {
        self.expectation
    }

    pub(crate) async fn run<C>(&self, client: &mut C, talk_id: TalkId) -> Result<u64>
    where
        C: DatabaseClient + ?Sized,
    {
        let done = client.execute(&self.sql, &[Value::Integer(talk_id)]).await?;
        Ok(done.affected_rows())
    }
}

// Table and column names are spliced into SQL, so only plain identifiers pass.
fn check_identifier(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());

    if valid {
        Ok(())
    } else {
        Err(StoreError::Config(format!("invalid SQL identifier '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_sql() {
        let step = DeleteStep::new(
            DeletePhase::RemoveLinks,
            "talk_links",
            "talk_id",
            RowExpectation::Any,
        )
        .unwrap();
        assert_eq!(step.sql(), "DELETE FROM talk_links WHERE talk_id = ?");
        assert_eq!(step.table(), "talk_links");
    }

    #[test]
    fn test_rejects_non_identifiers() {
        let talk_row = |table: &str, column: &str| {
            DeleteStep::new(DeletePhase::RemoveTalkRow, table, column, RowExpectation::ExactlyOne)
        };

        assert!(talk_row("talks; DROP TABLE users", "id").is_err());
        assert!(talk_row("talks", "").is_err());
        assert!(talk_row("1talks", "id").is_err());
    }

    #[test]
    fn test_expectations() {
        assert!(RowExpectation::Any.is_met(0));
        assert!(RowExpectation::ExactlyOne.is_met(1));
        assert!(!RowExpectation::ExactlyOne.is_met(0));
        assert!(!RowExpectation::ExactlyOne.is_met(2));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(DeletePhase::RemoveTrackAssociations.to_string(), "remove_track_associations");
        assert_eq!(
            DeletePhase::RemoveDependent("talk_comments".into()).to_string(),
            "remove_talk_comments"
        );
        assert!(DeletePhase::RolledBack.is_terminal());
        assert!(!DeletePhase::RemoveTalkRow.is_terminal());
    }
}
