use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use super::claims::list_speakers;
use crate::config::DuplicateRemoval;
use crate::core::{Result, TalkId, Value};
use crate::interface::DatabaseClient;
use crate::model::SpeakerAssociation;

const INSERT_UNCLAIMED_SQL: &str =
    "INSERT INTO talk_speakers (talk_id, speaker_name) VALUES (?, ?)";
const DELETE_SPEAKER_SQL: &str = "DELETE FROM talk_speakers WHERE id = ? AND talk_id = ?";

/// What a reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Rows deleted; exceeds `removed.len()` when duplicate names were removed together.
    pub rows_removed: u64,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Brings a talk's speakers in line with a requested list of display names.
///
/// Only the difference is written. A row whose display name is still
/// requested is never touched, so claimed speakers keep their row and their
/// user link.
///
/// No locking happens here: two concurrent reconciliations of the same talk
/// may interleave and leave a state neither asked for. A later call converges.
#[derive(Debug, Clone, Default)]
pub struct SpeakerReconciler {
    removal: DuplicateRemoval,
}

impl SpeakerReconciler {
    pub fn new(removal: DuplicateRemoval) -> Self {
        Self { removal }
    }

    pub fn removal_policy(&self) -> DuplicateRemoval {
        self.removal
    }

    pub async fn reconcile<C, S>(
        &self,
        client: &mut C,
        talk_id: TalkId,
        target: &[S],
    ) -> Result<ReconcileReport>
    where
        C: DatabaseClient + ?Sized,
        S: AsRef<str> + Sync,
    {
        let target = target_names(target);
        let current = list_speakers(client, talk_id).await?;
        let by_name = group_by_display_name(&current);

        let to_add: Vec<String> = target
            .iter()
            .filter(|name| !by_name.contains_key(name.as_str()))
            .cloned()
            .collect();

        let to_remove: Vec<(&str, &Vec<&SpeakerAssociation>)> = by_name
            .iter()
            .filter(|(name, _)| !target.contains(**name))
            .map(|(name, rows)| (*name, rows))
            .collect();

        debug!(
            talk_id,
            current = by_name.len(),
            target = target.len(),
            add = to_add.len(),
            remove = to_remove.len(),
            "reconciling speakers"
        );

        let mut report = ReconcileReport::default();

        for name in to_add {
            client
                .execute(INSERT_UNCLAIMED_SQL, &[Value::Integer(talk_id), Value::from(&name)])
                .await?;
            report.added.push(name);
        }

        for (name, rows) in to_remove {
            let victims = match self.removal {
                DuplicateRemoval::AllMatching => rows.len(),
                DuplicateRemoval::FirstMatching => 1,
            };

            for speaker in rows.iter().take(victims) {
                let done = client
                    .execute(
                        DELETE_SPEAKER_SQL,
                        &[Value::Integer(speaker.id), Value::Integer(talk_id)],
                    )
                    .await?;
                report.rows_removed += done.affected_rows();
            }
            report.removed.push(name.to_string());
        }

        if !report.is_noop() {
            info!(
                talk_id,
                added = report.added.len(),
                removed = report.removed.len(),
                rows_removed = report.rows_removed,
                "speakers reconciled"
            );
        }

        Ok(report)
    }
}

/// Requested names as a set: trimmed, blanks dropped, duplicates collapsed.
pub fn target_names<S: AsRef<str>>(names: &[S]) -> BTreeSet<String> {
    names
        .iter()
        .map(|name| name.as_ref().trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rows keep their id order within each name.
///
/// Keys are normalized like the requested names: trimmed, and blank names
/// left out of the current set entirely.
fn group_by_display_name(
    speakers: &[SpeakerAssociation],
) -> BTreeMap<&str, Vec<&SpeakerAssociation>> {
    let mut grouped: BTreeMap<&str, Vec<&SpeakerAssociation>> = BTreeMap::new();
    for speaker in speakers {
        let name = speaker.display_name().trim();
        if !name.is_empty() {
            grouped.entry(name).or_default().push(speaker);
        }
    }
    grouped
}
