use tracing::{debug, info};

use crate::core::{Result, TalkId, UserId, Value};
use crate::interface::DatabaseClient;
use crate::model::SpeakerAssociation;

const ATTACH_USER_SQL: &str = "INSERT INTO talk_speakers (talk_id, user_id, speaker_name) \
     SELECT ?, id, full_name FROM users WHERE id = ?";

const CLAIM_SQL: &str = "UPDATE talk_speakers SET user_id = ? WHERE id = ? AND talk_id = ?";

// Keep a display name on the row once the user link is gone.
const UNASSIGN_SQL: &str = "UPDATE talk_speakers \
     SET speaker_name = COALESCE(speaker_name, \
         (SELECT full_name FROM users WHERE users.id = talk_speakers.user_id)), \
         user_id = NULL \
     WHERE id = ? AND talk_id = ? AND user_id IS NOT NULL";

/// Speakers of a talk in insertion order.
pub async fn list_speakers<C>(client: &mut C, talk_id: TalkId) -> Result<Vec<SpeakerAssociation>>
where
    C: DatabaseClient + ?Sized,
{
    let sql = format!("{} WHERE s.talk_id = ? ORDER BY s.id", SpeakerAssociation::SELECT);
    let result = client.query(&sql, &[Value::Integer(talk_id)]).await?;

    result
        .rows()
        .iter()
        .map(|row| SpeakerAssociation::from_row(row))
        .collect()
}

/// Add a claimed speaker row for an existing user.
///
/// The user's current full name is copied into `speaker_name`. Returns the
/// new row id, or `None` when the user does not exist.
pub async fn attach_user<C>(client: &mut C, talk_id: TalkId, user_id: UserId) -> Result<Option<i64>>
where
    C: DatabaseClient + ?Sized,
{
    let done = client
        .execute(ATTACH_USER_SQL, &[Value::Integer(talk_id), Value::Integer(user_id)])
        .await?;

    if done.affected_rows() == 0 {
        debug!(talk_id, user_id, "user not found, nothing attached");
        return Ok(None);
    }

    info!(talk_id, user_id, speaker_id = ?done.last_insert_id(), "user attached as speaker");
    Ok(done.last_insert_id())
}

/// Link an existing speaker row to a user account.
///
/// Returns false when the row does not belong to `talk_id`.
pub async fn claim_speaker<C>(
    client: &mut C,
    talk_id: TalkId,
    speaker_id: i64,
    user_id: UserId,
) -> Result<bool>
where
    C: DatabaseClient + ?Sized,
{
    let done = client
        .execute(
            CLAIM_SQL,
            &[Value::Integer(user_id), Value::Integer(speaker_id), Value::Integer(talk_id)],
        )
        .await?;

    let claimed = done.affected_rows() > 0;
    if claimed {
        info!(talk_id, speaker_id, user_id, "speaker claimed");
    }
    Ok(claimed)
}

/// Drop the user link from a claimed speaker row, keeping the row.
///
/// Returns false when the row is missing or was not claimed.
pub async fn unassign_speaker<C>(client: &mut C, talk_id: TalkId, speaker_id: i64) -> Result<bool>
where
    C: DatabaseClient + ?Sized,
{
    let done = client
        .execute(UNASSIGN_SQL, &[Value::Integer(speaker_id), Value::Integer(talk_id)])
        .await?;

    let unassigned = done.affected_rows() > 0;
    if unassigned {
        info!(talk_id, speaker_id, "speaker unassigned");
    }
    Ok(unassigned)
}
