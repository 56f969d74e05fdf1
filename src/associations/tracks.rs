use tracing::{debug, info};

use crate::core::{Result, StoreError, TalkId, TrackId, Value};
use crate::interface::DatabaseClient;
use crate::model::TrackAssociation;

const FIND_SQL: &str = "SELECT id FROM talk_tracks WHERE talk_id = ? AND track_id = ?";
const INSERT_SQL: &str = "INSERT INTO talk_tracks (talk_id, track_id) VALUES (?, ?)";
const DELETE_SQL: &str = "DELETE FROM talk_tracks WHERE talk_id = ? AND track_id = ?";

/// Associate a track with a talk, returning the association id.
///
/// Linking an already-linked track returns the existing id without writing.
/// If a concurrent writer inserts the same pair between our read and our
/// insert, the unique index rejects ours and the winner's id is returned.
pub async fn link_track<C>(client: &mut C, talk_id: TalkId, track_id: TrackId) -> Result<i64>
where
    C: DatabaseClient + ?Sized,
{
    if let Some(existing) = find_association(client, talk_id, track_id).await? {
        debug!(talk_id, track_id, association_id = existing, "track already linked");
        return Ok(existing);
    }

    let params = [Value::Integer(talk_id), Value::Integer(track_id)];
    match client.execute(INSERT_SQL, &params).await {
        Ok(done) => {
            let id = match done.last_insert_id() {
                Some(id) => id,
                None => require_association(client, talk_id, track_id).await?,
            };
            info!(talk_id, track_id, association_id = id, "track linked");
            Ok(id)
        }
        Err(err) if err.is_constraint_violation() => {
            debug!(talk_id, track_id, "lost track link race, reading winner");
            require_association(client, talk_id, track_id).await
        }
        Err(err) => Err(err),
    }
}

/// Returns false when the track was not linked.
pub async fn unlink_track<C>(client: &mut C, talk_id: TalkId, track_id: TrackId) -> Result<bool>
where
    C: DatabaseClient + ?Sized,
{
    let done = client
        .execute(DELETE_SQL, &[Value::Integer(talk_id), Value::Integer(track_id)])
        .await?;

    let removed = done.affected_rows() > 0;
    if removed {
        info!(talk_id, track_id, "track unlinked");
    }
    Ok(removed)
}

pub async fn list_tracks<C>(client: &mut C, talk_id: TalkId) -> Result<Vec<TrackAssociation>>
where
    C: DatabaseClient + ?Sized,
{
    let sql = format!("{} WHERE a.talk_id = ? ORDER BY a.id", TrackAssociation::SELECT);
    let result = client.query(&sql, &[Value::Integer(talk_id)]).await?;

    result
        .rows()
        .iter()
        .map(|row| TrackAssociation::from_row(row))
        .collect()
}

async fn find_association<C>(
    client: &mut C,
    talk_id: TalkId,
    track_id: TrackId,
) -> Result<Option<i64>>
where
    C: DatabaseClient + ?Sized,
{
    let result = client
        .query(FIND_SQL, &[Value::Integer(talk_id), Value::Integer(track_id)])
        .await?;

    Ok(result.scalar().and_then(Value::as_i64))
}

async fn require_association<C>(client: &mut C, talk_id: TalkId, track_id: TrackId) -> Result<i64>
where
    C: DatabaseClient + ?Sized,
{
    find_association(client, talk_id, track_id).await?.ok_or_else(|| {
        StoreError::Decode(format!(
            "track association ({}, {}) missing after insert",
            talk_id, track_id
        ))
    })
}
