use tracing::info;

use crate::core::{Result, StoreError, TalkId, Value};
use crate::interface::DatabaseClient;
use crate::model::{LinkType, TalkLink};

const LINK_TYPE_ID_SQL: &str = "SELECT id FROM link_types WHERE name = ?";
const LINK_TYPES_SQL: &str = "SELECT id, name FROM link_types ORDER BY id";
const INSERT_SQL: &str = "INSERT INTO talk_links (talk_id, link_type_id, url) VALUES (?, ?, ?)";
const UPDATE_SQL: &str =
    "UPDATE talk_links SET link_type_id = ?, url = ? WHERE id = ? AND talk_id = ?";
const DELETE_SQL: &str = "DELETE FROM talk_links WHERE id = ? AND talk_id = ?";

/// Attach a link of a known type to a talk and return its id.
pub async fn add_link<C>(client: &mut C, talk_id: TalkId, link_type: &str, url: &str) -> Result<i64>
where
    C: DatabaseClient + ?Sized,
{
    let type_id = resolve_link_type(client, link_type).await?;
    let done = client
        .execute(
            INSERT_SQL,
            &[Value::Integer(talk_id), Value::Integer(type_id), Value::from(url)],
        )
        .await?;

    let id = done
        .last_insert_id()
        .ok_or_else(|| StoreError::Decode("talk_links insert returned no id".into()))?;

    info!(talk_id, link_id = id, link_type, "link added");
    Ok(id)
}

/// Returns false when the link does not belong to `talk_id`.
pub async fn update_link<C>(
    client: &mut C,
    talk_id: TalkId,
    link_id: i64,
    link_type: &str,
    url: &str,
) -> Result<bool>
where
    C: DatabaseClient + ?Sized,
{
    let type_id = resolve_link_type(client, link_type).await?;
    let done = client
        .execute(
            UPDATE_SQL,
            &[
                Value::Integer(type_id),
                Value::from(url),
                Value::Integer(link_id),
                Value::Integer(talk_id),
            ],
        )
        .await?;

    Ok(done.affected_rows() > 0)
}

pub async fn remove_link<C>(client: &mut C, talk_id: TalkId, link_id: i64) -> Result<bool>
where
    C: DatabaseClient + ?Sized,
{
    let done = client
        .execute(DELETE_SQL, &[Value::Integer(link_id), Value::Integer(talk_id)])
        .await?;

    let removed = done.affected_rows() > 0;
    if removed {
        info!(talk_id, link_id, "link removed");
    }
    Ok(removed)
}

pub async fn list_links<C>(client: &mut C, talk_id: TalkId) -> Result<Vec<TalkLink>>
where
    C: DatabaseClient + ?Sized,
{
    let sql = format!("{} WHERE l.talk_id = ? ORDER BY l.id", TalkLink::SELECT);
    let result = client.query(&sql, &[Value::Integer(talk_id)]).await?;

    result.rows().iter().map(|row| TalkLink::from_row(row)).collect()
}

/// The fixed link-type vocabulary.
pub async fn link_types<C>(client: &mut C) -> Result<Vec<LinkType>>
where
    C: DatabaseClient + ?Sized,
{
    let result = client.query(LINK_TYPES_SQL, &[]).await?;
    result.rows().iter().map(|row| LinkType::from_row(row)).collect()
}

async fn resolve_link_type<C>(client: &mut C, name: &str) -> Result<i64>
where
    C: DatabaseClient + ?Sized,
{
    let result = client.query(LINK_TYPE_ID_SQL, &[Value::from(name)]).await?;
    result
        .scalar()
        .and_then(Value::as_i64)
        .ok_or_else(|| StoreError::UnknownLinkType(name.to_string()))
}
