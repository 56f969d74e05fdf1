#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use talkstore::prelude::*;

pub fn starts_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 4, 9, 30, 0).unwrap()
}

pub async fn client() -> SqliteClient {
    SqliteClient::in_memory().await.unwrap()
}

pub async fn store() -> TalkStore<SqliteClient> {
    store_with(StoreConfig::default()).await
}

pub async fn store_with(config: StoreConfig) -> TalkStore<SqliteClient> {
    TalkStore::open(&ConnectionConfig::in_memory(), config).await.unwrap()
}

pub async fn insert_event<C>(client: &mut C, name: &str) -> i64
where
    C: DatabaseClient + ?Sized,
{
    client
        .execute("INSERT INTO events (name) VALUES (?)", &[Value::from(name)])
        .await
        .unwrap()
        .last_insert_id()
        .unwrap()
}

pub async fn insert_user<C>(client: &mut C, username: &str, full_name: &str) -> i64
where
    C: DatabaseClient + ?Sized,
{
    client
        .execute(
            "INSERT INTO users (username, full_name) VALUES (?, ?)",
            &[Value::from(username), Value::from(full_name)],
        )
        .await
        .unwrap()
        .last_insert_id()
        .unwrap()
}

pub async fn insert_track<C>(client: &mut C, event_id: i64, name: &str) -> i64
where
    C: DatabaseClient + ?Sized,
{
    client
        .execute(
            "INSERT INTO event_tracks (event_id, name) VALUES (?, ?)",
            &[Value::Integer(event_id), Value::from(name)],
        )
        .await
        .unwrap()
        .last_insert_id()
        .unwrap()
}

/// A talk row with no stub or slug yet.
pub async fn insert_bare_talk<C>(client: &mut C, event_id: i64, title: &str) -> i64
where
    C: DatabaseClient + ?Sized,
{
    client
        .execute(
            "INSERT INTO talks (event_id, title, starts_at) VALUES (?, ?, ?)",
            &[Value::Integer(event_id), Value::from(title), Value::Timestamp(starts_at())],
        )
        .await
        .unwrap()
        .last_insert_id()
        .unwrap()
}

/// Unclaimed speaker row written directly, bypassing the reconciler.
pub async fn insert_speaker<C>(client: &mut C, talk_id: i64, name: &str) -> i64
where
    C: DatabaseClient + ?Sized,
{
    client
        .execute(
            "INSERT INTO talk_speakers (talk_id, speaker_name) VALUES (?, ?)",
            &[Value::Integer(talk_id), Value::from(name)],
        )
        .await
        .unwrap()
        .last_insert_id()
        .unwrap()
}

pub async fn identifiers<C>(client: &mut C, talk_id: i64) -> (Option<String>, Option<String>)
where
    C: DatabaseClient + ?Sized,
{
    let result = client
        .query("SELECT stub, slug FROM talks WHERE id = ?", &[Value::Integer(talk_id)])
        .await
        .unwrap();
    let row = &result.rows()[0];
    (row[0].as_str().map(str::to_string), row[1].as_str().map(str::to_string))
}

pub async fn count_for_talk<C>(client: &mut C, table: &str, talk_id: i64) -> i64
where
    C: DatabaseClient + ?Sized,
{
    let column = if table == "talks" { "id" } else { "talk_id" };
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?", table, column);
    let result = client.query(&sql, &[Value::Integer(talk_id)]).await.unwrap();
    result.scalar().and_then(Value::as_i64).unwrap()
}

/// Every row belonging to a talk, per table, for before/after comparison.
pub async fn snapshot<C>(client: &mut C, talk_id: i64) -> Vec<Vec<Vec<Value>>>
where
    C: DatabaseClient + ?Sized,
{
    let mut tables = Vec::new();
    for sql in [
        "SELECT * FROM talks WHERE id = ? ORDER BY id",
        "SELECT * FROM talk_links WHERE talk_id = ? ORDER BY id",
        "SELECT * FROM talk_tracks WHERE talk_id = ? ORDER BY id",
        "SELECT * FROM talk_speakers WHERE talk_id = ? ORDER BY id",
    ] {
        let result = client.query(sql, &[Value::Integer(talk_id)]).await.unwrap();
        tables.push(result.into_rows());
    }
    tables
}

pub fn display_names(speakers: &[SpeakerAssociation]) -> Vec<String> {
    let mut names: Vec<String> = speakers.iter().map(|s| s.display_name().to_string()).collect();
    names.sort();
    names
}
