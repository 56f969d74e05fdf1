use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use crate::core::{Result, Row, StoreError, Value};

pub(crate) type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Bind `params` to the `?` placeholders of `sql`, in order.
pub(crate) fn bind_params<'q>(sql: &'q str, params: &'q [Value]) -> SqliteQuery<'q> {
    params
        .iter()
        .fold(sqlx::query::<Sqlite>(sql), |query, value| match value {
            Value::Null => query.bind(None::<i64>),
            Value::Integer(i) => query.bind(*i),
            Value::Float(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.as_str()),
            Value::Boolean(b) => query.bind(*b),
            // Stored as RFC 3339 text so it parses back without driver help.
            Value::Timestamp(ts) => query.bind(ts.to_rfc3339()),
        })
}

pub(crate) fn column_names(row: &SqliteRow) -> Vec<String> {
    row.columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect()
}

pub(crate) fn decode_row(row: &SqliteRow) -> Result<Row> {
    (0..row.len()).map(|index| decode_column(row, index)).collect()
}

fn decode_column(row: &SqliteRow, index: usize) -> Result<Value> {
    let kind = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        raw.type_info().name().to_ascii_uppercase()
    };

    let value = match kind.as_str() {
        "INTEGER" | "INT" | "INT8" | "BIGINT" | "BOOLEAN" => {
            Value::Integer(row.try_get_unchecked::<i64, _>(index)?)
        }
        "REAL" | "FLOAT" | "DOUBLE" => Value::Float(row.try_get_unchecked::<f64, _>(index)?),
        "TEXT" | "DATETIME" | "DATE" | "TIME" => {
            Value::Text(row.try_get_unchecked::<String, _>(index)?)
        }
        other => {
            return Err(StoreError::Decode(format!(
                "unsupported column type {} at index {}",
                other, index
            )));
        }
    };

    Ok(value)
}

/// Only INSERTs produce a meaningful rowid; SQLite reports a stale one otherwise.
pub(crate) fn is_insert(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("insert"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_insert() {
        assert!(is_insert("INSERT INTO talks (title) VALUES (?)"));
        assert!(is_insert("\n   insert into talk_tracks VALUES (?, ?)"));
        assert!(!is_insert("UPDATE talks SET stub = ? WHERE id = ?"));
        assert!(!is_insert("DEL"));
    }
}
