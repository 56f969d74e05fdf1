use chrono::{DateTime, Utc};

use crate::core::{Result, StoreError, Value};

pub(crate) fn expect_columns(row: &[Value], expected: usize, projection: &str) -> Result<()> {
    if row.len() < expected {
        return Err(StoreError::Decode(format!(
            "invalid row shape for {} projection (expected {} columns, got {})",
            projection,
            expected,
            row.len()
        )));
    }
    Ok(())
}

pub(crate) fn required_i64(value: &Value, field: &str) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| type_error(field, "INTEGER", value))
}

pub(crate) fn optional_i64(value: &Value, field: &str) -> Result<Option<i64>> {
    if value.is_null() {
        return Ok(None);
    }
    required_i64(value, field).map(Some)
}

pub(crate) fn required_string(value: &Value, field: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| type_error(field, "TEXT", value))
}

pub(crate) fn optional_string(value: &Value, field: &str) -> Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    required_string(value, field).map(Some)
}

pub(crate) fn required_timestamp(value: &Value, field: &str) -> Result<DateTime<Utc>> {
    match value {
        Value::Timestamp(ts) => Ok(*ts),
        Value::Text(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(|err| StoreError::Decode(format!("{} is not RFC 3339: {}", field, err))),
        other => Err(type_error(field, "TIMESTAMP", other)),
    }
}

fn type_error(field: &str, expected: &str, value: &Value) -> StoreError {
    StoreError::Decode(format!(
        "{} expected {}, got {}",
        field,
        expected,
        value.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_values() {
        assert_eq!(optional_i64(&Value::Null, "user_id").unwrap(), None);
        assert_eq!(optional_i64(&Value::Integer(4), "user_id").unwrap(), Some(4));
        assert_eq!(optional_string(&Value::Null, "stub").unwrap(), None);
        assert!(optional_string(&Value::Integer(1), "stub").is_err());
    }

    #[test]
    fn test_timestamp_from_text() {
        let ts = required_timestamp(&Value::Text("2024-05-17T09:30:00+00:00".into()), "starts_at")
            .unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-17T09:30:00+00:00");
        assert!(required_timestamp(&Value::Text("yesterday".into()), "starts_at").is_err());
    }

    #[test]
    fn test_row_shape() {
        assert!(expect_columns(&[Value::Null], 2, "talk").is_err());
        assert!(expect_columns(&[Value::Null, Value::Null], 2, "talk").is_ok());
    }
}
