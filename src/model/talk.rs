use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::parse::{
    expect_columns, optional_string, required_i64, required_string, required_timestamp,
};
use crate::core::{EventId, Result, TalkId, Value};

/// A conference talk.
///
/// `stub` and `slug` are derived lazily and stay `None` until assigned. Once
/// set, a stub is unique across all talks and a slug is unique within the
/// talk's event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talk {
    pub id: TalkId,
    pub event_id: EventId,
    pub title: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub stub: Option<String>,
    pub slug: Option<String>,
}

impl Talk {
    pub(crate) const COLUMNS: &'static str =
        "id, event_id, title, description, starts_at, duration_minutes, stub, slug";

    pub(crate) fn from_row(row: &[Value]) -> Result<Self> {
        expect_columns(row, 8, "talks")?;

        Ok(Self {
            id: required_i64(&row[0], "id")?,
            event_id: required_i64(&row[1], "event_id")?,
            title: required_string(&row[2], "title")?,
            description: required_string(&row[3], "description")?,
            starts_at: required_timestamp(&row[4], "starts_at")?,
            duration_minutes: required_i64(&row[5], "duration_minutes")?,
            stub: optional_string(&row[6], "stub")?,
            slug: optional_string(&row[7], "slug")?,
        })
    }

    pub fn needs_identifiers(&self) -> bool {
        self.stub.is_none() || self.slug.is_none()
    }
}

/// Scalar fields for a talk that has not been stored yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTalk {
    pub event_id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub duration_minutes: i64,
}

impl NewTalk {
    pub fn new(event_id: EventId, title: impl Into<String>, starts_at: DateTime<Utc>) -> Self {
        Self {
            event_id,
            title: title.into(),
            description: String::new(),
            starts_at,
            duration_minutes: 0,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn duration_minutes(mut self, minutes: i64) -> Self {
        self.duration_minutes = minutes;
        self
    }
}
