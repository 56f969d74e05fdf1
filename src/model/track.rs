use serde::{Deserialize, Serialize};

use super::parse::{expect_columns, required_i64, required_string};
use crate::core::{Result, TalkId, TrackId, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackAssociation {
    pub id: i64,
    pub talk_id: TalkId,
    pub track_id: TrackId,
    pub track_name: String,
}

impl TrackAssociation {
    pub(crate) const SELECT: &'static str = "SELECT a.id, a.talk_id, a.track_id, t.name \
         FROM talk_tracks a JOIN event_tracks t ON t.id = a.track_id";

    pub(crate) fn from_row(row: &[Value]) -> Result<Self> {
        expect_columns(row, 4, "talk_tracks")?;

        Ok(Self {
            id: required_i64(&row[0], "id")?,
            talk_id: required_i64(&row[1], "talk_id")?,
            track_id: required_i64(&row[2], "track_id")?,
            track_name: required_string(&row[3], "name")?,
        })
    }
}
