use serde::{Deserialize, Serialize};

use super::parse::{expect_columns, optional_i64, optional_string, required_i64};
use crate::core::{Result, TalkId, UserId, Value};

/// One speaker attached to a talk.
///
/// A row is either claimed (linked to a user account) or unclaimed (free-text
/// name only). When claimed, the user's name wins for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerAssociation {
    pub id: i64,
    pub talk_id: TalkId,
    pub speaker_name: Option<String>,
    pub user_id: Option<UserId>,
    pub user_full_name: Option<String>,
}

impl SpeakerAssociation {
    pub(crate) const SELECT: &'static str =
        "SELECT s.id, s.talk_id, s.speaker_name, s.user_id, u.full_name \
         FROM talk_speakers s LEFT JOIN users u ON u.id = s.user_id";

    pub(crate) fn from_row(row: &[Value]) -> Result<Self> {
        expect_columns(row, 5, "talk_speakers")?;

        Ok(Self {
            id: required_i64(&row[0], "id")?,
            talk_id: required_i64(&row[1], "talk_id")?,
            speaker_name: optional_string(&row[2], "speaker_name")?,
            user_id: optional_i64(&row[3], "user_id")?,
            user_full_name: optional_string(&row[4], "full_name")?,
        })
    }

    pub fn is_claimed(&self) -> bool {
        self.user_id.is_some()
    }

    /// The name shown for this speaker.
    pub fn display_name(&self) -> &str {
        if self.is_claimed()
            && let Some(full_name) = self.user_full_name.as_deref()
        {
            return full_name;
        }
        self.speaker_name.as_deref().unwrap_or_default()
    }
}
