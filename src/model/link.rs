use serde::{Deserialize, Serialize};

use super::parse::{expect_columns, required_i64, required_string};
use crate::core::{Result, TalkId, Value};

/// A typed URL attached to a talk (slides, video, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TalkLink {
    pub id: i64,
    pub talk_id: TalkId,
    pub link_type: String,
    pub url: String,
}

impl TalkLink {
    pub(crate) const SELECT: &'static str = "SELECT l.id, l.talk_id, t.name, l.url \
         FROM talk_links l JOIN link_types t ON t.id = l.link_type_id";

    pub(crate) fn from_row(row: &[Value]) -> Result<Self> {
        expect_columns(row, 4, "talk_links")?;

        Ok(Self {
            id: required_i64(&row[0], "id")?,
            talk_id: required_i64(&row[1], "talk_id")?,
            link_type: required_string(&row[2], "link_type")?,
            url: required_string(&row[3], "url")?,
        })
    }
}

/// Entry of the fixed link-type vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkType {
    pub id: i64,
    pub name: String,
}

impl LinkType {
    pub(crate) fn from_row(row: &[Value]) -> Result<Self> {
        expect_columns(row, 2, "link_types")?;

        Ok(Self {
            id: required_i64(&row[0], "id")?,
            name: required_string(&row[1], "name")?,
        })
    }
}
