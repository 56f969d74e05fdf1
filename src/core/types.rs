use super::Value;

pub type Row = Vec<Value>;

pub type TalkId = i64;
pub type EventId = i64;
pub type UserId = i64;
pub type TrackId = i64;
