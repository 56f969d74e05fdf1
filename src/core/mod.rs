pub mod error;
pub mod types;
pub mod value;

pub use error::{Result, StoreError};
pub use types::{EventId, Row, TalkId, TrackId, UserId};
pub use value::Value;
