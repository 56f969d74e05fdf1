//! Everything a request handler usually needs.

pub use crate::config::{DuplicateRemoval, StoreConfig};
pub use crate::connection::SqliteClient;
pub use crate::connection::config::ConnectionConfig;
pub use crate::core::{Result, StoreError, Value};
pub use crate::deletion::{DeleteOutcome, DeletePhase};
pub use crate::facade::{TalkLocks, TalkStore};
pub use crate::interface::DatabaseClient;
pub use crate::model::{LinkType, NewTalk, SpeakerAssociation, Talk, TalkLink, TrackAssociation};
pub use crate::speakers::ReconcileReport;
