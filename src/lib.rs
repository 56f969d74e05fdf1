// ============================================================================
// talkstore Library
// ============================================================================
//
// Data-access core for conference talks: collision-safe stub/slug
// derivation, speaker-set reconciliation that preserves user claims, and
// atomic cascading delete.
//
// ============================================================================

pub mod associations;
pub mod config;
pub mod connection;
pub mod core;
pub mod deletion;
pub mod facade;
pub mod identifiers;
pub mod interface;
pub mod model;
pub mod prelude;
pub mod result;
pub mod speakers;
#[cfg(feature = "testing")]
pub mod testing;

// Re-export main types for convenience
pub use config::{DuplicateRemoval, StoreConfig};
pub use core::{EventId, Result, StoreError, TalkId, TrackId, UserId, Value};
pub use facade::{TalkLocks, TalkStore};
pub use interface::DatabaseClient;
pub use result::{ExecResult, QueryResult};

// Re-export connection API
pub use connection::{MIGRATOR, SqliteClient, config::ConnectionConfig};

// Re-export the consistency components
pub use deletion::{CascadingDeleteCoordinator, DeleteOutcome, DeletePhase};
pub use identifiers::{IdentifierAssigner, TokenSource};
pub use speakers::{ReconcileReport, SpeakerReconciler};

/// Open an in-memory store with default settings.
///
/// # Examples
///
/// ```
/// use talkstore::{DatabaseClient, Value};
/// use talkstore::model::NewTalk;
///
/// # #[tokio::main]
/// # async fn main() -> talkstore::Result<()> {
/// let mut store = talkstore::open_in_memory().await?;
/// store
///     .client_mut()
///     .execute("INSERT INTO events (name) VALUES (?)", &[Value::from("RustConf")])
///     .await?;
///
/// let talk = store
///     .create_talk(NewTalk::new(1, "Zero-Cost Futures", chrono::Utc::now()))
///     .await?;
/// assert_eq!(talk.slug.as_deref(), Some("zero-cost-futures"));
/// # Ok(())
/// # }
/// ```
pub async fn open_in_memory() -> Result<TalkStore<SqliteClient>> {
    TalkStore::open(&ConnectionConfig::in_memory(), StoreConfig::default()).await
}
