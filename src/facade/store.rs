use std::sync::Arc;

use tracing::{debug, info};

use super::locks::{TalkGuard, TalkLocks};
use crate::associations;
use crate::config::StoreConfig;
use crate::connection::SqliteClient;
use crate::connection::config::ConnectionConfig;
use crate::core::{Result, StoreError, TalkId, TrackId, UserId, Value};
use crate::deletion::{CascadingDeleteCoordinator, DeleteOutcome};
use crate::identifiers::{IdentifierAssigner, TokenSource};
use crate::interface::DatabaseClient;
use crate::model::{LinkType, NewTalk, SpeakerAssociation, Talk, TalkLink, TrackAssociation};
use crate::speakers::{self, ReconcileReport, SpeakerReconciler};

const INSERT_TALK_SQL: &str = "INSERT INTO talks \
     (event_id, title, description, starts_at, duration_minutes) VALUES (?, ?, ?, ?, ?)";
const RENAME_TALK_SQL: &str = "UPDATE talks SET title = ?, slug = NULL WHERE id = ?";

/// Request-level entry point over one database connection.
///
/// Derived identifiers are filled in on create and on read whenever they are
/// missing. Without per-talk locking, concurrent stores working on the same
/// talk rely on the unique indexes alone; see [`TalkLocks`].
pub struct TalkStore<C: DatabaseClient> {
    client: C,
    config: StoreConfig,
    identifiers: IdentifierAssigner,
    speakers: SpeakerReconciler,
    deleter: CascadingDeleteCoordinator,
    locks: Option<Arc<TalkLocks>>,
}

impl TalkStore<SqliteClient> {
    /// Connect to SQLite and build a store on top of the connection
    pub async fn open(connection: &ConnectionConfig, config: StoreConfig) -> Result<Self> {
        let client = SqliteClient::connect(connection).await?;
        Self::new(client, config)
    }

    pub async fn close(self) -> Result<()> {
        self.client.close().await
    }
}

impl<C: DatabaseClient> TalkStore<C> {
    pub fn new(client: C, config: StoreConfig) -> Result<Self> {
        config.validate()?;

        let locks = config.per_talk_locking.then(|| Arc::new(TalkLocks::new()));

        Ok(Self {
            client,
            identifiers: IdentifierAssigner::new(&config),
            speakers: SpeakerReconciler::new(config.duplicate_removal),
            deleter: CascadingDeleteCoordinator::new(),
            locks,
            config,
        })
    }

    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.identifiers = self.identifiers.with_token_source(tokens);
        self
    }

    pub fn with_delete_coordinator(mut self, deleter: CascadingDeleteCoordinator) -> Self {
        self.deleter = deleter;
        self
    }

    /// Share a lock table with other stores. Enables per-talk locking.
    pub fn with_locks(mut self, locks: Arc<TalkLocks>) -> Self {
        self.locks = Some(locks);
        self
    }

    /// The lock table in use, for handing to another store.
    pub fn locks(&self) -> Option<Arc<TalkLocks>> {
        self.locks.clone()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn into_client(self) -> C {
        self.client
    }

    // ------------------------------------------------------------------
    // Talks
    // ------------------------------------------------------------------

    /// Insert a talk and derive its stub and slug.
    ///
    /// Identifier exhaustion does not fail the insert; the affected field is
    /// left unset and derived again on a later read.
    pub async fn create_talk(&mut self, talk: NewTalk) -> Result<Talk> {
        let done = self
            .client
            .execute(
                INSERT_TALK_SQL,
                &[
                    Value::Integer(talk.event_id),
                    Value::from(&talk.title),
                    Value::from(&talk.description),
                    Value::Timestamp(talk.starts_at),
                    Value::Integer(talk.duration_minutes),
                ],
            )
            .await?;

        let talk_id = done
            .last_insert_id()
            .ok_or_else(|| StoreError::Decode("talks insert returned no id".into()))?;
        info!(talk_id, event_id = talk.event_id, "talk created");

        self.derive_identifiers(talk_id)
            .await?
            .ok_or_else(|| StoreError::Decode(format!("talk {} vanished after insert", talk_id)))
    }

    /// Read a talk, deriving any identifier that is still unset.
    pub async fn get_talk(&mut self, talk_id: TalkId) -> Result<Option<Talk>> {
        match self.fetch_talk(talk_id).await? {
            Some(talk) if talk.needs_identifiers() => self.derive_identifiers(talk_id).await,
            other => Ok(other),
        }
    }

    /// Change the title. The slug is cleared and re-derived from the new title.
    pub async fn rename_talk(&mut self, talk_id: TalkId, title: &str) -> Result<Option<Talk>> {
        let done = self
            .client
            .execute(RENAME_TALK_SQL, &[Value::from(title), Value::Integer(talk_id)])
            .await?;

        if done.affected_rows() == 0 {
            return Ok(None);
        }

        debug!(talk_id, "talk renamed, slug cleared");
        self.derive_identifiers(talk_id).await
    }

    /// Atomically delete a talk and its dependent rows.
    pub async fn delete_talk(&mut self, talk_id: TalkId) -> Result<DeleteOutcome> {
        let _guard = lock_talk(self.locks.clone(), talk_id).await?;
        self.deleter.delete_talk(&mut self.client, talk_id).await
    }

    async fn fetch_talk(&mut self, talk_id: TalkId) -> Result<Option<Talk>> {
        let sql = format!("SELECT {} FROM talks WHERE id = ?", Talk::COLUMNS);
        let result = self.client.query(&sql, &[Value::Integer(talk_id)]).await?;

        result.rows().first().map(|row| Talk::from_row(row)).transpose()
    }

    // The row is re-read under the lock so a field set by another writer
    // in the meantime is not assigned twice.
    async fn derive_identifiers(&mut self, talk_id: TalkId) -> Result<Option<Talk>> {
        let _guard = lock_talk(self.locks.clone(), talk_id).await?;

        let Some(mut talk) = self.fetch_talk(talk_id).await? else {
            return Ok(None);
        };

        if talk.stub.is_none() {
            talk.stub = self.identifiers.assign_stub(&mut self.client, talk_id).await?;
        }
        if talk.slug.is_none() {
            talk.slug = self
                .identifiers
                .assign_slug(&mut self.client, &talk.title, talk_id)
                .await?;
        }

        Ok(Some(talk))
    }

    // ------------------------------------------------------------------
    // Speakers
    // ------------------------------------------------------------------

    /// Make the talk's speaker names equal to `names`.
    pub async fn set_speakers<S>(&mut self, talk_id: TalkId, names: &[S]) -> Result<ReconcileReport>
    where
        S: AsRef<str> + Sync,
    {
        let _guard = lock_talk(self.locks.clone(), talk_id).await?;
        self.speakers.reconcile(&mut self.client, talk_id, names).await
    }

    pub async fn list_speakers(&mut self, talk_id: TalkId) -> Result<Vec<SpeakerAssociation>> {
        speakers::list_speakers(&mut self.client, talk_id).await
    }

    pub async fn attach_user(&mut self, talk_id: TalkId, user_id: UserId) -> Result<Option<i64>> {
        let _guard = lock_talk(self.locks.clone(), talk_id).await?;
        speakers::attach_user(&mut self.client, talk_id, user_id).await
    }

    pub async fn claim_speaker(
        &mut self,
        talk_id: TalkId,
        speaker_id: i64,
        user_id: UserId,
    ) -> Result<bool> {
        let _guard = lock_talk(self.locks.clone(), talk_id).await?;
        speakers::claim_speaker(&mut self.client, talk_id, speaker_id, user_id).await
    }

    pub async fn unassign_speaker(&mut self, talk_id: TalkId, speaker_id: i64) -> Result<bool> {
        let _guard = lock_talk(self.locks.clone(), talk_id).await?;
        speakers::unassign_speaker(&mut self.client, talk_id, speaker_id).await
    }

    // ------------------------------------------------------------------
    // Tracks and links
    // ------------------------------------------------------------------

    pub async fn link_track(&mut self, talk_id: TalkId, track_id: TrackId) -> Result<i64> {
        associations::link_track(&mut self.client, talk_id, track_id).await
    }

    pub async fn unlink_track(&mut self, talk_id: TalkId, track_id: TrackId) -> Result<bool> {
        associations::unlink_track(&mut self.client, talk_id, track_id).await
    }

    pub async fn list_tracks(&mut self, talk_id: TalkId) -> Result<Vec<TrackAssociation>> {
        associations::list_tracks(&mut self.client, talk_id).await
    }

    pub async fn add_link(&mut self, talk_id: TalkId, link_type: &str, url: &str) -> Result<i64> {
        associations::add_link(&mut self.client, talk_id, link_type, url).await
    }

    pub async fn update_link(
        &mut self,
        talk_id: TalkId,
        link_id: i64,
        link_type: &str,
        url: &str,
    ) -> Result<bool> {
        associations::update_link(&mut self.client, talk_id, link_id, link_type, url).await
    }

    pub async fn remove_link(&mut self, talk_id: TalkId, link_id: i64) -> Result<bool> {
        associations::remove_link(&mut self.client, talk_id, link_id).await
    }

    pub async fn list_links(&mut self, talk_id: TalkId) -> Result<Vec<TalkLink>> {
        associations::list_links(&mut self.client, talk_id).await
    }

    pub async fn link_types(&mut self) -> Result<Vec<LinkType>> {
        associations::link_types(&mut self.client).await
    }
}

// Takes the lock table by value so the guard future holds no borrow of the store.
async fn lock_talk(locks: Option<Arc<TalkLocks>>, talk_id: TalkId) -> Result<Option<TalkGuard>> {
    match locks {
        Some(locks) => Ok(Some(locks.acquire(talk_id).await?)),
        None => Ok(None),
    }
}
