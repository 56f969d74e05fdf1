//! Collision-safe stub and slug assignment
//!
//! Both identifiers are guarded by unique indexes (`stub` globally,
//! `(event_id, slug)` per event). A write that hits the index is retried with
//! a new candidate up to a fixed bound; running out of candidates leaves the
//! column NULL and returns `Ok(None)` instead of failing the surrounding
//! request. Any other storage error is returned as-is.
//!
//! Callers only invoke assignment while the column is still unset; the
//! assigner itself does not re-check.

mod slug;
mod token;

pub use slug::{FALLBACK_SLUG, slugify, with_id_suffix};
pub use token::{ScriptedTokenSource, TokenSource, UuidTokenSource};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::core::{Result, TalkId, Value};
use crate::interface::DatabaseClient;

const SET_STUB_SQL: &str = "UPDATE talks SET stub = ? WHERE id = ?";
const SET_SLUG_SQL: &str = "UPDATE talks SET slug = ? WHERE id = ?";

/// Slug candidates tried before giving up: the plain title, then title + id.
pub const SLUG_ATTEMPTS: usize = 2;

enum WriteOutcome {
    Written,
    TalkMissing,
}

pub struct IdentifierAssigner {
    tokens: Arc<dyn TokenSource>,
    stub_length: usize,
    max_stub_attempts: usize,
}

impl IdentifierAssigner {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            tokens: Arc::new(UuidTokenSource),
            stub_length: config.stub_length,
            max_stub_attempts: config.max_stub_attempts,
        }
    }

    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn max_stub_attempts(&self) -> usize {
        self.max_stub_attempts
    }

    /// Generate and persist a stub for `talk_id`.
    ///
    /// Returns `Ok(None)` when every attempt collided or the talk row is gone.
    pub async fn assign_stub<C>(&self, client: &mut C, talk_id: TalkId) -> Result<Option<String>>
    where
        C: DatabaseClient + ?Sized,
    {
        for attempt in 1..=self.max_stub_attempts {
            let candidate = self.tokens.next_token(self.stub_length);

            match write_identifier(client, SET_STUB_SQL, &candidate, talk_id).await {
                Ok(WriteOutcome::Written) => {
                    info!(talk_id, attempt, stub = %candidate, "stub assigned");
                    return Ok(Some(candidate));
                }
                Ok(WriteOutcome::TalkMissing) => {
                    warn!(talk_id, "talk not found while assigning stub");
                    return Ok(None);
                }
                Err(err) if err.is_constraint_violation() => {
                    debug!(talk_id, attempt, stub = %candidate, "stub collided, regenerating");
                }
                Err(err) => return Err(err),
            }
        }

        warn!(
            talk_id,
            attempts = self.max_stub_attempts,
            "stub generation exhausted, leaving stub unset"
        );
        Ok(None)
    }

    /// Derive and persist a slug for `talk_id` from `title`.
    ///
    /// Exactly two writes at most: the slugified title, then the same slug
    /// suffixed with the talk id. Returns `Ok(None)` if both collide.
    pub async fn assign_slug<C>(
        &self,
        client: &mut C,
        title: &str,
        talk_id: TalkId,
    ) -> Result<Option<String>>
    where
        C: DatabaseClient + ?Sized,
    {
        let base = slugify(title);
        let suffixed = with_id_suffix(&base, talk_id);

        for (attempt, candidate) in [base, suffixed].into_iter().enumerate() {
            let attempt = attempt + 1;

            match write_identifier(client, SET_SLUG_SQL, &candidate, talk_id).await {
                Ok(WriteOutcome::Written) => {
                    info!(talk_id, attempt, slug = %candidate, "slug assigned");
                    return Ok(Some(candidate));
                }
                Ok(WriteOutcome::TalkMissing) => {
                    warn!(talk_id, "talk not found while assigning slug");
                    return Ok(None);
                }
                Err(err) if err.is_constraint_violation() => {
                    debug!(talk_id, attempt, slug = %candidate, "slug collided");
                }
                Err(err) => return Err(err),
            }
        }

        warn!(talk_id, attempts = SLUG_ATTEMPTS, "slug candidates exhausted, leaving slug unset");
        Ok(None)
    }
}

async fn write_identifier<C>(
    client: &mut C,
    sql: &str,
    candidate: &str,
    talk_id: TalkId,
) -> Result<WriteOutcome>
where
    C: DatabaseClient + ?Sized,
{
    let done = client
        .execute(sql, &[Value::from(candidate), Value::Integer(talk_id)])
        .await?;

    if done.affected_rows() == 0 {
        Ok(WriteOutcome::TalkMissing)
    } else {
        Ok(WriteOutcome::Written)
    }
}
