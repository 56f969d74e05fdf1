use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

use crate::core::{Result, TalkId};

/// Held for the duration of one locked talk operation.
pub type TalkGuard = OwnedMutexGuard<()>;

/// Per-talk mutual exclusion shared by several stores.
///
/// Serializes identifier derivation, speaker reconciliation and deletion for
/// the same talk id across tasks. Different talks never wait on each other.
/// Slots nobody holds or waits for are dropped on the next acquire.
#[derive(Debug, Default)]
pub struct TalkLocks {
    slots: Mutex<HashMap<TalkId, Arc<AsyncMutex<()>>>>,
}

impl TalkLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, talk_id: TalkId) -> Result<TalkGuard> {
        let slot = {
            let mut slots = self.slots.lock()?;
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots.entry(talk_id).or_default().clone()
        };

        trace!(talk_id, "waiting for talk lock");
        Ok(slot.lock_owned().await)
    }

    /// Number of talks with a live slot.
    pub fn tracked(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or_default()
    }
}
