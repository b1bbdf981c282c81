//! In-memory per-learner session registry with TTL eviction.
//!
//! The map itself sits behind a `parking_lot::RwLock` for cheap lookups;
//! each learner's slot is an `Arc<tokio::sync::Mutex<_>>` so concurrent
//! actions from the same learner serialize across the whole async pass
//! while different learners proceed in parallel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::info;

use crate::state::SessionState;

/// One learner's slot: the state plus its idle clock.
#[derive(Debug)]
pub struct RegistrySlot {
    pub state: SessionState,
    pub last_activity: Instant,
}

impl RegistrySlot {
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

pub type SlotHandle = Arc<tokio::sync::Mutex<RegistrySlot>>;

/// Registry of active sessions keyed by learner id. One active session per
/// learner; storing overwrites unconditionally.
pub struct SessionRegistry {
    slots: RwLock<FxHashMap<i64, SlotHandle>>,
    ttl: Duration,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: RwLock::new(FxHashMap::default()),
            ttl,
        }
    }

    /// Handle for a learner's slot, or `None` when absent or expired.
    /// An expired slot is evicted on the way out.
    #[must_use]
    pub fn get(&self, learner_id: i64) -> Option<SlotHandle> {
        let handle = self.slots.read().get(&learner_id).cloned()?;
        let expired = handle
            .try_lock()
            .map(|slot| slot.last_activity.elapsed() > self.ttl)
            .unwrap_or(false);
        if expired {
            self.evict(learner_id);
            return None;
        }
        Some(handle)
    }

    /// Handle regardless of expiry; used by callers that manage liveness
    /// themselves.
    #[must_use]
    pub fn get_raw(&self, learner_id: i64) -> Option<SlotHandle> {
        self.slots.read().get(&learner_id).cloned()
    }

    /// Install a fresh session for the learner, replacing any existing slot.
    /// Returns the new handle.
    pub fn put(&self, learner_id: i64, state: SessionState) -> SlotHandle {
        let handle = Arc::new(tokio::sync::Mutex::new(RegistrySlot {
            state,
            last_activity: Instant::now(),
        }));
        self.slots.write().insert(learner_id, Arc::clone(&handle));
        handle
    }

    /// Remove a learner's slot if present.
    pub fn evict(&self, learner_id: i64) -> bool {
        let removed = self.slots.write().remove(&learner_id).is_some();
        if removed {
            info!(learner_id, "session evicted");
        }
        removed
    }

    /// Drop every slot idle past the TTL. Slots currently locked by an
    /// in-flight pass count as active. Returns the eviction count.
    pub fn sweep_expired(&self) -> usize {
        let mut slots = self.slots.write();
        let before = slots.len();
        slots.retain(|_, handle| {
            handle
                .try_lock()
                .map(|slot| slot.last_activity.elapsed() <= self.ttl)
                .unwrap_or(true)
        });
        let evicted = before - slots.len();
        if evicted > 0 {
            info!(evicted, "expired sessions swept");
        }
        evicted
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }
}
