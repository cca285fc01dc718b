//! Bounded registry of live API sessions.
//!
//! Each store holds at most `capacity` sessions. Sessions untouched for
//! longer than the idle window are swept, and when the store is full the
//! least recently used one is evicted to make room.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

struct Slot<T> {
    session: Arc<T>,
    /// Milliseconds since the store's epoch.
    last_used: AtomicU64,
}

impl<T> Slot<T> {
    fn last_used(&self) -> u64 {
        self.last_used.load(Ordering::Relaxed)
    }
}

pub struct SessionStore<T> {
    kind: &'static str,
    capacity: usize,
    idle: Duration,
    epoch: Instant,
    slots: RwLock<HashMap<Uuid, Slot<T>>>,
}

impl<T> SessionStore<T> {
    pub fn new(kind: &'static str, capacity: usize, idle: Duration) -> Self {
        Self {
            kind,
            capacity: capacity.max(1),
            idle,
            epoch: Instant::now(),
            slots: RwLock::new(HashMap::new()),
        }
    }

    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn is_idle(&self, slot: &Slot<T>, now: u64) -> bool {
        let idle_ms = u64::try_from(self.idle.as_millis()).unwrap_or(u64::MAX);
        now.saturating_sub(slot.last_used()) >= idle_ms
    }

    /// Register a session, sweeping idle ones and evicting the least
    /// recently used when the store is full.
    pub async fn insert(&self, id: Uuid, session: Arc<T>) {
        let now = self.now_ms();
        let mut slots = self.slots.write().await;
        slots.retain(|_, slot| !self.is_idle(slot, now));

        if slots.len() >= self.capacity {
            let oldest = slots
                .iter()
                .min_by_key(|(_, slot)| slot.last_used())
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                slots.remove(&oldest);
                debug!(kind = self.kind, session = %oldest, "Evicted least recently used session");
            }
        }

        slots.insert(
            id,
            Slot {
                session,
                last_used: AtomicU64::new(now),
            },
        );
    }

    /// Look a session up and mark it as used. Idle sessions that have not
    /// been swept yet are treated as gone.
    pub async fn get(&self, id: Uuid) -> Option<Arc<T>> {
        let now = self.now_ms();
        let slots = self.slots.read().await;
        let slot = slots.get(&id)?;
        if self.is_idle(slot, now) {
            return None;
        }
        slot.last_used.store(now, Ordering::Relaxed);
        Some(slot.session.clone())
    }

    /// Drop a session. Returns false when it was not registered.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.slots.write().await.remove(&id).is_some()
    }

    /// Flush idle sessions to free memory. Returns how many were dropped.
    pub async fn cleanup(&self) -> usize {
        let now = self.now_ms();
        let mut slots = self.slots.write().await;
        let before = slots.len();
        slots.retain(|_, slot| !self.is_idle(slot, now));
        let dropped = before - slots.len();
        if dropped > 0 {
            debug!(kind = self.kind, dropped, "Dropped idle sessions");
        }
        dropped
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }
}
