//! Durable list of punch intents waiting for the server.
//!
//! The whole list is stored as one JSON blob under [`QUEUE_KEY`]. Every
//! mutation builds the new list, writes it, and only then replaces the
//! in-memory copy, so a failed or interrupted write never shows up as a
//! half-applied change.

use crate::errors::{AppError, AppResult};
use crate::models::intent::PunchIntent;
use crate::store::kv::KeyValueStore;
use std::sync::{Arc, Mutex, MutexGuard};

pub const QUEUE_KEY: &str = "punch_queue";

pub struct PunchQueue {
    store: Box<dyn KeyValueStore>,
    entries: Vec<PunchIntent>,
}

/// Queue handle shared by the punch client and the sync engine.
pub type SharedQueue = Arc<Mutex<PunchQueue>>;

impl PunchQueue {
    /// Rebuild the queue from the store; a missing key means a first run.
    pub fn load(store: Box<dyn KeyValueStore>) -> AppResult<Self> {
        let entries = match store.get(QUEUE_KEY)? {
            Some(blob) => serde_json::from_str(&blob)?,
            None => Vec::new(),
        };
        log::debug!("punch queue loaded with {} entries", entries.len());
        Ok(Self { store, entries })
    }

    pub fn into_shared(self) -> SharedQueue {
        Arc::new(Mutex::new(self))
    }

    fn persist(&mut self, next: Vec<PunchIntent>) -> AppResult<()> {
        let blob = serde_json::to_string(&next).map_err(|e| AppError::Persistence(e.to_string()))?;
        self.store.put(QUEUE_KEY, &blob).map_err(|e| match e {
            AppError::Persistence(_) => e,
            other => AppError::Persistence(other.to_string()),
        })?;
        self.entries = next;
        Ok(())
    }

    /// Replace any pending intent for the same worker and kind, then append.
    pub fn enqueue(&mut self, intent: PunchIntent) -> AppResult<()> {
        let mut next: Vec<PunchIntent> = self
            .entries
            .iter()
            .filter(|e| !e.same_slot(&intent))
            .cloned()
            .collect();
        next.push(intent);
        self.persist(next)
    }

    /// Snapshot of the pending intents; nothing is removed.
    pub fn drain(&self) -> Vec<PunchIntent> {
        self.entries.clone()
    }

    /// Drop an intent after the server accepted it.
    ///
    /// Only an identical entry is removed: if a newer intent took the slot
    /// while the old one was in flight, the newer one stays queued.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, intent: &PunchIntent) -> AppResult<bool> {
        if !self.entries.contains(intent) {
            return Ok(false);
        }
        let next = self
            .entries
            .iter()
            .filter(|e| *e != intent)
            .cloned()
            .collect();
        self.persist(next)?;
        Ok(true)
    }

    /// Manual clear; returns how many intents were discarded.
    pub fn clear(&mut self) -> AppResult<usize> {
        let dropped = self.entries.len();
        self.persist(Vec::new())?;
        Ok(dropped)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lock the shared queue, mapping a poisoned lock to an error.
pub fn lock_queue(queue: &SharedQueue) -> AppResult<MutexGuard<'_, PunchQueue>> {
    queue
        .lock()
        .map_err(|_| AppError::Other("punch queue lock poisoned".into()))
}
