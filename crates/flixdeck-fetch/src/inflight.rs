//! The in-flight table: canonical request key to shared result handle.
//!
//! Entry lifecycle: inserted before the network call settles, removed as
//! soon as that call fails, and otherwise kept. With no TTL configured the
//! table grows by one entry per distinct successful URL for the lifetime of
//! the client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;

use flixdeck_core::Result;

/// Cloneable handle to one request's decoded body.
pub type SharedResponse = Shared<BoxFuture<'static, Result<Arc<Value>>>>;

struct Slot {
    generation: u64,
    inserted_at: Instant,
    handle: SharedResponse,
}

/// Outcome of [`InflightTable::join_or_start`].
pub enum Lookup {
    /// Another caller already owns a request for this key.
    Joined(SharedResponse),
    /// This caller started a new request.
    Started(SharedResponse),
}

impl Lookup {
    pub fn into_handle(self) -> SharedResponse {
        match self {
            Lookup::Joined(handle) | Lookup::Started(handle) => handle,
        }
    }
}

pub struct InflightTable {
    slots: DashMap<String, Slot>,
    next_generation: AtomicU64,
    ttl: Option<Duration>,
}

impl InflightTable {
    /// `ttl` bounds how long a successful response is reused.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            slots: DashMap::new(),
            next_generation: AtomicU64::new(1),
            ttl,
        }
    }

    /// Return the handle stored under `key`, or call `start` with a fresh
    /// generation number and store what it returns.
    ///
    /// Lookup and insertion happen under one shard lock, so concurrent
    /// callers for the same key always agree on a single handle.
    pub fn join_or_start<F>(&self, key: &str, start: F) -> Lookup
    where
        F: FnOnce(u64) -> SharedResponse,
    {
        match self.slots.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                if !self.is_expired(occupied.get()) {
                    return Lookup::Joined(occupied.get().handle.clone());
                }
                let slot = self.new_slot(start);
                let handle = slot.handle.clone();
                occupied.insert(slot);
                Lookup::Started(handle)
            }
            Entry::Vacant(vacant) => {
                let slot = self.new_slot(start);
                let handle = slot.handle.clone();
                vacant.insert(slot);
                Lookup::Started(handle)
            }
        }
    }

    /// Drop the entry for `key` if it still belongs to `generation`.
    pub fn remove_failed(&self, key: &str, generation: u64) -> bool {
        self.slots
            .remove_if(key, |_, slot| slot.generation == generation)
            .is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Forget every entry. Requests still running keep their waiters.
    pub fn clear(&self) {
        self.slots.clear();
    }

    fn new_slot<F>(&self, start: F) -> Slot
    where
        F: FnOnce(u64) -> SharedResponse,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        Slot {
            generation,
            inserted_at: Instant::now(),
            handle: start(generation),
        }
    }

    // Only settled successes expire; pending entries are always joined.
    fn is_expired(&self, slot: &Slot) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        matches!(slot.handle.peek(), Some(Ok(_))) && slot.inserted_at.elapsed() >= ttl
    }
}
