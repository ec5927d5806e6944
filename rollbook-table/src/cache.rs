//! Row-set cache keyed by source key, with invalidation broadcast.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rollbook_common::Record;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::filter::QueryParams;

const EVENT_BUFFER: usize = 64;

/// Identifies a dataset for caching and invalidation, e.g. `"class-groups"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceKey(String);

impl SourceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for SourceKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Broadcast to subscribers when a key changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// The key's rows are out of date; the next render refetches.
    Invalidated(SourceKey),
    /// A fetch stored new rows for the key.
    Updated(SourceKey),
}

impl CacheEvent {
    pub fn key(&self) -> &SourceKey {
        match self {
            CacheEvent::Invalidated(key) | CacheEvent::Updated(key) => key,
        }
    }
}

/// Issued when a fetch starts and handed back when it stores its rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    seq: u64,
}

#[derive(Debug)]
struct Entry {
    rows: Vec<Record>,
    params: QueryParams,
    stale: bool,
    seq: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<SourceKey, Entry>,
    generations: HashMap<SourceKey, u64>,
    next_seq: u64,
}

impl CacheState {
    fn generation(&self, key: &SourceKey) -> u64 {
        self.generations.get(key).copied().unwrap_or_default()
    }
}

/// Shared cache of fetched row sets.
///
/// Cloning is cheap; clones share entries and subscribers. A fetch started
/// before an invalidation of its key still stores its rows, but the entry
/// stays stale so the next render fetches again.
#[derive(Debug, Clone)]
pub struct QueryCache {
    state: Arc<Mutex<CacheState>>,
    events: broadcast::Sender<CacheEvent>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            events,
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: CacheEvent) {
        if self.events.send(event).is_err() {
            trace!("no cache subscribers");
        }
    }

    /// Receive every invalidation and update from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Cached rows for `key` if they are fresh and were fetched with `params`.
    pub fn fresh(&self, key: &SourceKey, params: &QueryParams) -> Option<Vec<Record>> {
        self.state()
            .entries
            .get(key)
            .filter(|e| !e.stale && e.params == *params)
            .map(|e| e.rows.clone())
    }

    /// The most recently stored rows for `key`, fresh or not.
    pub fn rows(&self, key: &SourceKey) -> Option<Vec<Record>> {
        self.state().entries.get(key).map(|e| e.rows.clone())
    }

    /// True when `key` has no entry or its entry is stale.
    pub fn is_stale(&self, key: &SourceKey) -> bool {
        self.state().entries.get(key).is_none_or(|e| e.stale)
    }

    pub fn begin_fetch(&self, key: &SourceKey) -> FetchTicket {
        let mut state = self.state();
        state.next_seq += 1;
        FetchTicket {
            generation: state.generation(key),
            seq: state.next_seq,
        }
    }

    /// Store the rows of a finished fetch.
    ///
    /// Rows from a fetch older than the one already stored are dropped.
    /// Returns whether the entry is now fresh.
    pub fn store(
        &self,
        key: &SourceKey,
        ticket: FetchTicket,
        params: QueryParams,
        rows: Vec<Record>,
    ) -> bool {
        let fresh = {
            let mut state = self.state();
            if state.entries.get(key).is_some_and(|e| e.seq > ticket.seq) {
                debug!(%key, "dropping rows from an older fetch");
                return false;
            }
            let fresh = state.generation(key) == ticket.generation;
            state.entries.insert(
                key.clone(),
                Entry {
                    rows,
                    params,
                    stale: !fresh,
                    seq: ticket.seq,
                },
            );
            fresh
        };
        if !fresh {
            debug!(%key, "key invalidated during fetch, entry stays stale");
        }
        self.publish(CacheEvent::Updated(key.clone()));
        fresh
    }

    /// Mark `key` stale and notify subscribers.
    pub fn invalidate(&self, key: &SourceKey) {
        {
            let mut state = self.state();
            *state.generations.entry(key.clone()).or_default() += 1;
            if let Some(entry) = state.entries.get_mut(key) {
                entry.stale = true;
            }
        }
        debug!(%key, "invalidated");
        self.publish(CacheEvent::Invalidated(key.clone()));
    }

    pub fn invalidate_all(&self) {
        let keys: Vec<SourceKey> = self.state().entries.keys().cloned().collect();
        for key in &keys {
            self.invalidate(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> SourceKey {
        SourceKey::from("class-groups")
    }

    #[test]
    fn store_then_fresh() {
        let cache = QueryCache::new();
        let params = QueryParams::default();
        assert!(cache.is_stale(&key()));

        let ticket = cache.begin_fetch(&key());
        assert!(cache.store(&key(), ticket, params.clone(), vec![json!({"id": 1})]));
        assert_eq!(cache.fresh(&key(), &params), Some(vec![json!({"id": 1})]));
        assert!(cache.fresh(&key(), &QueryParams::default().sorted_by("id", Default::default())).is_none());
    }

    #[test]
    fn invalidation_during_fetch_keeps_entry_stale() {
        let cache = QueryCache::new();
        let params = QueryParams::default();

        let ticket = cache.begin_fetch(&key());
        cache.invalidate(&key());
        assert!(!cache.store(&key(), ticket, params.clone(), vec![json!({"id": 1})]));

        assert!(cache.fresh(&key(), &params).is_none());
        assert_eq!(cache.rows(&key()), Some(vec![json!({"id": 1})]));
    }

    #[test]
    fn older_fetch_does_not_overwrite_newer() {
        let cache = QueryCache::new();
        let params = QueryParams::default();
        let slow = cache.begin_fetch(&key());
        let fast = cache.begin_fetch(&key());

        cache.store(&key(), fast, params.clone(), vec![json!({"id": 2})]);
        assert!(!cache.store(&key(), slow, params, vec![json!({"id": 1})]));
        assert_eq!(cache.rows(&key()), Some(vec![json!({"id": 2})]));
    }

    #[tokio::test]
    async fn subscribers_see_invalidations() {
        let cache = QueryCache::new();
        let mut events = cache.clone().subscribe();
        cache.invalidate(&key());
        assert_eq!(events.recv().await.unwrap(), CacheEvent::Invalidated(key()));
    }

    #[test]
    fn invalidate_all_marks_every_entry() {
        let cache = QueryCache::new();
        for name in ["a", "b"] {
            let k = SourceKey::from(name);
            let t = cache.begin_fetch(&k);
            cache.store(&k, t, QueryParams::default(), vec![]);
        }
        cache.invalidate_all();
        assert!(cache.is_stale(&SourceKey::from("a")));
        assert!(cache.is_stale(&SourceKey::from("b")));
    }
}
