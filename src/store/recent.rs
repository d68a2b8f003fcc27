use tracing::warn;

use super::codec::{decode_ids, dedup_ids, encode_ids, ids_or_default};
use super::store::StorageStore;
use crate::listeners::Subscription;

/// How many recently used ids are kept unless configured otherwise.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Move `id` to the front of `ids`, dropping any earlier occurrence, and
/// keep at most `limit` entries. Ids pushed past the tail are dropped.
pub fn push_recent(ids: Vec<String>, id: &str, limit: usize) -> Vec<String> {
    let mut next = Vec::with_capacity(limit.min(ids.len() + 1));
    next.push(id.to_string());
    next.extend(ids.into_iter().filter(|existing| existing != id));
    next.truncate(limit);
    next
}

/// Most-recent-first list of ids with no duplicates and a bounded length.
///
/// Persisted as a JSON array of strings.
#[derive(Debug, Clone)]
pub struct RecencyList {
    store: StorageStore,
    limit: usize,
}

impl RecencyList {
    pub fn new(store: StorageStore, limit: usize) -> Self {
        Self { store, limit }
    }

    /// Record `id` as the most recently used.
    ///
    /// Re-adding the id already at the front still notifies subscribers.
    pub fn add_recent(&self, id: &str) {
        let limit = self.limit;
        let key = self.store.key().to_string();
        self.store.write(|raw| {
            let ids = decode_ids(raw).map(dedup_ids).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "overwriting unreadable recent list");
                Vec::new()
            });
            encode_ids(&push_recent(ids, id, limit))
        });
    }

    /// Ids ordered most-recent-first, at most `limit` of them.
    pub fn recent_ids(&self) -> Vec<String> {
        let snapshot = self.store.read();
        let mut ids = dedup_ids(ids_or_default(self.store.key(), snapshot.raw()));
        ids.truncate(self.limit);
        ids
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }

    /// The underlying slot store.
    pub fn store(&self) -> &StorageStore {
        &self.store
    }
}
