use tracing::warn;

use super::codec::{decode_ids, dedup_ids, encode_ids, ids_or_default};
use super::store::StorageStore;
use crate::listeners::Subscription;

/// Add `id` if absent, remove it if present. Applying it twice gives back
/// the original set.
pub fn toggle_id(mut ids: Vec<String>, id: &str) -> Vec<String> {
    let before = ids.len();
    ids.retain(|existing| existing != id);
    if ids.len() == before {
        ids.push(id.to_string());
    }
    ids
}

/// A set of favorited ids, persisted as a JSON array.
#[derive(Debug, Clone)]
pub struct FavoriteSet {
    store: StorageStore,
}

impl FavoriteSet {
    pub fn new(store: StorageStore) -> Self {
        Self { store }
    }

    /// Flip membership of `id`. Returns whether it is a favorite afterwards.
    pub fn toggle_favorite(&self, id: &str) -> bool {
        let key = self.store.key().to_string();
        let mut now_favorite = false;
        self.store.write(|raw| {
            let ids = decode_ids(raw).map(dedup_ids).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "overwriting unreadable favorites");
                Vec::new()
            });
            let next = toggle_id(ids, id);
            now_favorite = next.iter().any(|existing| existing == id);
            encode_ids(&next)
        });
        now_favorite
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorite_ids().iter().any(|existing| existing == id)
    }

    /// Favorited ids in the order they were added.
    pub fn favorite_ids(&self) -> Vec<String> {
        let snapshot = self.store.read();
        dedup_ids(ids_or_default(self.store.key(), snapshot.raw()))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Origin;
    use std::sync::Arc;

    fn favorites_on(origin: &Origin) -> FavoriteSet {
        let tab = Arc::new(origin.open_tab());
        FavoriteSet::new(StorageStore::new("favorite-tools", tab.clone(), tab))
    }

    #[test]
    fn toggle_is_an_involution() {
        let ids: Vec<String> = vec!["a", "b"].into_iter().map(String::from).collect();
        let once = toggle_id(ids.clone(), "c");
        assert_eq!(once, vec!["a", "b", "c"]);
        assert_eq!(toggle_id(once, "c"), ids);
    }

    #[test]
    fn toggle_on_then_off() {
        let origin = Origin::new();
        let favorites = favorites_on(&origin);

        assert!(favorites.toggle_favorite("emi-calculator"));
        assert!(favorites.is_favorite("emi-calculator"));
        assert!(favorites.is_favorite("emi-calculator"));

        assert!(!favorites.toggle_favorite("emi-calculator"));
        assert!(!favorites.is_favorite("emi-calculator"));
        assert_eq!(origin.get("favorite-tools").as_deref(), Some("[]"));
    }

    #[test]
    fn toggle_twice_restores_prior_set() {
        let origin = Origin::new();
        let favorites = favorites_on(&origin);
        favorites.toggle_favorite("a");
        favorites.toggle_favorite("b");
        let before = favorites.favorite_ids();

        favorites.toggle_favorite("c");
        favorites.toggle_favorite("c");
        assert_eq!(favorites.favorite_ids(), before);
    }

    #[test]
    fn duplicates_in_slot_collapse() {
        let origin = Origin::new();
        origin.set_external("favorite-tools", r#"["a","a","b"]"#);
        let favorites = favorites_on(&origin);

        assert_eq!(favorites.favorite_ids(), vec!["a", "b"]);
        assert!(!favorites.toggle_favorite("a"));
        assert_eq!(favorites.favorite_ids(), vec!["b"]);
    }

    #[test]
    fn malformed_slot_reads_empty() {
        let origin = Origin::new();
        origin.set_external("favorite-tools", "42");
        let favorites = favorites_on(&origin);
        assert!(!favorites.is_favorite("a"));
        assert!(favorites.toggle_favorite("a"));
        assert_eq!(origin.get("favorite-tools").as_deref(), Some(r#"["a"]"#));
    }
}
