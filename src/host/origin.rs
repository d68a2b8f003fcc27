use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use super::backend::{ChangeChannel, ChangeEvent, StorageBackend};
use crate::error::StorageError;
use crate::listeners::{Listeners, Subscription};

struct OriginInner {
    items: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
    next_tab: AtomicU64,
    tabs: Mutex<Vec<(u64, Weak<TabShared>)>>,
}

impl OriginInner {
    fn live_tabs(&self) -> Vec<(u64, Arc<TabShared>)> {
        let mut tabs = self.tabs.lock().unwrap_or_else(|e| e.into_inner());
        tabs.retain(|(_, tab)| tab.strong_count() > 0);
        tabs.iter()
            .filter_map(|(id, tab)| tab.upgrade().map(|tab| (*id, tab)))
            .collect()
    }

    fn used_bytes_with(items: &BTreeMap<String, String>, key: &str, value: &str) -> usize {
        items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }
}

/// An in-process stand-in for one site origin's storage, shared by any
/// number of [`Tab`]s.
///
/// Writes from one tab are queued as [`ChangeEvent`]s for every other open
/// tab and delivered when that tab calls [`Tab::dispatch_pending`], the way a
/// browser delivers `storage` events on a later task.
///
/// # Examples
///
/// ```
/// use keepsake::host::{Origin, StorageBackend};
///
/// let origin = Origin::new();
/// let a = origin.open_tab();
/// let b = origin.open_tab();
///
/// a.set_item("theme", "dark").unwrap();
/// assert_eq!(b.get_item("theme").unwrap().as_deref(), Some("dark"));
/// assert_eq!(b.pending(), 1);
/// assert_eq!(a.pending(), 0);
/// ```
#[derive(Clone)]
pub struct Origin {
    inner: Arc<OriginInner>,
}

impl Origin {
    /// Create an empty origin with no quota.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create an empty origin that rejects writes once the summed length of
    /// all keys and values would exceed `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self::build(Some(bytes))
    }

    fn build(quota: Option<usize>) -> Self {
        Self {
            inner: Arc::new(OriginInner {
                items: Mutex::new(BTreeMap::new()),
                quota,
                next_tab: AtomicU64::new(0),
                tabs: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Open a new tab on this origin.
    pub fn open_tab(&self) -> Tab {
        let id = self.inner.next_tab.fetch_add(1, Ordering::SeqCst);
        let shared = Arc::new(TabShared {
            pending: Mutex::new(VecDeque::new()),
            listeners: Listeners::new(),
            enabled: AtomicBool::new(true),
        });
        self.inner
            .tabs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::downgrade(&shared)));
        debug!(tab = id, "opened tab");

        Tab {
            id,
            origin: Arc::clone(&self.inner),
            shared,
        }
    }

    /// Raw value of a slot, bypassing any tab.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner
            .items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Write a slot from outside every open tab (another window, devtools).
    /// All open tabs receive the change event.
    pub fn set_external(&self, key: &str, value: &str) {
        self.inner
            .items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
        self.broadcast_to_all(ChangeEvent::new(key, Some(value.to_string())));
    }

    /// Queue `event` on every open tab, including whichever tab caused it.
    /// Simulates a host that does not exclude the originating context.
    pub fn broadcast_to_all(&self, event: ChangeEvent) {
        for (_, tab) in self.inner.live_tabs() {
            tab.enqueue(event.clone());
        }
    }

    /// Number of tabs still open.
    pub fn tab_count(&self) -> usize {
        self.inner.live_tabs().len()
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::new()
    }
}

struct TabShared {
    pending: Mutex<VecDeque<ChangeEvent>>,
    listeners: Listeners<ChangeEvent>,
    enabled: AtomicBool,
}

impl TabShared {
    fn enqueue(&self, event: ChangeEvent) {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(event);
    }
}

/// One browsing context on an [`Origin`]. Acts as both the storage backend
/// and the change channel for the stores created in it.
#[derive(Clone)]
pub struct Tab {
    id: u64,
    origin: Arc<OriginInner>,
    shared: Arc<TabShared>,
}

impl Tab {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Enable or disable storage for this tab (private browsing, blocked
    /// cookies). While disabled every read and write fails.
    pub fn set_storage_enabled(&self, enabled: bool) {
        self.shared.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Number of change events waiting to be delivered.
    pub fn pending(&self) -> usize {
        self.shared
            .pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Deliver every queued change event to this tab's listeners, in the
    /// order the writes happened. Returns how many were delivered.
    pub fn dispatch_pending(&self) -> usize {
        let mut delivered = 0;
        loop {
            let event = self
                .shared
                .pending
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front();
            let Some(event) = event else {
                break;
            };
            debug!(tab = self.id, key = %event.key, "dispatching change event");
            self.shared.listeners.notify(&event);
            delivered += 1;
        }
        delivered
    }

    fn check_enabled(&self) -> Result<(), StorageError> {
        if self.shared.enabled.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StorageError::unavailable("storage is disabled in this tab"))
        }
    }
}

impl StorageBackend for Tab {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_enabled()?;
        Ok(self
            .origin
            .items
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_enabled()?;

        let previous = {
            let mut items = self.origin.items.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(limit) = self.origin.quota {
                let needed = OriginInner::used_bytes_with(&items, key, value);
                if needed > limit {
                    return Err(StorageError::QuotaExceeded {
                        key: key.to_string(),
                        needed,
                        limit,
                    });
                }
            }
            items.insert(key.to_string(), value.to_string())
        };

        // Browsers only fire change events when the value really changed.
        if previous.as_deref() != Some(value) {
            let event = ChangeEvent::new(key, Some(value.to_string()));
            for (id, tab) in self.origin.live_tabs() {
                if id != self.id {
                    tab.enqueue(event.clone());
                }
            }
        }
        Ok(())
    }
}

impl ChangeChannel for Tab {
    fn listen(&self, listener: Box<dyn Fn(&ChangeEvent) + Send + Sync>) -> Subscription {
        self.shared.listeners.add(move |event| listener(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn writes_are_shared_across_tabs() {
        let origin = Origin::new();
        let a = origin.open_tab();
        let b = origin.open_tab();

        a.set_item("k", "v").unwrap();
        assert_eq!(b.get_item("k").unwrap().as_deref(), Some("v"));
        assert_eq!(origin.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn events_skip_the_writing_tab() {
        let origin = Origin::new();
        let a = origin.open_tab();
        let b = origin.open_tab();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let _guard = {
            let seen = seen.clone();
            b.listen(Box::new(move |event: &ChangeEvent| {
                seen.lock().unwrap().push(event.clone())
            }))
        };

        a.set_item("k", "1").unwrap();
        a.set_item("k", "2").unwrap();

        assert_eq!(a.dispatch_pending(), 0);
        assert!(seen.lock().unwrap().is_empty());

        assert_eq!(b.dispatch_pending(), 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                ChangeEvent::new("k", Some("1".to_string())),
                ChangeEvent::new("k", Some("2".to_string())),
            ]
        );
    }

    #[test]
    fn unchanged_write_fires_no_event() {
        let origin = Origin::new();
        let a = origin.open_tab();
        let b = origin.open_tab();

        a.set_item("k", "same").unwrap();
        b.dispatch_pending();
        a.set_item("k", "same").unwrap();
        assert_eq!(b.pending(), 0);
    }

    #[test]
    fn disabled_tab_fails_reads_and_writes() {
        let origin = Origin::new();
        let tab = origin.open_tab();
        tab.set_storage_enabled(false);

        assert!(matches!(
            tab.get_item("k"),
            Err(StorageError::Unavailable { .. })
        ));
        assert!(matches!(
            tab.set_item("k", "v"),
            Err(StorageError::Unavailable { .. })
        ));
        assert_eq!(origin.get("k"), None);
    }

    #[test]
    fn quota_rejects_oversized_write() {
        let origin = Origin::with_quota(8);
        let tab = origin.open_tab();

        tab.set_item("k", "1234").unwrap();
        let err = tab.set_item("k", "12345678").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 9, limit: 8, .. }));
        assert_eq!(origin.get("k").as_deref(), Some("1234"));
    }

    #[test]
    fn closed_tabs_are_forgotten() {
        let origin = Origin::new();
        let a = origin.open_tab();
        {
            let _b = origin.open_tab();
            assert_eq!(origin.tab_count(), 2);
        }
        assert_eq!(origin.tab_count(), 1);
        a.set_item("k", "v").unwrap();
    }

    #[test]
    fn external_writes_reach_every_tab() {
        let origin = Origin::new();
        let a = origin.open_tab();
        let calls = Arc::new(AtomicUsize::new(0));
        let _guard = {
            let calls = calls.clone();
            a.listen(Box::new(move |_: &ChangeEvent| {
                calls.fetch_add(1, Ordering::SeqCst);
            }))
        };

        origin.set_external("theme", "light");
        a.dispatch_pending();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.get_item("theme").unwrap().as_deref(), Some("light"));
    }
}
