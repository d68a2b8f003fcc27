use std::fmt;
use std::sync::{Arc, Mutex, RwLock, Weak};

use tracing::{debug, warn};

use crate::host::{ChangeChannel, ChangeEvent, StorageBackend};
use crate::listeners::{Listeners, Subscription};
use crate::runtime::ExecutionContext;

/// The raw slot value handed to readers.
///
/// Snapshots are cheap to clone. A store hands out the same snapshot (see
/// [`Snapshot::same_as`]) until the underlying raw value actually changes,
/// so bindings can skip re-rendering by identity.
#[derive(Clone)]
pub struct Snapshot(Arc<Option<String>>);

impl Snapshot {
    fn new(raw: Option<String>) -> Self {
        Self(Arc::new(raw))
    }

    /// The raw slot contents, or `None` if the slot was never written.
    pub fn raw(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Whether both snapshots are the very same handle.
    pub fn same_as(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}

impl Eq for Snapshot {}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Snapshot").field(&self.raw()).finish()
    }
}

struct StoreInner {
    key: String,
    backend: Arc<dyn StorageBackend>,
    channel: Arc<dyn ChangeChannel>,
    // Last raw value handed out, None until first read.
    last: RwLock<Option<Snapshot>>,
    // Last raw value subscribers were notified about. Change events are
    // deduplicated against this, not against `last`, so a plain read can
    // never swallow a notification.
    delivered: RwLock<Option<Option<String>>>,
    // Value kept for the tab's lifetime after a failed persist.
    fallback: RwLock<Option<String>>,
    server_snapshot: Snapshot,
    subscribers: Listeners<()>,
    channel_guard: Mutex<Option<Subscription>>,
}

impl StoreInner {
    fn read_raw(&self) -> Option<String> {
        if let Some(value) = self
            .fallback
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            return Some(value);
        }
        match self.backend.get_item(&self.key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %self.key, error = %e, "slot unreadable, using default");
                None
            }
        }
    }

    /// Record `raw` as the last-known value. Returns the snapshot to hand out
    /// and whether it differs from the previous one.
    fn remember(&self, raw: Option<String>) -> (Snapshot, bool) {
        let mut last = self.last.write().unwrap_or_else(|e| e.into_inner());
        if let Some(snapshot) = last.as_ref() {
            if snapshot.raw() == raw.as_deref() {
                return (snapshot.clone(), false);
            }
        }
        let snapshot = Snapshot::new(raw);
        *last = Some(snapshot.clone());
        (snapshot, true)
    }

    /// Record `raw` as delivered to subscribers. Returns whether it differs
    /// from what they were last told about.
    fn deliver(&self, raw: Option<&str>) -> bool {
        let mut delivered = self.delivered.write().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = delivered.as_ref() {
            if previous.as_deref() == raw {
                return false;
            }
        }
        *delivered = Some(raw.map(str::to_string));
        true
    }

    fn emit(&self) {
        debug!(key = %self.key, subscribers = self.subscribers.len(), "emit");
        self.subscribers.notify(&());
    }

    fn on_external_change(&self, event: &ChangeEvent) {
        let raw = self.read_raw();
        let changed = self.deliver(raw.as_deref());
        self.remember(raw);
        if changed {
            self.emit();
        } else {
            debug!(key = %event.key, "ignoring change event with no new value");
        }
    }

    fn attach_channel(self: &Arc<Self>) {
        let mut guard = self.channel_guard.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_some() {
            return;
        }

        // Prime the delivered value so the first event can be deduplicated.
        if self
            .delivered
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
        {
            let raw = self.read_raw();
            self.deliver(raw.as_deref());
            self.remember(raw);
        }

        let weak: Weak<StoreInner> = Arc::downgrade(self);
        let key = self.key.clone();
        *guard = Some(self.channel.listen(Box::new(move |event: &ChangeEvent| {
            if event.key != key {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                inner.on_external_change(event);
            }
        })));
        debug!(key = %self.key, "listening for external changes");
    }

    fn detach_channel_if_idle(&self) {
        if !self.subscribers.is_empty() {
            return;
        }
        let released = self
            .channel_guard
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if released.is_some() {
            debug!(key = %self.key, "stopped listening for external changes");
        }
    }
}

/// Makes one persisted slot observable by many subscribers.
///
/// Reads go to the slot and come back as a [`Snapshot`] that keeps its
/// identity until the raw value changes. Writes re-read the slot, apply a
/// reducer, persist, and notify every subscriber before returning. Change
/// events from other contexts are deduplicated against the last value
/// subscribers were told about before they are notified again.
///
/// Nothing here fails: persistence errors degrade to an in-memory value
/// for the lifetime of the store.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use keepsake::host::Origin;
/// use keepsake::StorageStore;
///
/// let origin = Origin::new();
/// let tab = Arc::new(origin.open_tab());
/// let store = StorageStore::new("greeting", tab.clone(), tab);
///
/// store.write(|_| "hello".to_string());
/// assert_eq!(store.read().raw(), Some("hello"));
/// ```
#[derive(Clone)]
pub struct StorageStore {
    inner: Arc<StoreInner>,
}

impl StorageStore {
    /// Create a store over `key`, persisted in `backend`, listening for
    /// external changes on `channel`.
    pub fn new(
        key: impl Into<String>,
        backend: Arc<dyn StorageBackend>,
        channel: Arc<dyn ChangeChannel>,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                key: key.into(),
                backend,
                channel,
                last: RwLock::new(None),
                delivered: RwLock::new(None),
                fallback: RwLock::new(None),
                server_snapshot: Snapshot::new(None),
                subscribers: Listeners::new(),
                channel_guard: Mutex::new(None),
            }),
        }
    }

    /// The slot key this store owns.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Current snapshot of the slot.
    ///
    /// Inside [`ExecutionContext::server`] this returns a fixed empty
    /// snapshot and never touches the backend.
    pub fn read(&self) -> Snapshot {
        if ExecutionContext::current().is_server() {
            return self.inner.server_snapshot.clone();
        }
        let raw = self.inner.read_raw();
        self.inner.remember(raw).0
    }

    /// Register a callback run after every change to the slot.
    ///
    /// The first subscriber also starts listening on the change channel; the
    /// last one to leave stops it.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let subscription = self.inner.subscribers.add(move |_| callback());
        self.inner.attach_channel();

        let weak = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            drop(subscription);
            if let Some(inner) = weak.upgrade() {
                inner.detach_channel_if_idle();
            }
        })
    }

    /// Read-modify-write the slot.
    ///
    /// `reducer` receives the raw value read from the slot at this moment,
    /// never a caller's earlier snapshot. The result is persisted (or kept in
    /// memory if persisting fails) and all subscribers run before this
    /// returns.
    pub fn write<F>(&self, reducer: F) -> Snapshot
    where
        F: FnOnce(Option<&str>) -> String,
    {
        let current = self.inner.read_raw();
        let next = reducer(current.as_deref());

        match self.inner.backend.set_item(&self.inner.key, &next) {
            Ok(()) => {
                *self.inner.fallback.write().unwrap_or_else(|e| e.into_inner()) = None;
            }
            Err(e) => {
                warn!(
                    key = %self.inner.key,
                    error = %e,
                    "persistence unavailable, keeping value in memory"
                );
                *self.inner.fallback.write().unwrap_or_else(|e| e.into_inner()) =
                    Some(next.clone());
            }
        }

        self.inner.deliver(Some(&next));
        let (snapshot, _) = self.inner.remember(Some(next));
        self.emit();
        snapshot
    }

    /// Notify every subscriber once, in registration order.
    pub fn emit(&self) {
        self.inner.emit();
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// Whether writes are currently held only in memory.
    pub fn is_degraded(&self) -> bool {
        self.inner
            .fallback
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

impl fmt::Debug for StorageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageStore")
            .field("key", &self.inner.key)
            .field("subscribers", &self.inner.subscribers.len())
            .finish()
    }
}
