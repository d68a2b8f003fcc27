use std::sync::{Arc, Mutex, Weak};

use tracing::debug;

use super::applier::ThemeApplier;
use super::preference::ThemePreference;
use crate::listeners::Subscription;
use crate::signal::Signal;
use crate::store::StorageStore;

struct ThemeInner {
    store: StorageStore,
    prefers_dark: Signal<bool>,
    applier: Arc<dyn ThemeApplier>,
    // Last value handed to the applier.
    applied: Mutex<Option<bool>>,
}

impl ThemeInner {
    fn preference(&self) -> ThemePreference {
        ThemePreference::from_raw(self.store.read().raw())
    }

    fn is_dark(&self) -> bool {
        self.preference().resolve(self.prefers_dark.get())
    }

    /// Apply the resolved theme if it differs from what was last applied.
    fn sync(&self) {
        let dark = self.is_dark();
        {
            let mut applied = self.applied.lock().unwrap_or_else(|e| e.into_inner());
            if *applied == Some(dark) {
                return;
            }
            *applied = Some(dark);
        }
        debug!(dark, "applying theme");
        self.applier.apply(dark);
    }
}

/// Persisted theme preference with a derived dark/light state.
///
/// The applier runs once when the store is created and then exactly once
/// each time [`ThemeStore::is_dark`] changes, whether because the
/// preference changed (here or in another tab) or because the OS color
/// scheme flipped while the preference is `System`.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use keepsake::host::Origin;
/// use keepsake::theme::{RootElement, ThemePreference, ThemeStore};
/// use keepsake::{Signal, StorageStore};
///
/// let tab = Arc::new(Origin::new().open_tab());
/// let os_dark = Signal::new(true);
/// let root = Arc::new(RootElement::default());
/// let theme = ThemeStore::new(
///     StorageStore::new("theme", tab.clone(), tab),
///     os_dark.clone(),
///     root.clone(),
/// );
///
/// assert_eq!(theme.current_preference(), ThemePreference::System);
/// assert!(root.is_dark());
///
/// os_dark.set(false);
/// assert!(!root.is_dark());
/// ```
pub struct ThemeStore {
    inner: Arc<ThemeInner>,
    _slot_watch: Subscription,
    _os_watch: Subscription,
}

impl ThemeStore {
    pub fn new(
        store: StorageStore,
        prefers_dark: Signal<bool>,
        applier: Arc<dyn ThemeApplier>,
    ) -> Self {
        let inner = Arc::new(ThemeInner {
            store,
            prefers_dark,
            applier,
            applied: Mutex::new(None),
        });
        inner.sync();

        let weak: Weak<ThemeInner> = Arc::downgrade(&inner);
        let slot_watch = inner.store.subscribe(move || {
            if let Some(inner) = weak.upgrade() {
                inner.sync();
            }
        });

        let weak: Weak<ThemeInner> = Arc::downgrade(&inner);
        let os_watch = inner.prefers_dark.watch(move |_| {
            if let Some(inner) = weak.upgrade() {
                if inner.preference() == ThemePreference::System {
                    inner.sync();
                }
            }
        });

        Self {
            inner,
            _slot_watch: slot_watch,
            _os_watch: os_watch,
        }
    }

    /// Advance Light → Dark → System → Light. Returns the new preference.
    pub fn cycle_theme(&self) -> ThemePreference {
        let mut next = ThemePreference::System;
        self.inner.store.write(|raw| {
            next = ThemePreference::from_raw(raw).cycle();
            next.as_str().to_string()
        });
        next
    }

    pub fn set_theme(&self, preference: ThemePreference) {
        self.inner.store.write(|_| preference.as_str().to_string());
    }

    pub fn current_preference(&self) -> ThemePreference {
        self.inner.preference()
    }

    /// The resolved theme right now.
    pub fn is_dark(&self) -> bool {
        self.inner.is_dark()
    }

    /// Register a callback run when the preference changes, or when the OS
    /// signal changes while the preference is `System`.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let callback = Arc::new(callback);

        let on_slot = {
            let callback = Arc::clone(&callback);
            self.inner.store.subscribe(move || callback())
        };

        let weak = Arc::downgrade(&self.inner);
        let on_os = self.inner.prefers_dark.watch(move |_| {
            if let Some(inner) = weak.upgrade() {
                if inner.preference() == ThemePreference::System {
                    callback();
                }
            }
        });

        Subscription::new(move || {
            drop(on_slot);
            drop(on_os);
        })
    }

    /// The underlying slot store.
    pub fn store(&self) -> &StorageStore {
        &self.inner.store
    }
}
