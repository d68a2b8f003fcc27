use std::fmt;
use std::sync::{Arc, Mutex, Weak};

type Callback<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct Registry<A: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Callback<A>)>,
}

/// A registry of callbacks notified in registration order.
///
/// Callbacks are cloned out of the registry before they run, so a callback
/// may add or remove listeners (including itself) while being notified.
pub struct Listeners<A: ?Sized> {
    registry: Arc<Mutex<Registry<A>>>,
}

impl<A: ?Sized + 'static> Listeners<A> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a callback. It stays registered until the returned
    /// [`Subscription`] is dropped or explicitly unsubscribed.
    pub fn add<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(callback)));
            id
        };

        let registry: Weak<Mutex<Registry<A>>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                let mut registry = registry.lock().unwrap_or_else(|e| e.into_inner());
                registry.entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Invoke every registered callback once, oldest first.
    pub fn notify(&self, arg: &A) {
        let callbacks: Vec<Callback<A>> = {
            let registry = self.registry.lock().unwrap_or_else(|e| e.into_inner());
            registry.entries.iter().map(|(_, cb)| Arc::clone(cb)).collect()
        };
        for callback in callbacks {
            callback(arg);
        }
    }

    /// Number of live callbacks.
    pub fn len(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<A: ?Sized + 'static> Default for Listeners<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> Clone for Listeners<A> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

/// RAII guard for a registered callback.
///
/// Dropping the guard (or calling [`Subscription::unsubscribe`]) releases
/// the callback. Release runs at most once.
#[must_use = "dropping a Subscription immediately unsubscribes it"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Wrap a release action. Custom [`ChangeChannel`](crate::host::ChangeChannel)
    /// implementations use this to hand back their own guards.
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Release the callback now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn notifies_in_registration_order() {
        let listeners: Listeners<u32> = Listeners::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let log = log.clone();
            listeners.add(move |n| log.lock().unwrap().push(("first", *n)))
        };
        let second = {
            let log = log.clone();
            listeners.add(move |n| log.lock().unwrap().push(("second", *n)))
        };

        listeners.notify(&7);
        assert_eq!(*log.lock().unwrap(), vec![("first", 7), ("second", 7)]);

        drop(first);
        drop(second);
    }

    #[test]
    fn dropping_guard_releases_callback() {
        let listeners: Listeners<()> = Listeners::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let guard = listeners.add(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(listeners.len(), 1);

        listeners.notify(&());
        guard.unsubscribe();
        listeners.notify(&());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn callback_may_register_while_notified() {
        let listeners: Listeners<()> = Listeners::new();
        let held = Arc::new(Mutex::new(Vec::new()));

        let _outer = {
            let listeners = listeners.clone();
            let held = held.clone();
            listeners.clone().add(move |_| {
                held.lock().unwrap().push(listeners.add(|_| {}));
            })
        };

        listeners.notify(&());
        assert_eq!(listeners.len(), 2);
    }

    #[test]
    fn guard_outliving_registry_is_harmless() {
        let listeners: Listeners<()> = Listeners::new();
        let guard = listeners.add(|_| {});
        drop(listeners);
        drop(guard);
    }
}
