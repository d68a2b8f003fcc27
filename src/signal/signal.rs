use std::sync::{Arc, RwLock};

use crate::listeners::{Listeners, Subscription};

/// A value that notifies watchers when it changes.
///
/// # Example
///
/// ```
/// use keepsake::Signal;
///
/// let prefers_dark = Signal::new(false);
/// let _watch = prefers_dark.watch(|dark| println!("dark mode: {dark}"));
/// prefers_dark.set(true);
/// ```
pub struct Signal<T> {
    value: Arc<RwLock<T>>,
    watchers: Listeners<T>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Signal<T> {
    /// Create a new signal with the given initial value.
    pub fn new(initial: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(initial)),
            watchers: Listeners::new(),
        }
    }

    /// Get the current value of the signal.
    pub fn get(&self) -> T {
        self.value.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Set a new value. Watchers run only if the value actually changed.
    pub fn set(&self, new_value: T) {
        {
            let mut value = self.value.write().unwrap_or_else(|e| e.into_inner());
            if *value == new_value {
                return;
            }
            *value = new_value.clone();
        }
        // Release the write lock before notifying
        self.watchers.notify(&new_value);
    }

    /// Update the value using a function.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Watch this signal for changes. The callback receives each new value;
    /// it is not called with the current one.
    pub fn watch<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.watchers.add(callback)
    }

    /// Number of live watchers.
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            watchers: self.watchers.clone(),
        }
    }
}
