use crate::error::StorageError;
use crate::listeners::Subscription;

/// Origin-scoped key/value persistence, the equivalent of a browser's
/// `localStorage`.
pub trait StorageBackend: Send + Sync {
    /// Read the raw value of a slot. `Ok(None)` means the slot was never written.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Persist the raw value of a slot.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// A slot was modified in another execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub key: String,
    pub new_value: Option<String>,
}

impl ChangeEvent {
    pub fn new(key: impl Into<String>, new_value: Option<String>) -> Self {
        Self {
            key: key.into(),
            new_value,
        }
    }
}

/// Inbound change notifications from other execution contexts.
///
/// Hosts are expected to exclude the context that made the write, but
/// stores do not rely on it.
pub trait ChangeChannel: Send + Sync {
    /// Register a listener for every change event. Events for unrelated keys
    /// are delivered too; filtering is the listener's job.
    fn listen(&self, listener: Box<dyn Fn(&ChangeEvent) + Send + Sync>) -> Subscription;
}

/// A channel that never delivers anything, for hosts with a single context.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullChannel;

impl ChangeChannel for NullChannel {
    fn listen(&self, _listener: Box<dyn Fn(&ChangeEvent) + Send + Sync>) -> Subscription {
        Subscription::new(|| {})
    }
}
