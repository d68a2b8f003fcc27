//! # Keepsake
//!
//! Reactive, persisted preference stores for a site's UI layer.
//!
//! Keepsake keeps small user preferences (recently used tools, favorites,
//! theme) in origin-scoped storage slots and makes them observable:
//!
//! ## Stores
//!
//! - `StorageStore` - One persisted slot, many subscribers, stable snapshots
//! - `RecencyList` - Bounded most-recent-first list of ids
//! - `FavoriteSet` - Toggleable set of ids
//! - `ThemeStore` - Light/dark/system preference resolved against the OS
//!
//! ## Host
//!
//! Persistence and cross-tab change notification are injected through the
//! `StorageBackend` and `ChangeChannel` traits. `Origin` simulates several
//! tabs in one process; `FileBackend` keeps slots in a JSON file.
//!
//! Failures never reach the caller: unavailable storage degrades to
//! in-memory values and unreadable slots read as their default.

pub mod config;
pub mod error;
pub mod host;
pub mod listeners;
pub mod preferences;
pub mod runtime;
pub mod signal;
pub mod store;
pub mod theme;

// Re-export main types for convenience
pub use config::PreferencesConfig;
pub use listeners::Subscription;
pub use preferences::Preferences;
pub use signal::Signal;
pub use store::{FavoriteSet, RecencyList, Snapshot, StorageStore};
pub use theme::{ThemePreference, ThemeStore};
