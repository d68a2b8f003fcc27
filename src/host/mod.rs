//! The host persistence layer.
//!
//! A [`StorageBackend`] owns the raw slots; a [`ChangeChannel`] tells a store
//! when another execution context (another tab, another process) changed one.
//! Both are injected into stores, so several simulated tabs can share one
//! [`Origin`] inside a single test.

mod backend;
mod file;
mod origin;

pub use backend::{ChangeChannel, ChangeEvent, NullChannel, StorageBackend};
pub use file::FileBackend;
pub use origin::{Origin, Tab};
