//! Ordered callback registries and scoped subscriptions.
//!
//! Every observable in this crate (stores, signals, host channels) keeps
//! its callbacks in a [`Listeners`] registry and hands out a
//! [`Subscription`] that releases the callback when dropped.

mod listeners;

pub use listeners::{Listeners, Subscription};
