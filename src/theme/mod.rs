//! Theme preference, resolution and the root element side effect.
//!
//! The persisted [`ThemePreference`] combines with the operating system's
//! "prefers dark" signal into a resolved dark/light state, which is applied
//! to the page through a [`ThemeApplier`]. [`bootstrap`] holds the early
//! path that runs before the page paints.

mod applier;
pub mod bootstrap;
mod preference;
mod theme_store;

pub use applier::{RootElement, ThemeApplier, DEFAULT_DARK_CLASS};
pub use preference::{resolve, ThemePreference};
pub use theme_store::ThemeStore;
