//! One bundle of recency, favorites and theme stores on a shared host.

mod preferences;

pub use preferences::Preferences;
