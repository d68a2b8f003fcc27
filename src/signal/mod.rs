//! Push-based observable values.
//!
//! Used for inputs the stores do not own, such as the operating system's
//! "prefers dark color scheme" media query.

mod signal;

pub use signal::Signal;
