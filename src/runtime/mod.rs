//! Execution context detection.
//!
//! Stores behave differently when rendered on a server, where no
//! persistence backend exists yet. This module tracks which side the
//! current thread is running on.

mod context;

pub use context::ExecutionContext;
