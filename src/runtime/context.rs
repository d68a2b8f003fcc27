use std::cell::RefCell;

/// Where store code is currently executing.
///
/// `Client` is the default. Server-side rendering wraps its work in
/// [`ExecutionContext::server`], and stores read inside that scope hand out
/// a fixed empty snapshot instead of touching their slot.
///
/// # Examples
///
/// ```
/// use keepsake::runtime::ExecutionContext;
///
/// assert_eq!(ExecutionContext::current(), ExecutionContext::Client);
///
/// ExecutionContext::server(|| {
///     assert_eq!(ExecutionContext::current(), ExecutionContext::Server);
/// });
///
/// assert_eq!(ExecutionContext::current(), ExecutionContext::Client);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionContext {
    Client,
    Server,
}

// Thread-local stack for scoped contexts
thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ExecutionContext>> = const { RefCell::new(Vec::new()) };
}

impl ExecutionContext {
    /// Get the current context (innermost scope, or `Client`).
    pub fn current() -> Self {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .copied()
                .unwrap_or(ExecutionContext::Client)
        })
    }

    pub fn is_server(self) -> bool {
        self == ExecutionContext::Server
    }

    /// Run a function as server-side code.
    pub fn server<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        Self::with_context(ExecutionContext::Server, f)
    }

    /// Run a function as client-side code, even inside a server scope.
    pub fn client<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        Self::with_context(ExecutionContext::Client, f)
    }

    /// Run a function with `context` pushed onto the thread-local stack.
    ///
    /// The context is popped again even if `f` panics.
    pub fn with_context<F, R>(context: ExecutionContext, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(context);
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });

        match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        }
    }
}
