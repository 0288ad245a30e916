use {super::Scheduler, ::tokio::runtime::Handle};

/// [`Scheduler`] that spawns every scheduled closure as a task on a Tokio runtime.
///
/// Both posting and deferring spawn a new task, which Tokio never polls inline. The closures are
/// short and never block, so running them on the runtime's worker threads is fine.
#[derive(Clone, Debug)]
pub struct TokioScheduler(Handle);
impl TokioScheduler {
    /// Wraps the given runtime handle.
    #[inline]
    pub fn new(handle: Handle) -> Self { Self(handle) }
    /// Uses the runtime that the current thread is in.
    ///
    /// # Panics
    /// If called outside of a Tokio runtime, like [`Handle::current()`].
    #[inline]
    #[track_caller]
    pub fn current() -> Self { Self(Handle::current()) }
    /// Borrows the runtime handle.
    #[inline]
    pub fn handle(&self) -> &Handle { &self.0 }
}
impl From<Handle> for TokioScheduler {
    #[inline]
    fn from(handle: Handle) -> Self { Self(handle) }
}
impl Scheduler for TokioScheduler {
    #[inline]
    fn post<F: FnOnce() + Send + 'static>(&self, f: F) {
        // Detached: completion is reported through the closure itself.
        drop(self.0.spawn(async move { f() }));
    }
}
