//! Schedulers that drive asynchronous message queue operations.
//!
//! An [`AsyncMessageQueue`](crate::AsyncMessageQueue) never runs any part of an operation on the
//! caller's stack. Instead, it hands every step to a [`Scheduler`], which executes it at some later
//! point on whatever thread it sees fit. Two implementations come with the crate:
//! - [`RunLoop`], a work queue that is drained by calling [`run()`](RunLoop::run) on one or
//!   more threads until no work remains;
//! - [`TokioScheduler`], which spawns every step as a task on a Tokio runtime. Requires the
//!   `tokio` feature.
//!
//! Any other runtime can be plugged in by implementing [`Scheduler`] for a handle to it.

mod run_loop;
#[cfg(feature = "tokio")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(feature = "tokio")))]
mod tokio;

pub use run_loop::*;
#[cfg(feature = "tokio")]
pub use tokio::*;

/// A handle to a task scheduler.
///
/// Handles are expected to be cheap to clone and to refer to a scheduler that they don't own;
/// every pending operation keeps a clone of one so that it can reschedule itself.
///
/// # Contract
/// Neither [`post()`](Self::post) nor [`defer()`](Self::defer) may run the closure before
/// returning. Asynchronous operations rely on this to never complete synchronously.
pub trait Scheduler: Clone + Send + Sync + 'static {
    /// Schedules new work, unrelated to whatever is currently executing.
    fn post<F: FnOnce() + Send + 'static>(&self, f: F);
    /// Schedules a continuation of the work that is currently executing.
    ///
    /// A scheduler may use this as a hint to run the continuation after the current piece of
    /// work returns rather than in parallel with it. The default implementation forwards to
    /// [`post()`](Self::post).
    #[inline]
    fn defer<F: FnOnce() + Send + 'static>(&self, f: F) { self.post(f) }
}
