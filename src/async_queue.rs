//! Asynchronous, completion-based adapter for [message queues](crate::queue).
//!
//! [`AsyncMessageQueue`] turns the "try now, maybe fail" operations of a [`MessageQueue`] into
//! operations that complete exactly once, at some later point, by calling a handler. The work is
//! performed on a [`Scheduler`]: the first attempt is [posted](Scheduler::post), and every time
//! the queue reports that it is full (for writes) or empty (for reads), the attempt is
//! [deferred](Scheduler::defer) and made again. There is no limit on the number of retries and no
//! delay between them; a retrying operation keeps its scheduler busy for as long as the queue stays
//! full or empty.
//!
//! # Completion
//! Every operation ends with exactly one call to its handler, with one of
//! - the number of bytes transferred,
//! - [`Error::MessageSize`] if a read buffer is too small for the largest possible message,
//! - [`Error::NoRecovery`] if the queue reported any error.
//!
//! The handler is never called before the initiating method returns, not even when the outcome is
//! known upfront. Buffers are moved into the operation and handed back to the handler together
//! with the result; the adapter sends from and receives into them directly.
//!
//! # Lifetime
//! The adapter is always handled through an [`Arc`], and every pending operation holds a clone of
//! it. Dropping the caller's handle while operations are in flight is therefore fine: the adapter
//! and its queue go away once the last of them completes.
//!
//! # Concurrency
//! At most one read and at most one write may be outstanding on one adapter at any given time.
//! Reading and writing concurrently is what the adapter is for – one producer and one consumer –
//! but starting a second read while the first one has not yet completed (or a second write,
//! likewise) panics. Message order within one direction is the order of the queue, which is
//! first-in-first-out for every primitive in this crate.
//!
//! # Example
//! ```
//! use async_message_queue::{MemoryQueue, QueueOptions, RunLoop};
//!
//! let rl = RunLoop::new();
//! let (amq, _) = QueueOptions::new()
//!     .name("doc-async-queue")
//!     .replace_existing(true)
//!     .open_async_as::<MemoryQueue, _>(rl.handle())?;
//!
//! amq.async_write(b"hello", |r, _| assert_eq!(r.unwrap(), 5));
//! amq.async_read(vec![0; amq.max_msg_size()], |r, buf| {
//!     assert_eq!(&buf[..r.unwrap()], b"hello");
//! });
//! rl.run()?;
//! # std::io::Result::Ok(())
//! ```

mod concurrency_detector;
mod op;

use {
    self::{
        concurrency_detector::{ConcurrencyDetector, Direction},
        op::{PendingOp, Read, Write},
    },
    crate::{
        error::{RebindError, Result},
        queue::MessageQueue,
        scheduler::Scheduler,
    },
    std::{
        fmt::{self, Debug, Formatter},
        sync::{
            atomic::{AtomicBool, Ordering::*},
            Arc,
        },
    },
};

/// Asynchronous adapter for a [`MessageQueue`] `Q`, scheduling its work on `S`.
///
/// See the [module-level documentation](self) for the semantics of the operations.
pub struct AsyncMessageQueue<Q, S> {
    queue: Q,
    scheduler: S,
    cancel: CancellationSlot,
    reading: ConcurrencyDetector,
    writing: ConcurrencyDetector,
}

/// Construction and accessors.
impl<Q, S> AsyncMessageQueue<Q, S> {
    /// Wraps `queue`, to be driven by `scheduler`.
    pub fn new(scheduler: S, queue: Q) -> Arc<Self> {
        Arc::new(Self {
            queue,
            scheduler,
            cancel: CancellationSlot::default(),
            reading: ConcurrencyDetector::new(Direction::Read),
            writing: ConcurrencyDetector::new(Direction::Write),
        })
    }
    /// Returns the scheduler the adapter's work runs on.
    #[inline]
    pub fn get_scheduler(&self) -> &S { &self.scheduler }
    /// Borrows the underlying queue.
    ///
    /// Using the queue's own receive or send operations while an asynchronous operation of the
    /// same direction is in flight competes with it for messages or capacity.
    #[inline]
    pub fn get_ref(&self) -> &Q { &self.queue }
    /// Returns the cancellation slot of the adapter.
    #[inline]
    pub fn cancellation_slot(&self) -> &CancellationSlot { &self.cancel }
    /// Returns whether a read is in flight.
    #[inline]
    pub fn is_reading(&self) -> bool { self.reading.is_busy() }
    /// Returns whether a write is in flight.
    #[inline]
    pub fn is_writing(&self) -> bool { self.writing.is_busy() }

    fn detector(&self, dir: Direction) -> &ConcurrencyDetector {
        match dir {
            Direction::Read => &self.reading,
            Direction::Write => &self.writing,
        }
    }
}

impl<Q: MessageQueue, S> AsyncMessageQueue<Q, S> {
    /// Returns the maximum message size of the underlying queue, which is also the smallest
    /// buffer [`async_read()`](Self::async_read) accepts.
    #[inline]
    pub fn max_msg_size(&self) -> usize { self.queue.max_msg_size() }
}

/// Asynchronous operations.
impl<Q: MessageQueue + 'static, S: Scheduler> AsyncMessageQueue<Q, S> {
    /// Sends the contents of `buf` as one message, then calls `handler` with the number of bytes
    /// sent – which is always the length of `buf` – and the buffer itself.
    ///
    /// While the queue is full, the send is retried. A message longer than the
    /// [maximum message size](Self::max_msg_size) is rejected by the queue, which fails the
    /// operation with [`Error::NoRecovery`](crate::Error::NoRecovery).
    ///
    /// # Panics
    /// If another write on this adapter has not completed yet.
    #[track_caller]
    pub fn async_write<B, H>(self: &Arc<Self>, buf: B, handler: H)
    where
        B: AsRef<[u8]> + Send + 'static,
        H: FnOnce(Result<usize>, B) + Send + 'static,
    {
        PendingOp::initiate(self, Write(buf), handler);
    }
    /// Receives one message into `buf`, then calls `handler` with the length of the message and
    /// the buffer.
    ///
    /// While the queue is empty, the receive is retried. If `buf` is shorter than the
    /// [maximum message size](Self::max_msg_size), the operation fails with
    /// [`Error::MessageSize`](crate::Error::MessageSize) without touching the queue.
    ///
    /// # Panics
    /// If another read on this adapter has not completed yet.
    #[track_caller]
    pub fn async_read<B, H>(self: &Arc<Self>, buf: B, handler: H)
    where
        B: AsMut<[u8]> + Send + 'static,
        H: FnOnce(Result<usize>, B) + Send + 'static,
    {
        PendingOp::initiate(self, Read(buf), handler);
    }
}

/// Scheduler substitution.
impl<Q, S> AsyncMessageQueue<Q, S> {
    /// Moves the queue into an adapter that schedules its work on `scheduler`.
    ///
    /// This requires `self` to be the only reference to the adapter, which also means that no
    /// operations are in flight. Otherwise, `self` is returned in the error.
    pub fn rebind<S2>(
        self: Arc<Self>,
        scheduler: S2,
    ) -> Result<Arc<AsyncMessageQueue<Q, S2>>, RebindError<Q, S>> {
        let this = Arc::try_unwrap(self).map_err(RebindError)?;
        Ok(Arc::new(AsyncMessageQueue {
            queue: this.queue,
            scheduler,
            cancel: this.cancel,
            reading: ConcurrencyDetector::new(Direction::Read),
            writing: ConcurrencyDetector::new(Direction::Write),
        }))
    }
}

/// Maps an adapter type to the same adapter with a different scheduler.
pub trait RebindScheduler<S2> {
    /// The adapter type with the scheduler replaced by `S2`.
    type Other;
}
impl<Q, S, S2> RebindScheduler<S2> for AsyncMessageQueue<Q, S> {
    type Other = AsyncMessageQueue<Q, S2>;
}
/// Shorthand for [`RebindScheduler::Other`].
pub type Rebound<T, S2> = <T as RebindScheduler<S2>>::Other;

impl<Q: Debug, S: Debug> Debug for AsyncMessageQueue<Q, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncMessageQueue")
            .field("queue", &self.queue)
            .field("scheduler", &self.scheduler)
            .field("cancel", &self.cancel)
            .field("reading", &self.reading.is_busy())
            .field("writing", &self.writing.is_busy())
            .finish()
    }
}

/// Records cancellation requests for an [`AsyncMessageQueue`].
///
/// Nothing acts on the recorded state: operations in flight keep retrying until they complete,
/// whether or not a request has been [emitted](Self::emit). The slot is kept so that callers have
/// one well-known place to coordinate cancellation of their own follow-up operations.
#[derive(Debug, Default)]
pub struct CancellationSlot(AtomicBool);
impl CancellationSlot {
    /// Records a cancellation request.
    #[inline]
    pub fn emit(&self) { self.0.store(true, Release) }
    /// Returns whether a request has been recorded since the last [`clear()`](Self::clear).
    #[inline]
    pub fn is_emitted(&self) -> bool { self.0.load(Acquire) }
    /// Forgets any recorded request.
    #[inline]
    pub fn clear(&self) { self.0.store(false, Release) }
}
