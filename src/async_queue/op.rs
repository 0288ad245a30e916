//! The retry loop behind every asynchronous operation.
//!
//! A pending operation is a value that moves from one scheduled closure to the next:
//! ```text
//! initiate ──post──▶ start ──▶ attempt ──▶ complete
//!                      │          ▲  │
//!                      │          └──┘ defer (queue full/empty)
//!                      └──▶ complete (buffer rejected)
//! ```
//! Nothing about it is stored in the adapter, apart from the flag that marks its direction as
//! occupied.

use {
    super::{concurrency_detector::Direction, AsyncMessageQueue},
    crate::{
        error::{Error, Result},
        queue::MessageQueue,
        scheduler::Scheduler,
    },
    std::{io, ops::Deref, sync::Arc},
};

/// One direction of transfer, carrying the caller's buffer.
pub(super) trait Transfer: Send + 'static {
    type Buf;
    const DIRECTION: Direction;
    /// Checked once, before the first attempt.
    fn validate(&mut self, _queue: &impl MessageQueue) -> Result<()> { Ok(()) }
    /// `Ok(None)` means the queue would block.
    fn attempt(&mut self, queue: &impl MessageQueue) -> io::Result<Option<usize>>;
    fn into_buf(self) -> Self::Buf;
}

pub(super) struct Write<B>(pub B);
impl<B: AsRef<[u8]> + Send + 'static> Transfer for Write<B> {
    type Buf = B;
    const DIRECTION: Direction = Direction::Write;
    fn attempt(&mut self, queue: &impl MessageQueue) -> io::Result<Option<usize>> {
        let msg = AsRef::<[u8]>::as_ref(&self.0);
        Ok(queue.try_send(msg)?.then_some(msg.len()))
    }
    #[inline]
    fn into_buf(self) -> B { self.0 }
}

pub(super) struct Read<B>(pub B);
impl<B: AsMut<[u8]> + Send + 'static> Transfer for Read<B> {
    type Buf = B;
    const DIRECTION: Direction = Direction::Read;
    fn validate(&mut self, queue: &impl MessageQueue) -> Result<()> {
        let capacity = AsMut::<[u8]>::as_mut(&mut self.0).len();
        let max_msg_size = queue.max_msg_size();
        if capacity < max_msg_size {
            return Err(Error::MessageSize { capacity, max_msg_size });
        }
        Ok(())
    }
    fn attempt(&mut self, queue: &impl MessageQueue) -> io::Result<Option<usize>> {
        queue.try_receive(AsMut::<[u8]>::as_mut(&mut self.0))
    }
    #[inline]
    fn into_buf(self) -> B { self.0 }
}

/// Counted reference to the adapter which keeps its direction marked as occupied until dropped.
struct OpGuard<Q, S> {
    amq: Arc<AsyncMessageQueue<Q, S>>,
    dir: Direction,
}
impl<Q, S> Deref for OpGuard<Q, S> {
    type Target = AsyncMessageQueue<Q, S>;
    #[inline]
    fn deref(&self) -> &Self::Target { &self.amq }
}
impl<Q, S> Drop for OpGuard<Q, S> {
    #[inline]
    fn drop(&mut self) { self.amq.detector(self.dir).end() }
}

pub(super) struct PendingOp<Q, S, T, H> {
    guard: OpGuard<Q, S>,
    transfer: T,
    handler: H,
    attempts: u64,
}
impl<Q, S, T, H> PendingOp<Q, S, T, H>
where
    Q: MessageQueue + 'static,
    S: Scheduler,
    T: Transfer,
    H: FnOnce(Result<usize>, T::Buf) + Send + 'static,
{
    #[track_caller]
    pub fn initiate(amq: &Arc<AsyncMessageQueue<Q, S>>, transfer: T, handler: H) {
        let dir = T::DIRECTION;
        amq.detector(dir).begin();
        let op = Self {
            guard: OpGuard { amq: Arc::clone(amq), dir },
            transfer,
            handler,
            attempts: 0,
        };
        tracing::debug!(op = dir.verb(), "initiating asynchronous operation");
        amq.scheduler.post(move || op.start());
    }

    fn start(mut self) {
        match self.transfer.validate(&self.guard.queue) {
            Ok(()) => self.attempt(),
            Err(e) => self.complete(Err(e)),
        }
    }

    fn attempt(mut self) {
        self.attempts = self.attempts.saturating_add(1);
        match self.transfer.attempt(&self.guard.queue) {
            Ok(Some(n)) => self.complete(Ok(n)),
            Ok(None) => {
                tracing::trace!(op = T::DIRECTION.verb(), attempts = self.attempts, "would block");
                let scheduler = self.guard.scheduler.clone();
                scheduler.defer(move || self.attempt());
            }
            Err(e) => {
                tracing::warn!(
                    op = T::DIRECTION.verb(),
                    error = %e,
                    "message queue fault, completing with no-recovery error",
                );
                self.complete(Err(Error::NoRecovery(e)));
            }
        }
    }

    fn complete(self, result: Result<usize>) {
        let Self { guard, transfer, handler, attempts } = self;
        tracing::debug!(
            op = T::DIRECTION.verb(),
            attempts,
            ok = result.is_ok(),
            "asynchronous operation complete",
        );
        // Frees the direction before the handler runs, so that it can start the next operation.
        drop(guard);
        handler(result, transfer.into_buf());
    }
}
