//! Synchronous message queue primitives and their construction.
//!
//! A message queue is a named, pre-sized channel of discrete messages. It has a fixed maximum
//! number of messages it can hold and a fixed maximum size for each one. Messages are transferred
//! whole: a send either enqueues the entire buffer or nothing, and a receive either dequeues an
//! entire message or nothing.
//!
//! The asynchronous adapter only needs the non-blocking half of that interface, which is what
//! [`MessageQueue`] captures. Named construction lives in [`NamedMessageQueue`] and is configured
//! with [`QueueOptions`].
//!
//! Two primitives ship with the crate:
//! - [`MemoryQueue`], which lives in the memory of the current process and is available
//!   everywhere;
//! - [`PosixMessageQueue`](crate::os::unix::PosixMessageQueue), backed by the kernel's POSIX
//!   message queues on Linux.

mod memory;
mod options;

pub use {memory::*, options::*};

use std::io;

/// The non-blocking operations of a message queue.
///
/// # Errors
/// Every `Err` returned by [`try_send()`](Self::try_send) or [`try_receive()`](Self::try_receive)
/// is treated as unrecoverable by the asynchronous adapter: the operation that observed it fails
/// with [`Error::NoRecovery`](crate::Error::NoRecovery) and is not retried. The "queue is full"
/// and "queue is empty" conditions must therefore be reported through the `Ok` variant.
pub trait MessageQueue: Send + Sync {
    /// Attempts to enqueue the whole of `msg` as one message without blocking.
    ///
    /// Returns `Ok(false)` if the queue is full. A message longer than
    /// [`max_msg_size()`](Self::max_msg_size) is an error.
    fn try_send(&self, msg: &[u8]) -> io::Result<bool>;
    /// Attempts to dequeue one message into `buf` without blocking, returning its length.
    ///
    /// Returns `Ok(None)` if the queue is empty. A buffer shorter than
    /// [`max_msg_size()`](Self::max_msg_size) is an error.
    fn try_receive(&self, buf: &mut [u8]) -> io::Result<Option<usize>>;
    /// Returns the maximum size of a message, in bytes.
    fn max_msg_size(&self) -> usize;
    /// Returns the maximum number of messages the queue can hold at once.
    fn max_msg_count(&self) -> usize;
    /// Returns the number of messages currently in the queue.
    fn num_msgs(&self) -> io::Result<usize>;
}

/// Message queues that can be created and opened by name.
pub trait NamedMessageQueue: MessageQueue + Sized {
    /// Creates or opens a queue as requested by [`open_mode`](QueueOptions::open_mode), ignoring
    /// [`replace_existing`](QueueOptions::replace_existing), which is handled by
    /// [`QueueOptions::open_as()`].
    ///
    /// The returned [`Origin`] must be either [`Created`](Origin::Created) or
    /// [`Opened`](Origin::Opened).
    fn open(options: &QueueOptions<'_>) -> io::Result<(Self, Origin)>;
    /// Removes the name of a queue, returning whether one existed.
    ///
    /// Handles that are already open keep working; the queue itself goes away once the last of
    /// them is dropped.
    fn remove(name: &str) -> io::Result<bool>;
}

/// How a queue came to be, as reported when opening one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// No queue with the name existed, and a new one was created.
    Created,
    /// A queue with the name existed and was removed before a new one was created in its place.
    Replaced,
    /// A queue with the name existed and was opened.
    Opened,
}
impl Origin {
    /// Returns whether a queue with the name existed beforehand.
    #[inline]
    pub fn existed(self) -> bool { !matches!(self, Self::Created) }
}
