//! Error types for asynchronous message queue operations.
//!
//! Every asynchronous operation finishes with exactly one [`Result`], delivered to its completion
//! handler. Transient conditions – the queue being full on send or empty on receive – never show
//! up here: they are retried internally until they go away.

use {
    crate::async_queue::AsyncMessageQueue,
    std::{
        error::Error as StdError,
        fmt::{self, Debug, Display, Formatter},
        io,
        sync::Arc,
    },
};

/// Result type of asynchronous message queue operations.
pub type Result<T = usize, E = Error> = std::result::Result<T, E>;

/// Error delivered to the completion handler of an asynchronous operation.
#[derive(Debug)]
pub enum Error {
    /// The buffer passed to a read is smaller than the maximum message size of the queue.
    ///
    /// This is detected before the queue is touched, so no message is consumed.
    MessageSize {
        /// Capacity of the buffer that was passed.
        capacity: usize,
        /// Maximum message size the queue was configured with.
        max_msg_size: usize,
    },
    /// The underlying queue reported a fault it cannot recover from, such as having been
    /// destroyed or running out of resources.
    ///
    /// The operation is terminated and no further attempts are made. The original error is kept
    /// as the [source](StdError::source) for diagnostic purposes only.
    NoRecovery(io::Error),
}
impl Error {
    /// Returns the classification of the error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MessageSize { .. } => ErrorKind::MessageSize,
            Self::NoRecovery(..) => ErrorKind::NoRecovery,
        }
    }
}
impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MessageSize { capacity, max_msg_size } => write!(
                f,
                "buffer too small for a message ({capacity} bytes, need at least {max_msg_size})"
            ),
            Self::NoRecovery(..) => f.write_str(ErrorKind::NoRecovery.msg()),
        }
    }
}
impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::MessageSize { .. } => None,
            Self::NoRecovery(e) => Some(e),
        }
    }
}
impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        let kind = match e.kind() {
            ErrorKind::MessageSize => io::ErrorKind::InvalidInput,
            ErrorKind::NoRecovery => io::ErrorKind::Other,
        };
        io::Error::new(kind, e)
    }
}

/// Classification of [`Error`], without the payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::MessageSize`].
    MessageSize,
    /// See [`Error::NoRecovery`].
    NoRecovery,
}
impl ErrorKind {
    const fn msg(self) -> &'static str {
        use ErrorKind::*;
        match self {
            MessageSize => "buffer too small for a message",
            NoRecovery => "unrecoverable message queue fault",
        }
    }
}
impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(self.msg()) }
}

/// Error type for [`AsyncMessageQueue::rebind()`].
///
/// The adapter could not be taken apart because other references to it were alive, either held
/// by the caller or by operations still in flight. The original handle is returned unchanged.
pub struct RebindError<Q, S>(pub Arc<AsyncMessageQueue<Q, S>>);
impl<Q, S> RebindError<Q, S> {
    /// Returns the adapter that could not be rebound.
    #[inline]
    pub fn into_inner(self) -> Arc<AsyncMessageQueue<Q, S>> { self.0 }
}
impl<Q, S> Debug for RebindError<Q, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RebindError")
            .field("strong_count", &Arc::strong_count(&self.0))
            .finish_non_exhaustive()
    }
}
impl<Q, S> Display for RebindError<Q, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad("cannot rebind a message queue that is shared or has operations in flight")
    }
}
impl<Q, S> StdError for RebindError<Q, S> {}
