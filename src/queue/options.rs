use {
    super::{NamedMessageQueue, Origin},
    crate::{async_queue::AsyncMessageQueue, scheduler::Scheduler},
    std::{borrow::Cow, io, sync::Arc},
};

/// Whether opening a queue may create it, open an existing one, or both.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum OpenMode {
    /// Fail with [`AlreadyExists`](io::ErrorKind::AlreadyExists) if the name is taken.
    CreateOnly,
    /// Fail with [`NotFound`](io::ErrorKind::NotFound) if the name is free.
    OpenOnly,
    /// Open the queue if it exists and create it otherwise.
    #[default]
    OpenOrCreate,
}

/// A builder for [message queues](NamedMessageQueue) and the
/// [asynchronous adapter](AsyncMessageQueue) on top of them.
///
/// The capacity settings only take effect when a queue is created; opening an existing queue
/// keeps the capacity it was created with.
#[derive(Clone, Debug)]
pub struct QueueOptions<'n> {
    pub(crate) name: Cow<'n, str>,
    pub(crate) max_msg_count: usize,
    pub(crate) max_msg_size: usize,
    pub(crate) open_mode: OpenMode,
    pub(crate) replace_existing: bool,
    #[cfg(unix)]
    pub(crate) mode: libc::mode_t,
}

/// Creation.
impl QueueOptions<'_> {
    /// Creates an options table with default values.
    #[inline]
    pub fn new() -> Self {
        Self {
            name: Cow::Borrowed(""),
            max_msg_count: 10,
            max_msg_size: 256,
            open_mode: OpenMode::OpenOrCreate,
            replace_existing: false,
            #[cfg(unix)]
            mode: 0o600,
        }
    }
}

/// Option setters.
impl<'n> QueueOptions<'n> {
    /// Sets the name of the queue.
    ///
    /// POSIX message queue names must start with a slash and contain no other slashes.
    #[must_use = "builder setters take the entire structure and return the result"]
    #[inline]
    pub fn name(mut self, name: impl Into<Cow<'n, str>>) -> Self {
        self.name = name.into();
        self
    }
    builder_setters! {
        /// Sets the maximum number of messages the queue can hold.
        ///
        /// The default value is 10, which is the default per-queue limit on Linux.
        max_msg_count: usize,
        /// Sets the maximum size of one message, in bytes.
        ///
        /// The default value is 256.
        max_msg_size: usize,
        /// Selects whether the queue is to be created, opened, or either.
        ///
        /// The default value is `OpenOrCreate`.
        open_mode: OpenMode,
        /// Sets whether an existing queue with the same name is to be removed before creating a
        /// new one. Cannot be combined with [`OpenMode::OpenOnly`].
        ///
        /// This is disabled by default.
        replace_existing: bool,
    }
    /// Sets the permissions of the queue if it gets created.
    ///
    /// The default value is `0o600`.
    #[cfg(unix)]
    #[cfg_attr(feature = "doc_cfg", doc(cfg(unix)))]
    #[must_use = "builder setters take the entire structure and return the result"]
    #[inline]
    pub fn mode(mut self, mode: libc::mode_t) -> Self {
        self.mode = mode;
        self
    }
}

/// Option getters, for implementors of [`NamedMessageQueue`].
impl QueueOptions<'_> {
    /// Returns the name of the queue.
    #[inline]
    pub fn get_name(&self) -> &str { &self.name }
    /// Returns the maximum number of messages.
    #[inline]
    pub fn get_max_msg_count(&self) -> usize { self.max_msg_count }
    /// Returns the maximum size of one message.
    #[inline]
    pub fn get_max_msg_size(&self) -> usize { self.max_msg_size }
    /// Returns the open mode.
    #[inline]
    pub fn get_open_mode(&self) -> OpenMode { self.open_mode }
    /// Returns whether an existing queue is to be replaced.
    #[inline]
    pub fn get_replace_existing(&self) -> bool { self.replace_existing }
    /// Returns the permissions a created queue gets.
    #[cfg(unix)]
    #[cfg_attr(feature = "doc_cfg", doc(cfg(unix)))]
    #[inline]
    pub fn get_mode(&self) -> libc::mode_t { self.mode }
}

/// Queue constructors.
impl QueueOptions<'_> {
    /// Opens the given [type of queue](NamedMessageQueue), reporting whether a queue with the same
    /// name existed beforehand.
    pub fn open_as<Q: NamedMessageQueue>(&self) -> io::Result<(Q, Origin)> {
        self.validate()?;
        let removed = self.replace_existing && Q::remove(&self.name)?;
        let (queue, origin) = Q::open(self)?;
        let origin = match origin {
            Origin::Created if removed => Origin::Replaced,
            other => other,
        };
        tracing::debug!(name = %self.name, ?origin, "opened message queue");
        Ok((queue, origin))
    }
    /// Opens the given type of queue and wraps it in an [`AsyncMessageQueue`] which schedules its
    /// work on `scheduler`.
    pub fn open_async_as<Q: NamedMessageQueue, S: Scheduler>(
        &self,
        scheduler: S,
    ) -> io::Result<(Arc<AsyncMessageQueue<Q, S>>, Origin)> {
        let (queue, origin) = self.open_as::<Q>()?;
        Ok((AsyncMessageQueue::new(scheduler, queue), origin))
    }

    fn validate(&self) -> io::Result<()> {
        let msg = if self.name.is_empty() {
            "message queue name is empty"
        } else if self.max_msg_count == 0 {
            "maximum message count must be nonzero"
        } else if self.max_msg_size == 0 {
            "maximum message size must be nonzero"
        } else if self.replace_existing && self.open_mode == OpenMode::OpenOnly {
            "cannot replace an existing queue when only opening one"
        } else {
            return Ok(());
        };
        Err(io::Error::new(io::ErrorKind::InvalidInput, msg))
    }
}

impl Default for QueueOptions<'_> {
    #[inline]
    fn default() -> Self { Self::new() }
}
