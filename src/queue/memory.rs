use {
    super::{MessageQueue, NamedMessageQueue, OpenMode, Origin, QueueOptions},
    crate::poison_error,
    std::{
        collections::{BTreeMap, VecDeque},
        fmt::{self, Debug, Formatter},
        io,
        sync::{Arc, Mutex, MutexGuard},
    },
};

static REGISTRY: Mutex<BTreeMap<String, Arc<Inner>>> = Mutex::new(BTreeMap::new());

fn registry() -> io::Result<MutexGuard<'static, BTreeMap<String, Arc<Inner>>>> {
    REGISTRY.lock().map_err(poison_error)
}

struct Inner {
    max_msg_count: usize,
    max_msg_size: usize,
    state: Mutex<State>,
}
#[derive(Default)]
struct State {
    msgs: VecDeque<Box<[u8]>>,
    destroyed: bool,
}

/// A message queue in the memory of the current process, shared by name between all handles
/// opened within the process.
///
/// This is the portable primitive of the crate. It has the same observable semantics as the
/// interprocess ones – fixed capacity, whole-message transfer, FIFO order, names that outlive
/// handles until [removed](NamedMessageQueue::remove) – which makes it a good fit for pairing two
/// threads and for testing code written against [`MessageQueue`].
#[derive(Clone)]
pub struct MemoryQueue(Arc<Inner>);
impl MemoryQueue {
    /// Destroys the queue for every handle that refers to it.
    ///
    /// Queued messages are discarded, the name is removed if it still refers to this queue, and
    /// every subsequent operation on any handle fails with
    /// [`BrokenPipe`](io::ErrorKind::BrokenPipe).
    pub fn destroy(&self) -> io::Result<()> {
        let mut registry = registry()?;
        registry.retain(|_, q| !Arc::ptr_eq(q, &self.0));
        drop(registry);

        let mut state = self.state()?;
        state.destroyed = true;
        state.msgs.clear();
        Ok(())
    }
    /// Returns whether both handles refer to the same queue.
    #[inline]
    pub fn same_queue(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }

    fn state(&self) -> io::Result<MutexGuard<'_, State>> {
        self.0.state.lock().map_err(poison_error)
    }
    fn live_state(&self) -> io::Result<MutexGuard<'_, State>> {
        let state = self.state()?;
        if state.destroyed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "message queue was destroyed"));
        }
        Ok(state)
    }
}

impl MessageQueue for MemoryQueue {
    fn try_send(&self, msg: &[u8]) -> io::Result<bool> {
        if msg.len() > self.0.max_msg_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "message exceeds the maximum message size",
            ));
        }
        let mut state = self.live_state()?;
        if state.msgs.len() >= self.0.max_msg_count {
            return Ok(false);
        }
        state.msgs.push_back(msg.into());
        Ok(true)
    }
    fn try_receive(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        if buf.len() < self.0.max_msg_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "buffer is smaller than the maximum message size",
            ));
        }
        let Some(msg) = self.live_state()?.msgs.pop_front() else {
            return Ok(None);
        };
        let len = msg.len();
        // The length check above makes this infallible.
        if let Some(dst) = buf.get_mut(..len) {
            dst.copy_from_slice(&msg);
        }
        Ok(Some(len))
    }
    #[inline]
    fn max_msg_size(&self) -> usize { self.0.max_msg_size }
    #[inline]
    fn max_msg_count(&self) -> usize { self.0.max_msg_count }
    fn num_msgs(&self) -> io::Result<usize> { Ok(self.live_state()?.msgs.len()) }
}

impl NamedMessageQueue for MemoryQueue {
    fn open(options: &QueueOptions<'_>) -> io::Result<(Self, Origin)> {
        let mut registry = registry()?;
        if let Some(existing) = registry.get(options.get_name()) {
            if options.open_mode == OpenMode::CreateOnly {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "a message queue with this name already exists",
                ));
            }
            return Ok((Self(Arc::clone(existing)), Origin::Opened));
        }
        if options.open_mode == OpenMode::OpenOnly {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no message queue with this name exists",
            ));
        }
        let inner = Arc::new(Inner {
            max_msg_count: options.max_msg_count,
            max_msg_size: options.max_msg_size,
            state: Mutex::new(State::default()),
        });
        registry.insert(options.get_name().to_owned(), Arc::clone(&inner));
        Ok((Self(inner), Origin::Created))
    }
    fn remove(name: &str) -> io::Result<bool> { Ok(registry()?.remove(name).is_some()) }
}

impl Debug for MemoryQueue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut dbs = f.debug_struct("MemoryQueue");
        dbs.field("max_msg_count", &self.0.max_msg_count)
            .field("max_msg_size", &self.0.max_msg_size);
        if let Ok(state) = self.0.state.try_lock() {
            dbs.field("num_msgs", &state.msgs.len()).field("destroyed", &state.destroyed);
        }
        dbs.finish()
    }
}
