use {
    super::c_wrappers,
    crate::queue::{MessageQueue, NamedMessageQueue, OpenMode, Origin, QueueOptions},
    libc::mqd_t,
    std::{
        ffi::CString,
        fmt::{self, Debug, Formatter},
        io,
    },
};

/// A POSIX message queue, opened in nonblocking mode for both sending and receiving.
///
/// All messages are sent with priority 0, which makes the queue strictly first-in-first-out.
///
/// # Examples
/// ```no_run
/// use async_message_queue::{os::unix::PosixMessageQueue, MessageQueue, OpenMode, QueueOptions};
///
/// let (queue, origin) = QueueOptions::new()
///     .name("/example")
///     .max_msg_count(8)
///     .max_msg_size(128)
///     .open_mode(OpenMode::OpenOrCreate)
///     .open_as::<PosixMessageQueue>()?;
/// println!("queue {origin:?}, holding {} messages", queue.num_msgs()?);
/// # std::io::Result::Ok(())
/// ```
pub struct PosixMessageQueue {
    mqd: mqd_t,
    max_msg_count: usize,
    max_msg_size: usize,
}
impl PosixMessageQueue {
    fn from_mqd(mqd: mqd_t) -> io::Result<Self> {
        let attr = match c_wrappers::mq_getattr(mqd) {
            Ok(attr) => attr,
            Err(e) => {
                if let Err(ce) = c_wrappers::mq_close(mqd) {
                    tracing::warn!(mqd, error = %ce, "failed to close message queue descriptor");
                }
                return Err(e);
            }
        };
        let to_usize = |v: libc::c_long| usize::try_from(v).unwrap_or(0);
        Ok(Self {
            mqd,
            max_msg_count: to_usize(attr.mq_maxmsg),
            max_msg_size: to_usize(attr.mq_msgsize),
        })
    }
}

fn c_name(name: &str) -> io::Result<CString> {
    let valid = matches!(name.strip_prefix('/'), Some(rest) if !rest.is_empty() && !rest.contains('/'));
    if !valid {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "POSIX message queue names must be a slash followed by at least one non-slash character",
        ));
    }
    CString::new(name)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "interior nul in queue name"))
}

impl MessageQueue for PosixMessageQueue {
    #[inline]
    fn try_send(&self, msg: &[u8]) -> io::Result<bool> { c_wrappers::mq_send(self.mqd, msg) }
    #[inline]
    fn try_receive(&self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        c_wrappers::mq_receive(self.mqd, buf)
    }
    #[inline]
    fn max_msg_size(&self) -> usize { self.max_msg_size }
    #[inline]
    fn max_msg_count(&self) -> usize { self.max_msg_count }
    fn num_msgs(&self) -> io::Result<usize> {
        let attr = c_wrappers::mq_getattr(self.mqd)?;
        Ok(usize::try_from(attr.mq_curmsgs).unwrap_or(0))
    }
}

impl NamedMessageQueue for PosixMessageQueue {
    fn open(options: &QueueOptions<'_>) -> io::Result<(Self, Origin)> {
        let name = c_name(options.get_name())?;
        let mode = options.get_mode();
        let base = libc::O_RDWR | libc::O_NONBLOCK;
        let create = |name: &CString| {
            let mut attr =
                c_wrappers::make_attr(options.get_max_msg_count(), options.get_max_msg_size())?;
            c_wrappers::mq_open(name, base | libc::O_CREAT | libc::O_EXCL, mode, Some(&mut attr))
        };
        let open = |name: &CString| c_wrappers::mq_open(name, base, 0, None);

        let (mqd, origin) = match options.get_open_mode() {
            OpenMode::CreateOnly => (create(&name)?, Origin::Created),
            OpenMode::OpenOnly => (open(&name)?, Origin::Opened),
            // Another process may create or remove the queue between the two calls, hence the loop.
            OpenMode::OpenOrCreate => loop {
                match create(&name) {
                    Ok(mqd) => break (mqd, Origin::Created),
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                    Err(e) => return Err(e),
                }
                match open(&name) {
                    Ok(mqd) => break (mqd, Origin::Opened),
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e),
                }
            },
        };
        Ok((Self::from_mqd(mqd)?, origin))
    }
    fn remove(name: &str) -> io::Result<bool> { c_wrappers::mq_unlink(&c_name(name)?) }
}

impl Drop for PosixMessageQueue {
    fn drop(&mut self) {
        if let Err(e) = c_wrappers::mq_close(self.mqd) {
            tracing::warn!(mqd = self.mqd, error = %e, "failed to close message queue descriptor");
        }
    }
}

impl Debug for PosixMessageQueue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PosixMessageQueue")
            .field("mqd", &self.mqd)
            .field("max_msg_count", &self.max_msg_count)
            .field("max_msg_size", &self.max_msg_size)
            .finish()
    }
}
