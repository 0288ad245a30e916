use {
    crate::OrErrno,
    libc::{c_int, c_long, mode_t, mq_attr, mqd_t},
    std::{ffi::CStr, io, mem, ptr},
};

/// Maps the errors that only mean "try again later" to `None`.
fn would_block<T>(r: io::Result<T>) -> io::Result<Option<T>> {
    match r {
        Ok(v) => Ok(Some(v)),
        Err(e) if matches!(e.raw_os_error(), Some(libc::EAGAIN | libc::EINTR)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn to_c_long(val: usize, what: &str) -> io::Result<c_long> {
    c_long::try_from(val).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("{what} does not fit in a C long"))
    })
}

pub(super) fn make_attr(max_msg_count: usize, max_msg_size: usize) -> io::Result<mq_attr> {
    // SAFETY: mq_attr is a plain C struct, for which all-zeroes is a valid value.
    let mut attr: mq_attr = unsafe { mem::zeroed() };
    attr.mq_maxmsg = to_c_long(max_msg_count, "maximum message count")?;
    attr.mq_msgsize = to_c_long(max_msg_size, "maximum message size")?;
    Ok(attr)
}

pub(super) fn mq_open(
    name: &CStr,
    oflag: c_int,
    mode: mode_t,
    attr: Option<&mut mq_attr>,
) -> io::Result<mqd_t> {
    let attr = attr.map_or(ptr::null_mut(), |a| a as *mut mq_attr);
    let mqd = unsafe { libc::mq_open(name.as_ptr(), oflag | libc::O_CLOEXEC, mode, attr) };
    (mqd != -1).true_val_or_errno(mqd)
}

/// Returns `false` if no queue by that name existed.
pub(super) fn mq_unlink(name: &CStr) -> io::Result<bool> {
    let success = unsafe { libc::mq_unlink(name.as_ptr()) != -1 };
    match success.true_val_or_errno(true) {
        Err(e) if e.raw_os_error() == Some(libc::ENOENT) => Ok(false),
        other => other,
    }
}

pub(super) fn mq_getattr(mqd: mqd_t) -> io::Result<mq_attr> {
    // SAFETY: as in make_attr
    let mut attr: mq_attr = unsafe { mem::zeroed() };
    let success = unsafe { libc::mq_getattr(mqd, &mut attr) != -1 };
    success.true_val_or_errno(attr)
}

/// Returns `false` if the queue is full.
pub(super) fn mq_send(mqd: mqd_t, msg: &[u8]) -> io::Result<bool> {
    let success = unsafe { libc::mq_send(mqd, msg.as_ptr().cast(), msg.len(), 0) != -1 };
    Ok(would_block(success.true_val_or_errno(()))?.is_some())
}

/// Returns `None` if the queue is empty.
pub(super) fn mq_receive(mqd: mqd_t, buf: &mut [u8]) -> io::Result<Option<usize>> {
    let ret = unsafe {
        libc::mq_receive(mqd, buf.as_mut_ptr().cast(), buf.len(), ptr::null_mut())
    };
    #[allow(clippy::cast_sign_loss)] // checked
    let r = (ret >= 0).true_or_errno(|| ret as usize);
    would_block(r)
}

pub(super) fn mq_close(mqd: mqd_t) -> io::Result<()> {
    let success = unsafe { libc::mq_close(mqd) != -1 };
    success.true_val_or_errno(())
}
