use std::{io, sync::PoisonError};

pub(crate) static LOCK_POISON: &str = "unexpected lock poison";
pub(crate) fn poison_error<T>(_: PoisonError<T>) -> io::Error { io::Error::other(LOCK_POISON) }

/// Turns the success flag of a C call into a result, picking up `errno` on failure.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) trait OrErrno<T>: Sized {
    fn true_or_errno(self, f: impl FnOnce() -> T) -> io::Result<T>;
    #[inline(always)]
    fn true_val_or_errno(self, value: T) -> io::Result<T> { self.true_or_errno(|| value) }
}
impl<T> OrErrno<T> for bool {
    #[inline]
    fn true_or_errno(self, f: impl FnOnce() -> T) -> io::Result<T> {
        if self {
            Ok(f())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

/// Runs the wrapped closure when dropped, which includes unwinding out of the scope that owns
/// it.
pub(crate) struct OnDrop<F: FnOnce()>(Option<F>);
impl<F: FnOnce()> OnDrop<F> {
    #[inline]
    pub fn new(f: F) -> Self { Self(Some(f)) }
}
impl<F: FnOnce()> Drop for OnDrop<F> {
    #[inline]
    fn drop(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}
