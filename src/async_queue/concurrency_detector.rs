use std::{
    fmt::{self, Debug, Formatter},
    sync::atomic::{AtomicBool, Ordering::*},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum Direction {
    Read,
    Write,
}
impl Direction {
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Flags the direction of an adapter as occupied from the initiation of an operation until its
/// completion, which may span any number of scheduled steps.
pub(super) struct ConcurrencyDetector {
    busy: AtomicBool,
    dir: Direction,
}
impl ConcurrencyDetector {
    pub const fn new(dir: Direction) -> Self { Self { busy: AtomicBool::new(false), dir } }
    #[track_caller]
    pub fn begin(&self) {
        if self.busy.compare_exchange(false, true, Acquire, Relaxed).is_err() {
            concurrency_detected(self.dir);
        }
    }
    #[inline]
    pub fn end(&self) { self.busy.store(false, Release) }
    #[inline]
    pub fn is_busy(&self) -> bool { self.busy.load(Acquire) }
}
#[cold]
#[track_caller]
fn concurrency_detected(dir: Direction) -> ! {
    let verb = dir.verb();
    panic!(
        "\
concurrent {verb}s on an asynchronous message queue attempted – only one {verb} may be in flight \
at a time, since overlapping ones would race on the underlying queue",
    )
}
impl Debug for ConcurrencyDetector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrencyDetector")
            .field("busy", &self.busy)
            .field("dir", &self.dir)
            .finish()
    }
}
