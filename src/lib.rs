#![doc = include_str!("../README.md")]
#![cfg_attr(feature = "doc_cfg", feature(doc_cfg))]
// If this was in Cargo.toml, it would cover examples as well
#![warn(
    missing_docs,
    clippy::panic_in_result_fn,
    clippy::missing_assert_message,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

#[macro_use]
mod macros;

pub mod async_queue;
pub mod error;
pub mod queue;
pub mod scheduler;

/// Platform-specific message queue primitives.
///
/// Only the `unix` module exists at the moment, and only Linux has a backend in it. The
/// portable, process-local [`MemoryQueue`](crate::queue::MemoryQueue) is available everywhere.
pub mod os {
    #[cfg(unix)]
    #[cfg_attr(feature = "doc_cfg", doc(cfg(unix)))]
    pub mod unix;
}

pub use {
    async_queue::{AsyncMessageQueue, CancellationSlot, RebindScheduler, Rebound},
    error::{Error, ErrorKind, RebindError, Result},
    queue::{MemoryQueue, MessageQueue, NamedMessageQueue, OpenMode, Origin, QueueOptions},
    scheduler::{RunLoop, RunLoopHandle, Scheduler},
};

mod misc;
pub(crate) use misc::*;

#[cfg(test)]
#[path = "../tests/index.rs"]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::indexing_slicing)]
mod tests;
