//! Unix-specific message queue primitives.
//!
//! ## POSIX message queues
//! Kernel-managed queues of discrete messages, identified by a name of the form `/name`. Every
//! queue has a maximum message count and a maximum message size fixed at creation, and messages
//! are always transferred whole. Queues persist until [removed](crate::NamedMessageQueue::remove)
//! or until the system reboots, independently of the processes that use them.
//!
//! Only Linux is supported. The default system-wide limits there allow 10 messages of 8 KiB per
//! queue for unprivileged processes; see `mq_overview(7)` for how to raise them.

#[cfg(target_os = "linux")]
mod c_wrappers;
#[cfg(target_os = "linux")]
#[cfg_attr(feature = "doc_cfg", doc(cfg(target_os = "linux")))]
mod mqueue;

#[cfg(target_os = "linux")]
pub use mqueue::*;
