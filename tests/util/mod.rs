//! Test utilities for picking unused queue names, guarding tests with a watchdog, and driving a
//! producer and a consumer over a pair of asynchronous queues.
#![allow(dead_code, unused_macros)]

#[macro_use]
mod eyre;
#[macro_use]
mod namegen;
mod pair;
mod wdt;
mod xorshift;

#[allow(unused_imports)]
pub use {eyre::*, namegen::*, pair::*, xorshift::*};

use {
    crate::{NamedMessageQueue, QueueOptions},
    color_eyre::eyre::WrapErr,
    std::io,
};

fn intvar(nam: &str) -> Option<u32> {
    let val = std::env::var(nam).ok()?;
    val.trim().parse().ok()
}
/// Number of messages exchanged by producer/consumer tests.
pub fn num_msgs() -> u32 { intvar("ASYNC_MQ_TEST_NUM_MSGS").filter(|n| *n > 0).unwrap_or(1000) }

pub fn test_wrapper(f: impl (FnOnce() -> TestResult) + Send + 'static) -> TestResult {
    eyre::install();
    self::wdt::run_under_watchdog(f)
}

/// Creates a queue under the first generated name that isn't taken, forcing
/// [`CreateOnly`](crate::OpenMode::CreateOnly) so that no other test's queue gets opened by
/// accident.
pub fn create_unique<Q: NamedMessageQueue>(
    namegen: &mut NameGen,
    options: QueueOptions<'static>,
) -> TestResult<(String, Q)> {
    use crate::OpenMode;
    let name_and_queue = namegen
        .find_map(|nm| {
            let opts = options
                .clone()
                .name(nm.clone())
                .open_mode(OpenMode::CreateOnly)
                .replace_existing(false);
            match opts.open_as::<Q>() {
                Ok((q, _)) => Some(Ok((nm, q))),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    eprintln!("{nm:?} is taken, skipping");
                    None
                }
                Err(e) => Some(Err(e)),
            }
        })
        .unwrap() // Infinite iterator
        .context("message queue creation failed")?;
    Ok(name_and_queue)
}
