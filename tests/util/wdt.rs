use {
    super::TestResult,
    color_eyre::eyre::{bail, WrapErr},
    std::{
        panic,
        sync::mpsc::{self, RecvTimeoutError},
        thread,
        time::Duration,
    },
};

const TIMEOUT: Duration = Duration::from_secs(60);

/// Runs the test body on its own thread and fails the test if it doesn't finish in time. A retry
/// loop that never gets its message would otherwise hang the whole test binary.
pub(super) fn run_under_watchdog(f: impl (FnOnce() -> TestResult) + Send + 'static) -> TestResult {
    let (tx, rx) = mpsc::channel::<()>();
    let body = thread::Builder::new()
        .name("test body".to_owned())
        .spawn(move || {
            let r = f();
            let _ = tx.send(());
            r
        })
        .context("failed to spawn test body thread")?;
    match rx.recv_timeout(TIMEOUT) {
        // Disconnected means the body panicked before reporting; join to get at the payload.
        Ok(()) | Err(RecvTimeoutError::Disconnected) => match body.join() {
            Ok(r) => r,
            Err(payload) => panic::resume_unwind(payload),
        },
        Err(RecvTimeoutError::Timeout) => bail!("watchdog: test did not finish in {TIMEOUT:?}"),
    }
}
