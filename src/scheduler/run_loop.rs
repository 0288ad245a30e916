use {
    super::Scheduler,
    crate::{poison_error, OnDrop},
    std::{
        cell::RefCell,
        collections::VecDeque,
        fmt::{self, Debug, Formatter},
        io,
        sync::{Arc, Condvar, Mutex, MutexGuard},
        thread,
    },
};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Shared {
    state: Mutex<State>,
    cvar: Condvar,
}
#[derive(Default)]
struct State {
    queue: VecDeque<Job>,
    /// Number of jobs currently executing on some thread.
    active: usize,
    stopped: bool,
}

thread_local! {
    /// Continuations deferred by the job that is currently executing on this thread, if any.
    static DEFERRED: RefCell<Option<Vec<(Arc<Shared>, Job)>>> = const { RefCell::new(None) };
}

impl Shared {
    fn lock(&self) -> io::Result<MutexGuard<'_, State>> { self.state.lock().map_err(poison_error) }

    fn push(&self, job: Job) {
        // Jobs never run under the lock, so poisoning can only come from a bug in this module.
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.queue.push_back(job);
        drop(state);
        self.cvar.notify_one();
    }

    /// Takes the next job off the queue, waiting for one to arrive for as long as other threads
    /// are still executing jobs if `block` is set.
    fn next_job(&self, block: bool) -> io::Result<Option<Job>> {
        let mut state = self.lock()?;
        loop {
            if state.stopped {
                return Ok(None);
            }
            if let Some(job) = state.queue.pop_front() {
                state.active = state.active.saturating_add(1);
                return Ok(Some(job));
            }
            if state.active == 0 || !block {
                self.cvar.notify_all();
                return Ok(None);
            }
            state = self.cvar.wait(state).map_err(poison_error)?;
        }
    }

    fn execute(self: &Arc<Self>, job: Job) {
        let outer = DEFERRED.with(|d| d.replace(Some(Vec::new())));
        let _finish = OnDrop::new(|| {
            let deferred = DEFERRED.with(|d| d.replace(outer)).unwrap_or_default();
            for (target, job) in deferred {
                target.push(job);
            }
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.active = state.active.saturating_sub(1);
            let idle = state.active == 0 && state.queue.is_empty();
            drop(state);
            if idle {
                self.cvar.notify_all();
            }
        });
        job();
    }
}

/// A work queue that executes scheduled closures on the threads that call [`run()`](Self::run).
///
/// The loop itself is not a [`Scheduler`]; [`handle()`](Self::handle) gives out clonable
/// [`RunLoopHandle`]s which are. Closures submitted through handles sit in the queue until some
/// thread drives the loop, so an asynchronous operation scheduled onto a run loop that is never
/// run never completes.
///
/// # Deferral
/// Closures [deferred](Scheduler::defer) from within a closure that the loop is executing are
/// held back until that closure returns, and are then appended to the queue. Deferring from any
/// other context is the same as posting.
pub struct RunLoop {
    shared: Arc<Shared>,
}
impl RunLoop {
    /// Creates an empty run loop.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::default()),
                cvar: Condvar::new(),
            }),
        }
    }
    /// Returns a scheduler handle which submits work to this loop.
    #[inline]
    pub fn handle(&self) -> RunLoopHandle { RunLoopHandle { shared: Arc::clone(&self.shared) } }

    /// Runs scheduled closures until there are none left, the loop is stopped, or a lock is found
    /// poisoned. Returns the number of closures executed.
    ///
    /// When called from several threads at once, every thread keeps running until the queue is
    /// empty and no other thread is executing a closure that might schedule more.
    pub fn run(&self) -> io::Result<usize> {
        let mut n = 0_usize;
        while let Some(job) = self.shared.next_job(true)? {
            self.shared.execute(job);
            n = n.saturating_add(1);
        }
        Ok(n)
    }
    /// Runs at most one closure, blocking while other threads might still schedule one. Returns
    /// whether a closure was executed.
    pub fn run_one(&self) -> io::Result<bool> {
        match self.shared.next_job(true)? {
            Some(job) => {
                self.shared.execute(job);
                Ok(true)
            }
            None => Ok(false),
        }
    }
    /// Runs the closures that are queued when the call starts, without waiting for others to be
    /// scheduled. Returns the number of closures executed.
    ///
    /// Closures scheduled while polling, including the retries of pending operations, are left
    /// for the next call to `poll()` or [`run()`](Self::run).
    pub fn poll(&self) -> io::Result<usize> {
        let ready = self.shared.lock()?.queue.len();
        let mut n = 0_usize;
        while n < ready {
            let Some(job) = self.shared.next_job(false)? else { break };
            self.shared.execute(job);
            n = n.saturating_add(1);
        }
        Ok(n)
    }
    /// Runs the loop on `threads` threads, the current one included, and returns the total number
    /// of closures executed once all of them finish. A `threads` of 0 is treated as 1.
    ///
    /// # Panics
    /// If a scheduled closure panics, the panic is propagated once all threads have finished.
    pub fn run_on_threads(&self, threads: usize) -> io::Result<usize> {
        thread::scope(|scope| {
            let workers = (1..threads).map(|_| scope.spawn(|| self.run())).collect::<Vec<_>>();
            let mut total = self.run()?;
            for worker in workers {
                let n = match worker.join() {
                    Ok(r) => r?,
                    Err(payload) => std::panic::resume_unwind(payload),
                };
                total = total.saturating_add(n);
            }
            Ok(total)
        })
    }

    /// Makes all threads running the loop return as soon as they finish their current closure.
    /// Queued closures are kept until the loop is [restarted](Self::restart).
    pub fn stop(&self) -> io::Result<()> {
        self.shared.lock()?.stopped = true;
        self.shared.cvar.notify_all();
        Ok(())
    }
    /// Clears the stopped state set by [`stop()`](Self::stop).
    pub fn restart(&self) -> io::Result<()> {
        self.shared.lock()?.stopped = false;
        Ok(())
    }
    /// Returns whether the loop is stopped.
    pub fn is_stopped(&self) -> io::Result<bool> { Ok(self.shared.lock()?.stopped) }
    /// Returns the number of closures waiting in the queue.
    pub fn queued(&self) -> io::Result<usize> { Ok(self.shared.lock()?.queue.len()) }
}
impl Default for RunLoop {
    #[inline]
    fn default() -> Self { Self::new() }
}
impl Debug for RunLoop {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { debug_shared("RunLoop", &self.shared, f) }
}

/// Clonable [`Scheduler`] handle to a [`RunLoop`].
#[derive(Clone)]
pub struct RunLoopHandle {
    shared: Arc<Shared>,
}
impl RunLoopHandle {
    /// Returns whether both handles submit work to the same loop.
    #[inline]
    pub fn same_loop(&self, other: &Self) -> bool { Arc::ptr_eq(&self.shared, &other.shared) }
}
impl Scheduler for RunLoopHandle {
    #[inline]
    fn post<F: FnOnce() + Send + 'static>(&self, f: F) { self.shared.push(Box::new(f)) }
    fn defer<F: FnOnce() + Send + 'static>(&self, f: F) {
        let job: Job = Box::new(f);
        let job = DEFERRED.with(|d| match d.borrow_mut().as_mut() {
            Some(deferred) => {
                deferred.push((Arc::clone(&self.shared), job));
                None
            }
            None => Some(job),
        });
        if let Some(job) = job {
            self.shared.push(job);
        }
    }
}
impl Debug for RunLoopHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        debug_shared("RunLoopHandle", &self.shared, f)
    }
}

fn debug_shared(name: &str, shared: &Shared, f: &mut Formatter<'_>) -> fmt::Result {
    let mut dbs = f.debug_struct(name);
    if let Ok(state) = shared.state.try_lock() {
        dbs.field("queued", &state.queue.len())
            .field("active", &state.active)
            .field("stopped", &state.stopped);
    }
    dbs.finish_non_exhaustive()
}
