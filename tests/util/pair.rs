use {
    super::{create_unique, NameGen, TestResult},
    crate::{AsyncMessageQueue, MessageQueue, NamedMessageQueue, OpenMode, QueueOptions, Scheduler},
    color_eyre::eyre::{ensure, WrapErr},
    std::{
        sync::{
            atomic::{AtomicUsize, Ordering::*},
            Arc, Condvar, Mutex,
        },
        time::Duration,
    },
};

/// Two adapters on the same queue, as the two ends of a channel would have.
pub struct Pair<Q, S> {
    pub name: String,
    pub producer: Arc<AsyncMessageQueue<Q, S>>,
    pub consumer: Arc<AsyncMessageQueue<Q, S>>,
}
pub fn open_pair<Q: NamedMessageQueue, S: Scheduler>(
    namegen: &mut NameGen,
    options: QueueOptions<'static>,
    scheduler: S,
) -> TestResult<Pair<Q, S>> {
    let (name, created) = create_unique::<Q>(namegen, options.clone())?;
    let (opened, origin) = options
        .name(name.clone())
        .open_mode(OpenMode::OpenOnly)
        .replace_existing(false)
        .open_as::<Q>()
        .context("second handle failed to open")?;
    ensure!(origin.existed(), "second handle reported a fresh queue");
    Ok(Pair {
        name,
        producer: AsyncMessageQueue::new(scheduler.clone(), created),
        consumer: AsyncMessageQueue::new(scheduler, opened),
    })
}

/// What a producer/consumer run observed.
#[derive(Default)]
pub struct Tally {
    pub sent: AtomicUsize,
    pub received: AtomicUsize,
    errors: Mutex<Vec<String>>,
    finished: Mutex<usize>,
    finished_cv: Condvar,
}
impl Tally {
    fn error(&self, e: String) {
        self.errors.lock().unwrap().push(e);
        self.finish();
    }
    fn finish(&self) {
        *self.finished.lock().unwrap() += 1;
        self.finished_cv.notify_all();
    }
    /// Blocks until both the producer and the consumer have stopped.
    pub fn wait(&self, timeout: Duration) -> TestResult {
        let finished = self.finished.lock().unwrap();
        let (finished, res) =
            self.finished_cv.wait_timeout_while(finished, timeout, |f| *f < 2).unwrap();
        ensure!(!res.timed_out(), "only {} of 2 sides finished in {timeout:?}", *finished);
        Ok(())
    }
    /// Checks that every message made it across, in order, without errors.
    pub fn verify(&self, total: usize) -> TestResult {
        let errors = self.errors.lock().unwrap();
        ensure!(errors.is_empty(), "errors occurred: {errors:#?}");
        ensure_eq!(self.sent.load(SeqCst), total);
        ensure_eq!(self.received.load(SeqCst), total);
        Ok(())
    }
}

/// Starts sending `0..total` as decimal strings through `producer` and receiving them through
/// `consumer`, one outstanding operation per side, each next operation posted from the handler of
/// the previous one. Nothing happens until the scheduler runs.
pub fn start_producer_consumer<Q, S>(
    producer: &Arc<AsyncMessageQueue<Q, S>>,
    consumer: &Arc<AsyncMessageQueue<Q, S>>,
    total: usize,
) -> Arc<Tally>
where
    Q: MessageQueue + 'static,
    S: Scheduler,
{
    let tally = Arc::new(Tally::default());
    send_next(Arc::clone(producer), Arc::clone(&tally), total);
    let buf = vec![0; consumer.max_msg_size()];
    receive_next(Arc::clone(consumer), Arc::clone(&tally), total, buf);
    tally
}

fn send_next<Q: MessageQueue + 'static, S: Scheduler>(
    amq: Arc<AsyncMessageQueue<Q, S>>,
    tally: Arc<Tally>,
    total: usize,
) {
    let n = tally.sent.fetch_add(1, SeqCst);
    let msg = n.to_string();
    let expected_len = msg.len();
    let amqc = Arc::clone(&amq);
    amq.async_write(msg, move |r, _| {
        match r {
            Ok(len) if len == expected_len => {}
            Ok(len) => return tally.error(format!("send {n}: wrote {len} of {expected_len}")),
            Err(e) => return tally.error(format!("send {n}: {e}")),
        }
        if n + 1 >= total {
            return tally.finish();
        }
        let sched = amqc.get_scheduler().clone();
        sched.post(move || send_next(amqc, tally, total));
    });
}

fn receive_next<Q: MessageQueue + 'static, S: Scheduler>(
    amq: Arc<AsyncMessageQueue<Q, S>>,
    tally: Arc<Tally>,
    total: usize,
    buf: Vec<u8>,
) {
    let amqc = Arc::clone(&amq);
    amq.async_read(buf, move |r, buf| {
        let expected = tally.received.load(SeqCst);
        let len = match r {
            Ok(len) => len,
            Err(e) => return tally.error(format!("receive {expected}: {e}")),
        };
        let got = std::str::from_utf8(&buf[..len]).ok().and_then(|s| s.parse::<usize>().ok());
        if got != Some(expected) {
            return tally.error(format!("receive {expected}: got {:?}", &buf[..len]));
        }
        if tally.received.fetch_add(1, SeqCst) + 1 >= total {
            return tally.finish();
        }
        let sched = amqc.get_scheduler().clone();
        sched.post(move || receive_next(amqc, tally, total, buf));
    });
}
