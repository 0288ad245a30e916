//! A producer and a consumer exchanging numbered messages over one queue, driven by a run loop
//! on two threads.
//!
//! Pass `--posix` on Linux to go through a POSIX message queue instead of the process-local one.
//! Set `RUST_LOG=async_message_queue=trace` to watch the retries.

use {
    async_message_queue::{
        AsyncMessageQueue, MemoryQueue, NamedMessageQueue, OpenMode, QueueOptions, RunLoop,
        RunLoopHandle, Scheduler,
    },
    std::{io, sync::Arc},
};

const COUNT: u32 = 20;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if std::env::args().any(|a| a == "--posix") {
        return run_posix();
    }
    run::<MemoryQueue>("producer-consumer-demo")
}

#[cfg(target_os = "linux")]
fn run_posix() -> io::Result<()> {
    run::<async_message_queue::os::unix::PosixMessageQueue>("/producer-consumer-demo")
}
#[cfg(not(target_os = "linux"))]
fn run_posix() -> io::Result<()> {
    eprintln!("POSIX message queues are only supported on Linux");
    Ok(())
}

fn run<Q: NamedMessageQueue + 'static>(name: &str) -> io::Result<()> {
    let options = QueueOptions::new().name(name).max_msg_count(4).max_msg_size(64);
    // A capacity of 4 means the producer runs ahead of the consumer by at most that many messages
    // and spends the rest of its time retrying.
    let rl = RunLoop::new();
    let (producer, origin) =
        options.clone().replace_existing(true).open_async_as::<Q, _>(rl.handle())?;
    eprintln!("Queue {name} {origin:?}");
    let (consumer, _) = options.open_mode(OpenMode::OpenOnly).open_async_as::<Q, _>(rl.handle())?;

    send(producer, 0);
    receive(consumer, vec![0; 64]);
    let jobs = rl.run_on_threads(2)?;
    eprintln!("Done after {jobs} scheduled closures");

    Q::remove(name)?;
    Ok(())
}

fn send<Q: NamedMessageQueue + 'static>(amq: Arc<AsyncMessageQueue<Q, RunLoopHandle>>, n: u32) {
    let next = Arc::clone(&amq);
    amq.async_write(format!("Message #{n}"), move |r, msg| match r {
        Ok(_) if n + 1 < COUNT => {
            let sched = next.get_scheduler().clone();
            sched.post(move || send(next, n + 1));
        }
        Ok(_) => eprintln!("Producer: sent {COUNT} messages, last one {msg:?}"),
        Err(e) => eprintln!("Producer: {msg:?} failed: {e}"),
    });
}

fn receive<Q: NamedMessageQueue + 'static>(
    amq: Arc<AsyncMessageQueue<Q, RunLoopHandle>>,
    buf: Vec<u8>,
) {
    let next = Arc::clone(&amq);
    amq.async_read(buf, move |r, buf| {
        let len = match r {
            Ok(len) => len,
            Err(e) => return eprintln!("Consumer: {e}"),
        };
        let msg = String::from_utf8_lossy(buf.get(..len).unwrap_or_default()).into_owned();
        println!("Consumer: {msg}");
        if msg != format!("Message #{}", COUNT - 1) {
            let sched = next.get_scheduler().clone();
            sched.post(move || receive(next, buf));
        }
    });
}
