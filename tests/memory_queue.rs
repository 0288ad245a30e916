use {
    crate::{tests::util::*, MemoryQueue, MessageQueue, NamedMessageQueue, OpenMode, Origin, QueueOptions},
    color_eyre::eyre::{ensure, ContextCompat},
    std::io,
};

fn options() -> QueueOptions<'static> { QueueOptions::new().max_msg_count(2).max_msg_size(8) }

#[test]
fn origin_reports_prior_existence() -> TestResult {
    let mut namegen = NameGen::new(make_id!(), false);
    let (name, _first) = create_unique::<MemoryQueue>(&mut namegen, options())?;

    let (_opened, origin) = options().name(name.clone()).open_as::<MemoryQueue>()?;
    ensure_eq!(origin, Origin::Opened);
    ensure!(origin.existed(), "opened queue reported as fresh");

    let (_replacement, origin) =
        options().name(name.clone()).replace_existing(true).open_as::<MemoryQueue>()?;
    ensure_eq!(origin, Origin::Replaced);
    ensure!(origin.existed(), "replaced queue reported as fresh");

    ensure!(MemoryQueue::remove(&name)?, "remove did not find the queue");
    ensure!(!MemoryQueue::remove(&name)?, "remove found a queue twice");

    let (_fresh, origin) =
        options().name(name.clone()).replace_existing(true).open_as::<MemoryQueue>()?;
    ensure_eq!(origin, Origin::Created);
    ensure!(!origin.existed(), "fresh queue reported as preexisting");
    MemoryQueue::remove(&name)?;
    Ok(())
}

#[test]
fn open_modes() -> TestResult {
    let name = NameGen::new(make_id!(), false).next().context("no name")?;
    let opts = || options().name(name.clone());

    let err = opts().open_mode(OpenMode::OpenOnly).open_as::<MemoryQueue>().unwrap_err();
    ensure_eq!(err.kind(), io::ErrorKind::NotFound);

    let (created, origin) = opts().open_mode(OpenMode::CreateOnly).open_as::<MemoryQueue>()?;
    ensure_eq!(origin, Origin::Created);

    let err = opts().open_mode(OpenMode::CreateOnly).open_as::<MemoryQueue>().unwrap_err();
    ensure_eq!(err.kind(), io::ErrorKind::AlreadyExists);

    let (opened, _) = opts().open_mode(OpenMode::OpenOnly).open_as::<MemoryQueue>()?;
    ensure!(created.same_queue(&opened), "opened a different queue");
    MemoryQueue::remove(&name)?;
    Ok(())
}

#[test]
fn invalid_options() {
    let invalid = |opts: QueueOptions<'static>| {
        opts.open_as::<MemoryQueue>().map(drop).map_err(|e| e.kind())
    };
    let err = Err(io::ErrorKind::InvalidInput);
    assert_eq!(invalid(options()), err, "empty name accepted");
    assert_eq!(invalid(options().name("x").max_msg_count(0)), err, "zero count accepted");
    assert_eq!(invalid(options().name("x").max_msg_size(0)), err, "zero size accepted");
    assert_eq!(
        invalid(options().name("x").open_mode(OpenMode::OpenOnly).replace_existing(true)),
        err,
        "replacing with OpenOnly accepted",
    );
}

#[test]
fn full_empty_and_fifo() -> TestResult {
    let mut namegen = NameGen::new(make_id!(), false);
    let (name, q) = create_unique::<MemoryQueue>(&mut namegen, options())?;
    let mut buf = [0; 8];

    ensure_eq!(q.try_receive(&mut buf)?, None);
    ensure!(q.try_send(b"one")?, "send to empty queue failed");
    ensure!(q.try_send(b"")?, "send of empty message failed");
    ensure!(!q.try_send(b"three")?, "send to full queue succeeded");
    ensure_eq!(q.num_msgs()?, 2);

    ensure_eq!(q.try_receive(&mut buf)?, Some(3));
    ensure_eq!(&buf[..3], b"one");
    ensure_eq!(q.try_receive(&mut buf)?, Some(0));
    ensure_eq!(q.try_receive(&mut buf)?, None);
    MemoryQueue::remove(&name)?;
    Ok(())
}

#[test]
fn size_limits_are_errors() -> TestResult {
    let mut namegen = NameGen::new(make_id!(), false);
    let (name, q) = create_unique::<MemoryQueue>(&mut namegen, options())?;
    ensure_eq!(q.max_msg_size(), 8);
    ensure_eq!(q.max_msg_count(), 2);

    let err = q.try_send(&[0; 9]).unwrap_err();
    ensure_eq!(err.kind(), io::ErrorKind::InvalidInput);
    let err = q.try_receive(&mut [0; 7]).unwrap_err();
    ensure_eq!(err.kind(), io::ErrorKind::InvalidInput);
    MemoryQueue::remove(&name)?;
    Ok(())
}

#[test]
fn destroy_breaks_every_handle() -> TestResult {
    let mut namegen = NameGen::new(make_id!(), false);
    let (name, q) = create_unique::<MemoryQueue>(&mut namegen, options())?;
    let (other, _) = options().name(name.clone()).open_as::<MemoryQueue>()?;
    q.try_send(b"lost")?;

    other.destroy()?;
    ensure_eq!(q.try_send(b"x").unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    ensure_eq!(q.try_receive(&mut [0; 8]).unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    ensure_eq!(q.num_msgs().unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    ensure!(!MemoryQueue::remove(&name)?, "destroyed queue kept its name");
    Ok(())
}
