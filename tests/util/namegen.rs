use super::Xorshift32;

/// Infinite iterator of queue names that are unlikely to be taken.
#[derive(Copy, Clone, Debug)]
pub struct NameGen {
    rng: Xorshift32,
    posix: bool,
}
impl NameGen {
    /// POSIX names have a leading slash; other primitives accept them either way.
    pub fn new(id: &'static str, posix: bool) -> Self {
        Self { rng: Xorshift32::from_id(id), posix }
    }
}
impl Iterator for NameGen {
    type Item = String;
    fn next(&mut self) -> Option<Self::Item> {
        let slash = if self.posix { "/" } else { "" };
        Some(format!("{slash}async-mq-test-{:08x}", self.rng.next()))
    }
}

macro_rules! make_id {
    () => {
        concat!(file!(), line!(), column!())
    };
}
