use std::time::{SystemTime, UNIX_EPOCH};

/// The 32-bit variant of the Xorshift PRNG algorithm.
///
/// Didn't feel like pulling in the `rand` crate, so have this here beauty instead.
#[repr(transparent)]
#[derive(Copy, Clone, Debug)]
pub struct Xorshift32(pub u32);
impl Xorshift32 {
    /// Seeds from the identifier of the call site mixed with the current time, so that
    /// concurrently running tests and repeated runs both pick different sequences.
    pub fn from_id(id: &str) -> Self {
        let dur = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_else(|e| e.duration());
        // FNV-1a
        let hash = id
            .bytes()
            .fold(0x811c_9dc5_u32, |h, b| (h ^ u32::from(b)).wrapping_mul(0x0100_0193));
        let seed = hash ^ dur.subsec_nanos() ^ std::process::id();
        Self(if seed == 0 { 0xdead_beef } else { seed })
    }
    pub fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }
}
impl Iterator for Xorshift32 {
    type Item = u32;
    fn next(&mut self) -> Option<Self::Item> { Some(self.next()) }
}
