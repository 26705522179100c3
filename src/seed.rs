//! Seed derivation for per-worker random streams.
//!
//! Workers started in the same instant read nearly identical clocks. Feeding
//! such a reading straight into a generator gives them overlapping streams,
//! so the seed is built from three weakly independent inputs pushed through
//! a non-linear mix:
//!
//! ```text
//! clock    = nanoseconds since the first seed request in this process
//! wall     = seconds since the Unix epoch
//! identity = process id << 32 | worker index
//! seed     = finalize(mix(clock, wall, identity))
//! ```
//!
//! `mix` is Bob Jenkins' 96-bit integer mix widened to 64-bit words;
//! `finalize` is the SplitMix64 output function, which spreads any change in
//! the mixed word over all 64 output bits.

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// The three raw inputs a worker seed is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSources {
    /// High-resolution monotonic clock reading
    pub clock: u64,
    /// Wall-clock time
    pub wall: u64,
    /// Worker identity, unique within the process
    pub identity: u64,
}

impl SeedSources {
    /// Read the clocks for `worker`.
    ///
    /// Called from inside the worker right before its stream is seeded.
    pub fn capture(worker: usize) -> Self {
        let anchor = *CLOCK_ANCHOR.get_or_init(Instant::now);
        let clock = anchor.elapsed().as_nanos() as u64;
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let identity = (u64::from(std::process::id()) << 32) | worker as u64;

        SeedSources {
            clock,
            wall,
            identity,
        }
    }

    /// The seed for these sources.
    pub fn seed(&self) -> u64 {
        derive_seed(self.clock, self.wall, self.identity)
    }
}

static CLOCK_ANCHOR: OnceLock<Instant> = OnceLock::new();

/// Derive a generator seed from a clock reading, wall time and worker identity.
///
/// Pure: equal inputs give equal seeds, and a one-bit change in any input
/// flips about half of the output bits.
#[inline]
pub fn derive_seed(clock: u64, wall: u64, identity: u64) -> u64 {
    finalize(mix(clock, wall, identity))
}

/// Jenkins' reversible 96-bit mix on 64-bit words; returns the third word.
pub fn mix(a: u64, b: u64, c: u64) -> u64 {
    let (mut a, mut b, mut c) = (a, b, c);

    a = a.wrapping_sub(b).wrapping_sub(c) ^ (c >> 13);
    b = b.wrapping_sub(c).wrapping_sub(a) ^ (a << 8);
    c = c.wrapping_sub(a).wrapping_sub(b) ^ (b >> 13);
    a = a.wrapping_sub(b).wrapping_sub(c) ^ (c >> 12);
    b = b.wrapping_sub(c).wrapping_sub(a) ^ (a << 16);
    c = c.wrapping_sub(a).wrapping_sub(b) ^ (b >> 5);
    a = a.wrapping_sub(b).wrapping_sub(c) ^ (c >> 3);
    b = b.wrapping_sub(c).wrapping_sub(a) ^ (a << 10);
    c = c.wrapping_sub(a).wrapping_sub(b) ^ (b >> 15);

    c
}

#[inline]
fn finalize(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
