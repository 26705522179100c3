//! The per-worker sampling loop.
//!
//! Geometry: the quarter circle x² + y² ≤ 1 with x, y in [0, 1] covers π/4
//! of the unit square, so the hit ratio of uniform points times 4
//! approximates π.

use crate::seed::SeedSources;                   // Clock and identity mixing for the seed
use rand::rngs::StdRng;                         // Per-worker generator, never shared
use rand::{RngCore, SeedableRng};               // Raw draws and seeding
use tracing::trace;                             // Per-worker progress events

/// One worker's private sampling state.
///
/// Owns its generator for its whole lifetime; nothing else ever draws from it.
#[derive(Debug)]
pub struct Sampler {
    worker: usize, // Index in spawn order, only used for tracing
    rng: StdRng,   // Private random stream of this worker
}

impl Sampler {
    /// Seed a fresh stream for `worker` from the current clocks.
    pub fn new(worker: usize) -> Self {
        let seed = SeedSources::capture(worker).seed();
        Self::with_seed(worker, seed)
    }

    /// Seed a stream explicitly, for reproducible runs.
    pub fn with_seed(worker: usize, seed: u64) -> Self {
        Sampler {
            worker,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw `samples` more points from this stream and return the hit count.
    pub fn sample(&mut self, samples: u64) -> u64 {
        count_hits(&mut self.rng, samples)
    }

    /// Run the whole assignment and give up the stream.
    pub fn run(mut self, samples: u64) -> u64 {
        let hits = self.sample(samples);
        trace!(worker = self.worker, samples, hits, "sampler finished");
        hits
    }
}

/// Count how many of `samples` random points land inside the quarter circle.
///
/// Performs exactly `samples` draw pairs; `samples == 0` returns 0 without
/// touching the generator.
pub fn count_hits<R: RngCore + ?Sized>(rng: &mut R, samples: u64) -> u64 {
    let mut hits = 0; // Points inside the quarter circle

    for _ in 0..samples {
        let x = to_unit(rng.next_u32()); // x coordinate in [0, 1]
        let y = to_unit(rng.next_u32()); // y coordinate in [0, 1]

        // Inside when x² + y² ≤ 1
        if x * x + y * y <= 1.0 {
            hits += 1;
        }
    }

    hits
}

/// Scale a raw draw by the generator's maximum output.
#[inline]
fn to_unit(raw: u32) -> f64 {
    f64::from(raw) / f64::from(u32::MAX)
}
