//! Per-thread RNG seeded from a mutex-guarded process-wide stream.
//!
//! Grounded on `examples/original_source/src/Rng.h`/`.cpp`'s mutex-guarded `mt19937`, adapted to
//! the permitted deviation noted in `SPEC_FULL.md` §5/§12: one `StdRng` per worker thread, each
//! seeded once at spawn time from a shared mutex-guarded seed counter, instead of a single
//! generator locked on every draw.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

static SEED_STREAM: Mutex<u64> = Mutex::new(0);

/// Seeds the process-wide stream explicitly (used by tests that need determinism).
pub fn seed(value: u64) {
    *SEED_STREAM.lock().unwrap() = value;
}

/// Draws the next seed from the shared stream and advances it. Safe to call concurrently.
#[must_use]
pub fn next_seed() -> u64 {
    let mut guard = SEED_STREAM.lock().unwrap();
    let seed = *guard;
    *guard = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    seed
}

/// Builds a fresh `StdRng` seeded from the shared stream.
#[must_use]
pub fn thread_rng() -> StdRng {
    StdRng::seed_from_u64(next_seed())
}

/// Draws a value in `[min, max)` from the given generator, mirroring `Rng::next(min, max)`.
pub fn next_range(rng: &mut StdRng, min: i64, max: i64) -> i64 {
    rng.random_range(min..max)
}
