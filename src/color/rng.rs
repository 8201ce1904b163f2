//! Seeded generator used by color derivation.
//!
//! Every issued avatar depends on the exact seed -> integer stream produced here, so both the
//! generator and the integer range mapping are pinned. Changing either re-colors every account.

use rand_core::RngCore;
use rand_pcg::Pcg32;

/// Stream selector passed to `Pcg32::new` alongside the seed.
pub const PCG_STREAM: u64 = 0x0a02_bdbf_7bb3_c0a7;

/// A deterministic source of bounded integers, seeded once per color channel.
pub trait SeedSource {
    /// Build a fresh instance from a seed. Instances never share state.
    fn from_seed(seed: u32) -> Self
    where
        Self: Sized;

    /// Uniform integer in `[0, n)`. A non-positive `n` collapses to `0`.
    fn int31n(&mut self, n: i32) -> i32;
}

/// PCG-XSH-RR 64/32 with 31-bit rejection sampling.
#[derive(Clone, Debug)]
pub struct PinnedRng {
    inner: Pcg32,
}

impl PinnedRng {
    fn int31(&mut self) -> i32 {
        (self.inner.next_u32() >> 1) as i32
    }
}

impl SeedSource for PinnedRng {
    fn from_seed(seed: u32) -> Self {
        Self {
            inner: Pcg32::new(u64::from(seed), PCG_STREAM),
        }
    }

    fn int31n(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        if n & (n - 1) == 0 {
            return self.int31() & (n - 1);
        }
        let max = i32::MAX - ((1u32 << 31) % n as u32) as i32;
        let mut v = self.int31();
        while v > max {
            v = self.int31();
        }
        v % n
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/rng.rs"]
mod tests;
