// Deterministic, portable pseudo-random number generation for the cantus
// firmus generator.
//
// Implements xoshiro256++ (Blackman & Vigna, 2019) with SplitMix64 seeding.
// Hand-rolled so that a given seed produces the same melody on every
// platform and compiler version.
//
// Randomness is injected, never global: every consumer takes
// `&mut impl RandomSource`. `CantusRng` is the production source; tests can
// substitute scripted sources by implementing only `next_u64`.
//
// Also provides `WeightedBag` (bag.rs), the weighted draw-without-replacement
// container used by the candidate generator in `cantus_music`.
//
// **Critical constraint: determinism.** Every method must produce identical
// output given the same prior state. Do not use floating-point arithmetic in
// the core generator.

pub mod bag;

pub use bag::WeightedBag;

use serde::{Deserialize, Serialize};

/// A source of uniformly distributed random bits.
///
/// Only `next_u64` is required; the derived helpers are expressed in terms of
/// it so that every implementation consumes the stream identically.
pub trait RandomSource {
    /// Generate the next `u64` in the sequence.
    fn next_u64(&mut self) -> u64;

    /// Generate a uniform `f64` in [0, 1).
    ///
    /// Uses the upper 53 bits of a `u64` to fill the mantissa.
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Generate a uniform random integer in `[low, high)`.
    ///
    /// Uses rejection sampling to avoid modulo bias.
    /// Panics if `low >= high`.
    fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "range_u64: low must be less than high");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range; // = (2^64 - range) % range
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// Generate a uniform random `usize` in `[low, high)`.
    fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Generate a uniform random `usize` in `[low, high]`.
    ///
    /// Panics if `low > high`.
    fn range_usize_inclusive(&mut self, low: usize, high: usize) -> usize {
        assert!(low <= high, "range_usize_inclusive: low must be <= high");
        self.range_u64(low as u64, high as u64 + 1) as usize
    }

    /// Return `true` with probability `p`.
    ///
    /// `p <= 0.0` always returns false, `p >= 1.0` always returns true.
    fn random_bool(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick a uniformly random element of a slice, or `None` if it is empty.
    fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.range_usize(0, items.len()))
    }
}

/// Xoshiro256++ PRNG, the generator's sole production source of randomness.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CantusRng {
    s: [u64; 4],
}

impl CantusRng {
    /// Create a new PRNG seeded from a `u64`.
    ///
    /// Uses SplitMix64 to expand the seed into the 256-bit internal state.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Create a PRNG from process entropy, for runs without an explicit seed.
    ///
    /// Mixes the wall clock with the address-space randomisation of a stack
    /// local. Not suitable for anything security related.
    pub fn from_entropy() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let marker = 0u8;
        let addr = &marker as *const u8 as u64;
        Self::new(nanos ^ addr.rotate_left(32))
    }
}

impl RandomSource for CantusRng {
    fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn determinism_same_seed_same_output() {
        let mut a = CantusRng::new(42);
        let mut b = CantusRng::new(42);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn known_sequence_from_seed_zero() {
        // If this ever breaks, every seeded melody changes with it.
        let mut rng = CantusRng::new(0);
        assert_eq!(
            rng.s,
            [
                0xe220_a839_7b1d_cdaf,
                0x6e78_9e6a_a1b9_65f4,
                0x06c4_5d18_8009_454f,
                0xf88b_b8a8_724c_81ec,
            ]
        );
        let vals: Vec<u64> = (0..5).map(|_| rng.next_u64()).collect();
        assert_eq!(
            vals,
            [
                0x5317_5d61_490b_23df,
                0x61da_6f3d_c380_d507,
                0x5c0f_df91_ec9a_7bfc,
                0x02ee_bf8c_3bbe_5e1a,
                0x7eca_04eb_af4a_5eea,
            ]
        );
    }

    #[test]
    fn different_seeds_different_output() {
        let mut a = CantusRng::new(42);
        let mut b = CantusRng::new(43);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn f64_in_unit_range() {
        let mut rng = CantusRng::new(12345);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v), "f64 out of range: {v}");
        }
    }

    #[test]
    fn range_usize_inclusive_reaches_both_ends() {
        let mut rng = CantusRng::new(666);
        let mut seen = [false; 9];
        for _ in 0..10_000 {
            let v = rng.range_usize_inclusive(8, 16);
            assert!((8..=16).contains(&v), "out of range: {v}");
            seen[v - 8] = true;
        }
        assert!(seen.iter().all(|&s| s), "every length 8..=16 should be drawn");
    }

    #[test]
    fn random_bool_distribution() {
        let mut rng = CantusRng::new(42);
        let n = 10_000;
        let hits = (0..n).filter(|_| rng.random_bool(0.65)).count();
        let pct = hits as f64 / n as f64;
        assert!(
            (0.62..0.68).contains(&pct),
            "random_bool(0.65) should be ~65%, got {:.1}%",
            pct * 100.0
        );
    }

    #[test]
    fn random_bool_extremes() {
        let mut rng = CantusRng::new(42);
        for _ in 0..100 {
            assert!(!rng.random_bool(0.0));
            assert!(rng.random_bool(1.0));
        }
    }

    #[test]
    fn choose_from_empty_is_none() {
        let mut rng = CantusRng::new(7);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
        assert_eq!(rng.choose(&[3]), Some(&3));
    }

    /// A scripted source sees the same helper arithmetic as the real one.
    #[test]
    fn scripted_source_uses_provided_helpers() {
        struct Fixed(u64);
        impl RandomSource for Fixed {
            fn next_u64(&mut self) -> u64 {
                self.0
            }
        }
        assert!(Fixed(0).random_bool(0.5));
        assert!(!Fixed(u64::MAX).random_bool(0.5));
        assert_eq!(Fixed(0).range_usize(3, 7), 3);
    }

    #[test]
    fn serialization_roundtrip() {
        let mut rng = CantusRng::new(42);
        for _ in 0..100 {
            rng.next_u64();
        }
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: CantusRng = serde_json::from_str(&json).unwrap();
        for _ in 0..100 {
            assert_eq!(rng.next_u64(), restored.next_u64());
        }
    }
}
