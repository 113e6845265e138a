use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};

use crate::constants::COLOR_RANGE;
use crate::types::Vec2;

/// Source of uniform integers for placement and color draws.
pub trait RandomSource {
    /// Returns a value in `[0, bound)`. A zero bound yields zero.
    fn below(&mut self, bound: u32) -> u32;
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn below(&mut self, bound: u32) -> u32 {
        (**self).below(bound)
    }
}

/// Deterministic mulberry32 generator, used for seeded runs and tests.
#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn next_f64(&mut self) -> f64 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        out as f64 / 4_294_967_296.0
    }
}

impl RandomSource for Rng {
    fn below(&mut self, bound: u32) -> u32 {
        if bound <= 1 {
            return 0;
        }
        ((self.next_f64() * bound as f64).floor() as u32).min(bound - 1)
    }
}

/// OS-seeded generator for live servers.
pub struct OsRandom {
    inner: StdRng,
}

impl OsRandom {
    pub fn new() -> Self {
        Self {
            inner: StdRng::from_os_rng(),
        }
    }
}

impl Default for OsRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for OsRandom {
    fn below(&mut self, bound: u32) -> u32 {
        if bound <= 1 {
            return 0;
        }
        self.inner.random_range(0..bound)
    }
}

/// Uniform point in `[0, max_x) x [0, max_y)`.
pub fn random_position<R: RandomSource + ?Sized>(rng: &mut R, max_x: i32, max_y: i32) -> Vec2 {
    Vec2 {
        x: rng.below(max_x.max(0) as u32) as i32,
        y: rng.below(max_y.max(0) as u32) as i32,
    }
}

/// Random 24-bit color rendered as a fixed-width `#rrggbb` token.
pub fn random_color<R: RandomSource + ?Sized>(rng: &mut R) -> String {
    format!("#{:06x}", rng.below(COLOR_RANGE))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..32 {
            assert_eq!(a.below(1_000), b.below(1_000));
        }
    }

    #[test]
    fn below_stays_in_range() {
        let mut rng = Rng::new(7);
        for _ in 0..10_000 {
            assert!(rng.below(600) < 600);
        }
        assert_eq!(rng.below(0), 0);
        assert_eq!(rng.below(1), 0);

        let mut os = OsRandom::new();
        for _ in 0..1_000 {
            assert!(os.below(15) < 15);
        }
    }

    #[test]
    fn color_is_fixed_width_hex() {
        let mut rng = testing::ScriptedRandom::new([0x00_0a0b, 0xFF_FFFE]);
        assert_eq!(random_color(&mut rng), "#000a0b");
        assert_eq!(random_color(&mut rng), "#fffffe");

        let mut rng = Rng::new(11);
        for _ in 0..100 {
            let color = random_color(&mut rng);
            assert_eq!(color.len(), 7);
            assert!(color.starts_with('#'));
            assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn random_position_is_bounded() {
        let mut rng = Rng::new(99);
        for _ in 0..1_000 {
            let pos = random_position(&mut rng, 800, 600);
            assert!((0..800).contains(&pos.x));
            assert!((0..600).contains(&pos.y));
        }
    }
}
