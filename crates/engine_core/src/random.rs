//! Seeded uniform sampling for spawn placement and motion.

use glam::Vec3;
use rand::prelude::*;

/// Direction used when a sampled vector is too short to normalize.
const FALLBACK_DIRECTION: Vec3 = Vec3::NEG_Z;

/// Uniform random source for scalars and directions.
#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: StdRng,
}

impl Randomizer {
    /// Deterministic sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded from the OS entropy source.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded if `seed` is given, otherwise from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Uniform in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Uniform in `[min, max)`; returns `min` when the range is empty.
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Uniform in `[-1, 1)` on each axis.
    pub fn in_cube(&mut self) -> Vec3 {
        Vec3::new(
            self.range(-1.0, 1.0),
            self.range(-1.0, 1.0),
            self.range(-1.0, 1.0),
        )
    }

    /// Unit vector uniformly distributed over the sphere.
    ///
    /// Rejection-samples the unit ball; if every attempt lands on (or
    /// extremely near) the origin, falls back to -Z instead of producing NaN.
    pub fn unit_vector(&mut self) -> Vec3 {
        for _ in 0..16 {
            let v = self.in_cube();
            let len_sq = v.length_squared();
            if len_sq > 1e-6 && len_sq <= 1.0 {
                return v / len_sq.sqrt();
            }
        }
        FALLBACK_DIRECTION
    }

    /// Point on a random direction at a distance in `[min_radius, max_radius)`.
    pub fn in_shell(&mut self, min_radius: f32, max_radius: f32) -> Vec3 {
        self.unit_vector() * self.range(min_radius, max_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Randomizer::seeded(7);
        let mut b = Randomizer::seeded(7);
        for _ in 0..32 {
            assert_eq!(a.unit_vector(), b.unit_vector());
            assert_eq!(a.range(-3.0, 9.0), b.range(-3.0, 9.0));
        }
    }

    #[test]
    fn range_stays_inside_bounds() {
        let mut r = Randomizer::seeded(1);
        for _ in 0..1000 {
            let v = r.range(40.0, 400.0);
            assert!((40.0..400.0).contains(&v));
        }
        assert_eq!(r.range(5.0, 5.0), 5.0);
        assert_eq!(r.range(5.0, 1.0), 5.0);
    }

    #[test]
    fn unit_vectors_are_unit_length() {
        let mut r = Randomizer::seeded(42);
        for _ in 0..1000 {
            let v = r.unit_vector();
            assert!(v.is_finite());
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn shell_samples_respect_radii() {
        let mut r = Randomizer::seeded(3);
        for _ in 0..500 {
            let d = r.in_shell(100.0, 200.0).length();
            assert!(d >= 99.99 && d < 200.01, "distance {d}");
        }
    }
}
