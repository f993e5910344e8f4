//! 2D scalar noise sources consumed by the generator

use noise::{NoiseFn, Simplex};

/// Deterministic 2D noise source returning values in roughly [-1, 1]
pub trait NoiseField {
    /// Sample the field at horizontal coordinates `(x, z)`
    fn sample(&self, x: f64, z: f64) -> f64;
}

impl<F> NoiseField for F
where
    F: Fn(f64, f64) -> f64,
{
    fn sample(&self, x: f64, z: f64) -> f64 {
        self(x, z)
    }
}

/// Seeded simplex noise backed by the `noise` crate
#[derive(Clone)]
pub struct SimplexField {
    seed: u32,
    simplex: Simplex,
}

impl SimplexField {
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            simplex: Simplex::new(seed),
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}

impl std::fmt::Debug for SimplexField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexField").field("seed", &self.seed).finish()
    }
}

impl NoiseField for SimplexField {
    fn sample(&self, x: f64, z: f64) -> f64 {
        self.simplex.get([x, z])
    }
}

/// Field returning the same value everywhere (flat worlds, tests)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantField(pub f64);

impl NoiseField for ConstantField {
    fn sample(&self, _x: f64, _z: f64) -> f64 {
        self.0
    }
}
