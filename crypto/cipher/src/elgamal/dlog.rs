//! Bounded discrete logarithm (baby-step giant-step)

use std::collections::HashMap;

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use curve25519_dalek::traits::Identity;

/// Lookup table solving `m·G = P` for `m` in `0..=max`.
///
/// Stores `ceil(sqrt(max + 1))` baby steps and walks at most as many giant steps.
pub struct DiscreteLogTable {
    max: u64,
    stride: u64,
    baby_steps: HashMap<[u8; 32], u64>,
    giant_step: RistrettoPoint,
}

impl DiscreteLogTable {
    /// Build a table for values in `0..=max`
    pub fn new(max: u64) -> Self {
        let stride = integer_sqrt(max) + 1;

        let mut baby_steps = HashMap::with_capacity(stride as usize);
        let mut current = RistrettoPoint::identity();
        for j in 0..stride {
            baby_steps.insert(current.compress().to_bytes(), j);
            current += RISTRETTO_BASEPOINT_POINT;
        }

        Self {
            max,
            stride,
            baby_steps,
            giant_step: Scalar::from(stride) * RISTRETTO_BASEPOINT_POINT,
        }
    }

    /// Largest value this table can recover
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Find `m` with `m·G = point`, if it lies in range
    pub fn solve(&self, point: &RistrettoPoint) -> Option<u64> {
        let mut current = *point;
        for i in 0..=(self.max / self.stride) {
            if let Some(&j) = self.baby_steps.get(&current.compress().to_bytes()) {
                let value = i * self.stride + j;
                return (value <= self.max).then_some(value);
            }
            current -= self.giant_step;
        }
        None
    }
}

fn integer_sqrt(n: u64) -> u64 {
    let mut root = (n as f64).sqrt() as u64;
    while root.checked_mul(root).map_or(true, |sq| sq > n) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).map_or(false, |sq| sq <= n) {
        root += 1;
    }
    root
}
