//! Sensor noise sources
//!
//! The monitor draws every random perturbation through [`NoiseSource`] so tests
//! can swap in [`SilentNoise`] and get exact derivations.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of symmetric sensor noise
pub trait NoiseSource: Send {
    /// Uniform sample in `[-amplitude, amplitude]`
    fn jitter(&mut self, amplitude: f64) -> f64;
}

/// Pseudo-random noise backed by `StdRng`
pub struct RandNoise {
    rng: StdRng,
}

impl RandNoise {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl NoiseSource for RandNoise {
    fn jitter(&mut self, amplitude: f64) -> f64 {
        let amplitude = amplitude.abs();
        if amplitude == 0.0 || !amplitude.is_finite() {
            return 0.0;
        }
        self.rng.random_range(-amplitude..=amplitude)
    }
}

/// Noise source that always returns zero
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNoise;

impl NoiseSource for SilentNoise {
    fn jitter(&mut self, _amplitude: f64) -> f64 {
        0.0
    }
}
