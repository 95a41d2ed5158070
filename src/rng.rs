//! The uniform-`[0,1)` source backing both noise mechanisms.
//!
//! Production code draws from `rand::rngs::ThreadRng`, itself seeded from
//! OS entropy. Tests inject a deterministic sequence by implementing
//! `RngSource` directly, matching the "hot-swap point for deterministic
//! testing" called out for the noise mechanisms.

use rand::Rng;

/// A source of uniform draws in `[0, 1)`.
///
/// Concurrent callers of `dp()` must each hold an independent `RngSource`,
/// or accept interleaved draws from a shared one; nothing here locks.
pub trait RngSource {
    /// Draws a uniform sample in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Draws a fair coin flip.
    fn flip(&mut self) -> bool {
        self.uniform() < 0.5
    }
}

/// The default sampler: `rand`'s thread-local generator, seeded from OS
/// entropy on first use.
pub struct ThreadRngSource(rand::rngs::ThreadRng);

impl ThreadRngSource {
    pub fn new() -> Self {
        ThreadRngSource(rand::thread_rng())
    }
}

impl Default for ThreadRngSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RngSource for ThreadRngSource {
    fn uniform(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// A fixed sequence of uniforms, cycling once exhausted.
///
/// Useful in tests that need to pin the mechanism's output exactly, rather
/// than merely asserting it falls in some range.
#[cfg(test)]
pub struct FixedRngSource {
    values: Vec<f64>,
    cursor: usize,
}

#[cfg(test)]
impl FixedRngSource {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "FixedRngSource needs at least one value");
        FixedRngSource { values, cursor: 0 }
    }
}

#[cfg(test)]
impl RngSource for FixedRngSource {
    fn uniform(&mut self) -> f64 {
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}
