//! Laplace and symmetric-geometric noise, the two calibrated mechanisms
//! the type algebra composes with sensitivity to produce a DP release.
//!
//! Both mechanisms draw from a single uniform-`[0,1)` source (`RngSource`)
//! rather than touching a generator directly, so tests can pin the
//! sequence of draws and assert on exact outputs.

use crate::rng::RngSource;

/// Draws one sample from `Exponential(1/epsilon)`.
fn exponential_noise(epsilon: f64, rng: &mut dyn RngSource) -> f64 {
    -(1.0 - rng.uniform()).ln() / epsilon
}

/// Draws one sample from the zero-mean Laplace distribution with scale
/// `1/epsilon`, as a signed exponential.
pub fn laplace_noise(epsilon: f64, rng: &mut dyn RngSource) -> f64 {
    if rng.flip() {
        exponential_noise(epsilon, rng)
    } else {
        -exponential_noise(epsilon, rng)
    }
}

/// Draws one sample from the two-sided geometric distribution with
/// parameter `p = e^-epsilon`.
///
/// Returns 0 with probability `(1 - p)/(1 + p)` when `symmetric`, else
/// `1 - p`. Otherwise samples a magnitude and, if `symmetric`, signs it
/// with a fair coin.
pub fn geometric_noise(epsilon: f64, symmetric: bool, rng: &mut dyn RngSource) -> i64 {
    let p = (-epsilon).exp();
    if rng.uniform() > p {
        if symmetric {
            if rng.uniform() > 0.5 {
                return 0;
            }
        } else {
            return 0;
        }
    }
    let pv = 1.0 - p + p * rng.uniform();
    let mut k = (1.0 - pv).ln() / p.ln();
    if symmetric && rng.uniform() < 0.5 {
        k = -k;
    }
    k as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::FixedRngSource;

    #[test]
    fn laplace_noise_is_signed_exponential() {
        // flip() is `uniform() < 0.5`; a 0.9 draw is false, taking the
        // negative branch, then the magnitude draw (0.5) gives -ln(0.5).
        let mut rng = FixedRngSource::new(vec![0.9, 0.5]);
        let negative = laplace_noise(1.0, &mut rng);
        assert!(negative < 0.0);

        let mut rng = FixedRngSource::new(vec![0.1, 0.5]);
        let positive = laplace_noise(1.0, &mut rng);
        assert!(positive > 0.0);
    }

    #[test]
    fn geometric_noise_returns_zero_above_threshold() {
        // 0.9 > p = e^-1, so the early-return branch fires.
        let mut rng = FixedRngSource::new(vec![0.9]);
        assert_eq!(geometric_noise(1.0, false, &mut rng), 0);
    }

    #[test]
    fn geometric_noise_symmetric_can_be_negative() {
        // random() > p so we don't early-exit; the "return 0" coin comes up
        // <= 0.5 so we fall through to a magnitude draw; the sign draw is
        // < 0.5, producing a negative result.
        let mut rng = FixedRngSource::new(vec![0.999, 0.3, 0.5, 0.2]);
        let k = geometric_noise(5.0, true, &mut rng);
        assert_eq!(k, -1);
    }

    #[test]
    fn noise_is_non_degenerate_over_many_draws() {
        let mut rng = crate::rng::ThreadRngSource::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..20 {
            let v = laplace_noise(0.5, &mut rng);
            seen.insert(v.to_bits());
        }
        assert!(seen.len() > 5);
    }
}
