//! Weighted blend of the sentiment and technical sub-scores.
//!
//! The only source of randomness in the engine lives here, behind [`Jitter`].
//! With [`NoJitter`] (the default) or a [`SeededJitter`] the blend is fully
//! reproducible; [`EntropyJitter`] is not.

use analysis_core::numeric::{clamp_unit, round_dp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SENTIMENT_WEIGHT: f64 = 0.7;
pub const DEFAULT_TECHNICAL_WEIGHT: f64 = 0.3;

/// Source of a perturbation in -1.0..=1.0
pub trait Jitter {
    fn sample(&mut self) -> f64;
}

/// Always 0.0
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn sample(&mut self) -> f64 {
        0.0
    }
}

/// Reproducible jitter from a fixed seed
#[derive(Debug, Clone)]
pub struct SeededJitter {
    rng: StdRng,
}

impl SeededJitter {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Jitter for SeededJitter {
    fn sample(&mut self) -> f64 {
        self.rng.gen_range(-1.0..=1.0)
    }
}

/// Non-deterministic jitter from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropyJitter;

impl Jitter for EntropyJitter {
    fn sample(&mut self) -> f64 {
        rand::thread_rng().gen_range(-1.0..=1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blend {
    /// 0.0..=1.0, rounded to three decimals
    pub score: f64,
    pub sentiment: f64,
    pub technical: f64,
    /// Signed change applied to the sentiment component
    pub jitter: f64,
}

/// Normalised (sentiment, technical) weights.
///
/// Negative, non-finite or all-zero weights fall back to the defaults.
pub fn resolve_weights(sentiment_weight: f64, technical_weight: f64) -> (f64, f64) {
    let usable = sentiment_weight.is_finite()
        && technical_weight.is_finite()
        && sentiment_weight >= 0.0
        && technical_weight >= 0.0
        && sentiment_weight + technical_weight > 0.0;

    if !usable {
        tracing::warn!(
            sentiment_weight,
            technical_weight,
            "unusable blend weights, falling back to defaults"
        );
        return (DEFAULT_SENTIMENT_WEIGHT, DEFAULT_TECHNICAL_WEIGHT);
    }

    let total = sentiment_weight + technical_weight;
    (sentiment_weight / total, technical_weight / total)
}

/// Blend two sub-scores.
///
/// `amplitude` bounds the jitter as a fraction of the sentiment component:
/// 0.15 lets sentiment move by at most ±15% of its own value before weighting.
pub fn combine(
    sentiment: f64,
    technical: f64,
    weights: (f64, f64),
    amplitude: f64,
    jitter: &mut dyn Jitter,
) -> Blend {
    let sentiment = clamp_unit(sentiment);
    let technical = clamp_unit(technical);
    let (sentiment_weight, technical_weight) = resolve_weights(weights.0, weights.1);

    let amplitude = if amplitude.is_finite() {
        amplitude.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let draw = jitter.sample();
    let draw = if draw.is_finite() { draw.clamp(-1.0, 1.0) } else { 0.0 };
    let perturbed = clamp_unit(sentiment + sentiment * amplitude * draw);

    let raw = sentiment_weight * perturbed + technical_weight * technical;
    let score = clamp_unit(round_dp(clamp_unit(raw), 3));

    Blend {
        score,
        sentiment,
        technical,
        jitter: perturbed - sentiment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Fixed(f64);

    impl Jitter for Fixed {
        fn sample(&mut self) -> f64 {
            self.0
        }
    }

    const DEFAULTS: (f64, f64) = (DEFAULT_SENTIMENT_WEIGHT, DEFAULT_TECHNICAL_WEIGHT);

    #[test]
    fn test_default_blend() {
        let blend = combine(1.0, 0.5, DEFAULTS, 0.15, &mut NoJitter);
        assert_eq!(blend.score, 0.85);
        assert_eq!(blend.jitter, 0.0);

        let blend = combine(0.0, 0.5, DEFAULTS, 0.15, &mut NoJitter);
        assert_eq!(blend.score, 0.15);

        let blend = combine(0.5, 0.5, DEFAULTS, 0.15, &mut NoJitter);
        assert_eq!(blend.score, 0.5);
    }

    #[test]
    fn test_weights_are_normalised() {
        assert_eq!(resolve_weights(7.0, 3.0), (0.7, 0.3));
        let blend = combine(1.0, 0.0, (1.0, 1.0), 0.0, &mut NoJitter);
        assert_eq!(blend.score, 0.5);
    }

    #[test]
    fn test_bad_weights_fall_back() {
        assert_eq!(resolve_weights(0.0, 0.0), DEFAULTS);
        assert_eq!(resolve_weights(-1.0, 2.0), DEFAULTS);
        assert_eq!(resolve_weights(f64::NAN, 0.3), DEFAULTS);
    }

    #[test]
    fn test_jitter_is_bounded_by_amplitude() {
        let up = combine(0.6, 0.5, DEFAULTS, 0.15, &mut Fixed(1.0));
        assert_relative_eq!(up.jitter, 0.09, epsilon = 1e-12);
        assert_relative_eq!(up.score, 0.7 * 0.69 + 0.15, epsilon = 1e-3);

        let down = combine(0.6, 0.5, DEFAULTS, 0.15, &mut Fixed(-1.0));
        assert_relative_eq!(down.jitter, -0.09, epsilon = 1e-12);

        // out-of-range draws are clamped to ±1
        let wild = combine(0.6, 0.5, DEFAULTS, 0.15, &mut Fixed(40.0));
        assert_eq!(wild, up);
    }

    #[test]
    fn test_jitter_never_leaves_unit_range() {
        let blend = combine(1.0, 1.0, DEFAULTS, 1.0, &mut Fixed(1.0));
        assert_eq!(blend.score, 1.0);
        let blend = combine(0.0, 0.0, DEFAULTS, 1.0, &mut Fixed(-1.0));
        assert_eq!(blend.score, 0.0);
    }

    #[test]
    fn test_seeded_jitter_is_reproducible() {
        let mut a = SeededJitter::new(42);
        let mut b = SeededJitter::new(42);
        for _ in 0..50 {
            let x = a.sample();
            assert_eq!(x, b.sample());
            assert!((-1.0..=1.0).contains(&x));
        }
    }

    #[test]
    fn test_entropy_jitter_stays_in_range() {
        let mut j = EntropyJitter;
        for _ in 0..200 {
            assert!((-1.0..=1.0).contains(&j.sample()));
        }
    }

    #[test]
    fn test_nan_inputs_are_neutralised() {
        let blend = combine(f64::NAN, f64::NAN, DEFAULTS, f64::NAN, &mut Fixed(f64::NAN));
        assert_eq!(blend.score, 0.5);
        assert_eq!(blend.jitter, 0.0);
    }
}
