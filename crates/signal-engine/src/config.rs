use analysis_core::AnalysisError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use technical_analysis::TechnicalConfig;

use crate::classifier::ActionThresholds;
use crate::combiner::{
    EntropyJitter, Jitter, NoJitter, SeededJitter, DEFAULT_SENTIMENT_WEIGHT,
    DEFAULT_TECHNICAL_WEIGHT,
};
use crate::risk::RiskParams;

/// Everything a scoring call can be tuned with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub sentiment_weight: f64,             // 0.7
    pub technical_weight: f64,             // 0.3
    pub thresholds: ActionThresholds,
    pub risk: RiskParams,
    pub technical: TechnicalConfig,

    // Jitter is off unless asked for. With a seed it is reproducible.
    pub jitter_enabled: bool,
    pub jitter_seed: Option<u64>,
    pub jitter_amplitude: f64,             // 0.15 = ±15% of the sentiment component
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            sentiment_weight: DEFAULT_SENTIMENT_WEIGHT,
            technical_weight: DEFAULT_TECHNICAL_WEIGHT,
            thresholds: ActionThresholds::default(),
            risk: RiskParams::default(),
            technical: TechnicalConfig::default(),
            jitter_enabled: false,
            jitter_seed: None,
            jitter_amplitude: 0.15,
        }
    }
}

impl ScoringConfig {
    /// Read overrides from `SIGNAL_*` environment variables, defaulting the rest.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            sentiment_weight: env_or("SIGNAL_SENTIMENT_WEIGHT", defaults.sentiment_weight)?,
            technical_weight: env_or("SIGNAL_TECHNICAL_WEIGHT", defaults.technical_weight)?,
            thresholds: ActionThresholds {
                strong_buy: env_or("SIGNAL_STRONG_BUY", defaults.thresholds.strong_buy)?,
                buy: env_or("SIGNAL_BUY", defaults.thresholds.buy)?,
                sell: env_or("SIGNAL_SELL", defaults.thresholds.sell)?,
                strong_sell: env_or("SIGNAL_STRONG_SELL", defaults.thresholds.strong_sell)?,
            },
            risk: RiskParams {
                trailing_base: env_or("SIGNAL_TRAILING_BASE", defaults.risk.trailing_base)?,
                trailing_range: env_or("SIGNAL_TRAILING_RANGE", defaults.risk.trailing_range)?,
                offset_floor: env_or("SIGNAL_OFFSET_FLOOR", defaults.risk.offset_floor)?,
                offset_ceiling: env_or("SIGNAL_OFFSET_CEILING", defaults.risk.offset_ceiling)?,
                offset_scale: env_or("SIGNAL_OFFSET_SCALE", defaults.risk.offset_scale)?,
            },
            technical: defaults.technical,
            jitter_enabled: env_or("SIGNAL_JITTER_ENABLED", defaults.jitter_enabled)?,
            jitter_seed: env::var("SIGNAL_JITTER_SEED")
                .ok()
                .map(|v| v.trim().parse::<u64>())
                .transpose()
                .context("SIGNAL_JITTER_SEED must be an unsigned integer")?,
            jitter_amplitude: env_or("SIGNAL_JITTER_AMPLITUDE", defaults.jitter_amplitude)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        let weights_ok = self.sentiment_weight.is_finite()
            && self.technical_weight.is_finite()
            && self.sentiment_weight >= 0.0
            && self.technical_weight >= 0.0
            && self.sentiment_weight + self.technical_weight > 0.0;
        if !weights_ok {
            return Err(AnalysisError::InvalidConfig(
                "weights must be finite, non-negative and not both zero".to_string(),
            ));
        }
        if !self.jitter_amplitude.is_finite() || !(0.0..=1.0).contains(&self.jitter_amplitude) {
            return Err(AnalysisError::InvalidConfig(
                "jitter_amplitude must be within 0.0..=1.0".to_string(),
            ));
        }
        self.thresholds.validate()?;
        self.risk.validate()?;
        self.technical.validate()?;
        Ok(())
    }

    /// Copy with every invalid section replaced by its default.
    ///
    /// Used on the infallible scoring path so that a bad config degrades
    /// instead of failing.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut config = self.clone();

        if let Err(e) = self.thresholds.validate() {
            tracing::warn!("{e}; using default thresholds");
            config.thresholds = defaults.thresholds;
        }
        if let Err(e) = self.risk.validate() {
            tracing::warn!("{e}; using default risk parameters");
            config.risk = defaults.risk;
        }
        if let Err(e) = self.technical.validate() {
            tracing::warn!("{e}; using default technical settings");
            config.technical = defaults.technical.clone();
        }
        if !self.jitter_amplitude.is_finite() || !(0.0..=1.0).contains(&self.jitter_amplitude) {
            tracing::warn!(
                amplitude = self.jitter_amplitude,
                "jitter amplitude out of range; using default"
            );
            config.jitter_amplitude = defaults.jitter_amplitude;
        }
        config
    }

    /// Jitter source for a single call
    pub fn jitter(&self) -> Box<dyn Jitter> {
        match (self.jitter_enabled, self.jitter_seed) {
            (false, _) => Box::new(NoJitter),
            (true, Some(seed)) => Box::new(SeededJitter::new(seed)),
            (true, None) => Box::new(EntropyJitter),
        }
    }

    /// Jitter source for one ticker in a batch.
    ///
    /// The seed is mixed with the ticker so each ticker draws differently but
    /// the result does not depend on scheduling order.
    pub fn jitter_for(&self, ticker: &str) -> Box<dyn Jitter> {
        match (self.jitter_enabled, self.jitter_seed) {
            (true, Some(seed)) => Box::new(SeededJitter::new(seed ^ fnv1a(ticker))),
            _ => self.jitter(),
        }
    }
}

/// Parse `key` from the environment after trimming whitespace, or return `default` when unset.
pub fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

fn fnv1a(s: &str) -> u64 {
    s.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScoringConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.jitter_enabled);
        assert_eq!(config.sanitized(), config);
    }

    #[test]
    fn test_validate_rejects_bad_weights() {
        let config = ScoringConfig {
            sentiment_weight: 0.0,
            technical_weight: 0.0,
            ..ScoringConfig::default()
        };
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_sanitized_replaces_only_broken_sections() {
        let config = ScoringConfig {
            sentiment_weight: 0.5,
            technical_weight: 0.5,
            thresholds: ActionThresholds {
                strong_buy: 0.1,
                ..ActionThresholds::default()
            },
            jitter_amplitude: 9.0,
            ..ScoringConfig::default()
        };
        let clean = config.sanitized();
        assert_eq!(clean.thresholds, ActionThresholds::default());
        assert_eq!(clean.jitter_amplitude, 0.15);
        assert_eq!(clean.sentiment_weight, 0.5);
        assert!(clean.validate().is_ok());
    }

    #[test]
    fn test_jitter_disabled_samples_zero() {
        let config = ScoringConfig {
            jitter_seed: Some(7),
            ..ScoringConfig::default()
        };
        assert_eq!(config.jitter().sample(), 0.0);
        assert_eq!(config.jitter_for("AAPL").sample(), 0.0);
    }

    #[test]
    fn test_per_ticker_seeds_differ_but_repeat() {
        let config = ScoringConfig {
            jitter_enabled: true,
            jitter_seed: Some(7),
            ..ScoringConfig::default()
        };
        let a1 = config.jitter_for("AAPL").sample();
        let a2 = config.jitter_for("AAPL").sample();
        let m = config.jitter_for("MSFT").sample();
        assert_eq!(a1, a2);
        assert_ne!(a1, m);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ScoringConfig =
            serde_json::from_str(r#"{"sentiment_weight": 0.6, "thresholds": {"buy": 0.65}}"#).unwrap();
        assert_eq!(config.sentiment_weight, 0.6);
        assert_eq!(config.technical_weight, 0.3);
        assert_eq!(config.thresholds.buy, 0.65);
        assert_eq!(config.thresholds.strong_buy, 0.85);
        assert_eq!(config.risk, RiskParams::default());
    }

    #[test]
    fn test_env_values_are_trimmed() {
        std::env::set_var("SIGNAL_CONFIG_TEST_TRIMMED", " 7 \n");
        std::env::set_var("SIGNAL_CONFIG_TEST_GARBAGE", "seven");
        assert_eq!(env_or("SIGNAL_CONFIG_TEST_TRIMMED", 4usize).unwrap(), 7);
        assert_eq!(env_or("SIGNAL_CONFIG_TEST_UNSET", 4usize).unwrap(), 4);
        assert!(env_or("SIGNAL_CONFIG_TEST_GARBAGE", 4usize).is_err());
    }

    #[test]
    fn test_fnv1a_is_stable() {
        assert_eq!(fnv1a(""), 0xcbf2_9ce4_8422_2325);
        assert_ne!(fnv1a("AAPL"), fnv1a("AAPM"));
    }
}
