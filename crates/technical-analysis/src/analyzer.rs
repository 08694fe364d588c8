use analysis_core::numeric::{clamp_unit, NEUTRAL_SCORE};
use analysis_core::{AnalysisError, PricePoint, TechnicalAnalyzer};
use serde::{Deserialize, Serialize};

use crate::indicators::*;

/// Tunables for the moving-average / momentum score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalConfig {
    /// Fewer usable closes than this yields the neutral score
    pub min_points: usize,
    pub short_window: usize,
    /// Clipped to the series length when the series is shorter
    pub long_window: usize,
    pub rsi_period: usize,
    /// Applied when price, short MA and long MA are stacked in one direction
    pub crossover_bonus: f64,
    /// Applied on overbought / oversold momentum
    pub momentum_bonus: f64,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for TechnicalConfig {
    fn default() -> Self {
        Self {
            min_points: 14,
            short_window: 5,
            long_window: 10,
            rsi_period: 14,
            crossover_bonus: 0.1,
            momentum_bonus: 0.05,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

impl TechnicalConfig {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.min_points < 2 {
            return Err(AnalysisError::InvalidConfig(
                "min_points must be at least 2".to_string(),
            ));
        }
        if self.short_window == 0 || self.long_window < self.short_window {
            return Err(AnalysisError::InvalidConfig(
                "short_window must be >= 1 and <= long_window".to_string(),
            ));
        }
        if self.rsi_period == 0 {
            return Err(AnalysisError::InvalidConfig(
                "rsi_period must be >= 1".to_string(),
            ));
        }
        for (name, bonus) in [
            ("crossover_bonus", self.crossover_bonus),
            ("momentum_bonus", self.momentum_bonus),
        ] {
            if !bonus.is_finite() || !(0.0..=0.5).contains(&bonus) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{name} must be within 0.0..=0.5"
                )));
            }
        }
        if !(0.0..=100.0).contains(&self.oversold)
            || !(0.0..=100.0).contains(&self.overbought)
            || self.oversold >= self.overbought
        {
            return Err(AnalysisError::InvalidConfig(
                "need 0 <= oversold < overbought <= 100".to_string(),
            ));
        }
        Ok(())
    }
}

/// Indicator values behind a technical score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub usable_points: usize,
    pub short_ma: Option<f64>,
    pub long_ma: Option<f64>,
    pub rsi: Option<f64>,
    pub last_close: Option<f64>,
    pub score: f64,
}

impl TechnicalSnapshot {
    fn insufficient(usable_points: usize) -> Self {
        Self {
            usable_points,
            short_ma: None,
            long_ma: None,
            rsi: None,
            last_close: None,
            score: NEUTRAL_SCORE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TechnicalScorer {
    config: TechnicalConfig,
}

impl TechnicalScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TechnicalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TechnicalConfig {
        &self.config
    }

    pub fn analyze(&self, prices: &[PricePoint]) -> TechnicalSnapshot {
        let cfg = &self.config;
        let closes = usable_closes(prices);

        if closes.len() < cfg.min_points.max(2) {
            tracing::debug!(
                usable = closes.len(),
                required = cfg.min_points,
                "insufficient price history, technical score neutral"
            );
            return TechnicalSnapshot::insufficient(closes.len());
        }

        let last_close = closes.last().copied();
        let short_ma = trailing_mean(&closes, cfg.short_window);
        let long_ma = trailing_mean(&closes, cfg.long_window);
        let rsi = simple_rsi(&closes, cfg.rsi_period);

        let mut score = NEUTRAL_SCORE;

        if let (Some(last), Some(short), Some(long)) = (last_close, short_ma, long_ma) {
            if short > long && last > short {
                score += cfg.crossover_bonus;
            } else if short < long && last < short {
                score -= cfg.crossover_bonus;
            }
        }

        if let Some(rsi) = rsi {
            if rsi > cfg.overbought {
                score -= cfg.momentum_bonus;
            } else if rsi < cfg.oversold {
                score += cfg.momentum_bonus;
            }
        }

        let score = clamp_unit(score);
        tracing::debug!(
            usable = closes.len(),
            ?short_ma,
            ?long_ma,
            ?rsi,
            score,
            "technical score computed"
        );

        TechnicalSnapshot {
            usable_points: closes.len(),
            short_ma,
            long_ma,
            rsi,
            last_close,
            score,
        }
    }

    pub fn score(&self, prices: &[PricePoint]) -> f64 {
        self.analyze(prices).score
    }
}

impl TechnicalAnalyzer for TechnicalScorer {
    fn score(&self, prices: &[PricePoint]) -> f64 {
        TechnicalScorer::score(self, prices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn series(closes: &[f64]) -> Vec<PricePoint> {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(start + Duration::days(i as i64), c))
            .collect()
    }

    fn from_deltas(start: f64, deltas: &[f64]) -> Vec<f64> {
        let mut closes = vec![start];
        for d in deltas {
            let next = closes.last().unwrap() + d;
            closes.push(next);
        }
        closes
    }

    #[test]
    fn test_empty_series_is_neutral() {
        assert_eq!(TechnicalScorer::new().score(&[]), 0.5);
    }

    #[test]
    fn test_short_series_is_neutral() {
        let closes: Vec<f64> = (1..=13).map(|i| i as f64).collect();
        let snapshot = TechnicalScorer::new().analyze(&series(&closes));
        assert_eq!(snapshot.score, 0.5);
        assert_eq!(snapshot.usable_points, 13);
        assert!(snapshot.rsi.is_none());
    }

    #[test]
    fn test_steady_uptrend_gets_crossover_bonus_only() {
        // No losses at all: RSI falls back to 50, so no momentum adjustment
        let closes: Vec<f64> = (1..=30).map(|i| 100.0 + i as f64).collect();
        let snapshot = TechnicalScorer::new().analyze(&series(&closes));
        assert_eq!(snapshot.rsi, Some(RSI_FALLBACK));
        assert_relative_eq!(snapshot.score, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_steady_downtrend_is_penalised_then_oversold() {
        // No gains at all: RSI is 0, so the oversold credit offsets part of the penalty
        let closes: Vec<f64> = (1..=30).map(|i| 200.0 - i as f64).collect();
        let snapshot = TechnicalScorer::new().analyze(&series(&closes));
        assert_relative_eq!(snapshot.rsi.unwrap(), 0.0);
        assert_relative_eq!(snapshot.score, 0.45, epsilon = 1e-12);
    }

    #[test]
    fn test_overbought_uptrend_is_trimmed() {
        let mut deltas = vec![1.0; 20];
        deltas[15] = -0.5;
        let closes = from_deltas(100.0, &deltas);
        let snapshot = TechnicalScorer::new().analyze(&series(&closes));
        assert!(snapshot.rsi.unwrap() > 70.0);
        assert_relative_eq!(snapshot.score, 0.55, epsilon = 1e-12);
    }

    #[test]
    fn test_oversold_downtrend_gets_bounce_credit() {
        let mut deltas = vec![-1.0; 29];
        deltas[20] = 0.5;
        let closes = from_deltas(100.0, &deltas);
        let snapshot = TechnicalScorer::new().analyze(&series(&closes));
        assert!(snapshot.rsi.unwrap() < 30.0);
        assert_relative_eq!(snapshot.score, 0.45, epsilon = 1e-12);
    }

    #[test]
    fn test_unusable_points_are_skipped() {
        let mut closes: Vec<f64> = (1..=20).map(|i| 50.0 + i as f64).collect();
        closes.insert(3, f64::NAN);
        closes.insert(7, -4.0);
        closes.insert(11, 0.0);
        closes.push(f64::INFINITY);
        let snapshot = TechnicalScorer::new().analyze(&series(&closes));
        assert_eq!(snapshot.usable_points, 20);
        assert_relative_eq!(snapshot.score, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_mostly_garbage_series_is_neutral() {
        let mut closes = vec![f64::NAN; 20];
        closes.extend([10.0, 11.0, 12.0]);
        assert_eq!(TechnicalScorer::new().score(&series(&closes)), 0.5);
    }

    #[test]
    fn test_out_of_order_points_are_sorted() {
        let closes: Vec<f64> = (1..=30).map(|i| 100.0 + i as f64).collect();
        let mut points = series(&closes);
        points.reverse();
        assert_relative_eq!(TechnicalScorer::new().score(&points), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_config_still_scores_in_range() {
        let scorer = TechnicalScorer::with_config(TechnicalConfig {
            min_points: 0,
            short_window: 0,
            long_window: 0,
            rsi_period: 0,
            crossover_bonus: 3.0,
            momentum_bonus: 3.0,
            ..TechnicalConfig::default()
        });
        for closes in [vec![], vec![1.0], vec![1.0, 2.0, 3.0]] {
            let score = scorer.score(&series(&closes));
            assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(TechnicalConfig::default().validate().is_ok());
        let bad = TechnicalConfig {
            oversold: 80.0,
            ..TechnicalConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
