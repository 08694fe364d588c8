use analysis_core::numeric::{clamp_unit, round_dp};
use analysis_core::AnalysisError;
use serde::{Deserialize, Serialize};

/// Smallest percentage either level can report after rounding
pub const MIN_RISK_PCT: f64 = 0.01;

/// Linear maps from combined score to trailing-stop and offset percentages.
///
/// trailing = base + score * range
/// offset   = max(floor, (ceiling - score) * scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    pub trailing_base: f64,
    pub trailing_range: f64,
    pub offset_floor: f64,
    pub offset_ceiling: f64,
    pub offset_scale: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            trailing_base: 2.0,
            trailing_range: 18.0,
            offset_floor: 0.5,
            offset_ceiling: 1.2,
            offset_scale: 6.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub trailing_pct: f64,
    pub offset_pct: f64,
}

impl RiskParams {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let finite = [
            self.trailing_base,
            self.trailing_range,
            self.offset_floor,
            self.offset_ceiling,
            self.offset_scale,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(AnalysisError::InvalidConfig(
                "risk parameters must be finite".to_string(),
            ));
        }
        if self.trailing_base < MIN_RISK_PCT || self.trailing_range < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "trailing_base must be >= {MIN_RISK_PCT} and trailing_range >= 0"
            )));
        }
        if self.offset_floor < MIN_RISK_PCT || self.offset_scale < 0.0 {
            return Err(AnalysisError::InvalidConfig(format!(
                "offset_floor must be >= {MIN_RISK_PCT} and offset_scale >= 0"
            )));
        }
        Ok(())
    }

    /// Percentages rounded to two decimals and never below [`MIN_RISK_PCT`].
    /// The score is clamped to 0.0..=1.0 first.
    pub fn map(&self, score: f64) -> RiskLevels {
        let score = clamp_unit(score);
        let trailing = self.trailing_base + score * self.trailing_range;
        let offset = self
            .offset_floor
            .max((self.offset_ceiling - score) * self.offset_scale);

        RiskLevels {
            trailing_pct: round_dp(trailing, 2).max(MIN_RISK_PCT),
            offset_pct: round_dp(offset, 2).max(MIN_RISK_PCT),
        }
    }

    /// (min, max) trailing percentage over all scores
    pub fn trailing_bounds(&self) -> (f64, f64) {
        (self.map(0.0).trailing_pct, self.map(1.0).trailing_pct)
    }

    /// (min, max) offset percentage over all scores
    pub fn offset_bounds(&self) -> (f64, f64) {
        (self.map(1.0).offset_pct, self.map(0.0).offset_pct)
    }
}
