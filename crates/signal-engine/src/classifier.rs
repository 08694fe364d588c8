use analysis_core::{Action, AnalysisError};
use serde::{Deserialize, Serialize};

/// Lower edges of the action bands.
///
/// Every band includes its lower edge: a score of exactly `strong_buy` is a
/// STRONG BUY, exactly `buy` a BUY, exactly `sell` a HOLD and exactly
/// `strong_sell` a SELL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionThresholds {
    pub strong_buy: f64,
    pub buy: f64,
    pub sell: f64,
    pub strong_sell: f64,
}

impl Default for ActionThresholds {
    fn default() -> Self {
        Self {
            strong_buy: 0.85,
            buy: 0.60,
            sell: 0.28,
            strong_sell: 0.15,
        }
    }
}

impl ActionThresholds {
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let ordered = 0.0 <= self.strong_sell
            && self.strong_sell < self.sell
            && self.sell < self.buy
            && self.buy < self.strong_buy
            && self.strong_buy <= 1.0;
        if !ordered {
            return Err(AnalysisError::InvalidConfig(format!(
                "thresholds must satisfy 0 <= strong_sell < sell < buy < strong_buy <= 1, got {self:?}"
            )));
        }
        Ok(())
    }

    /// NaN scores classify as HOLD.
    pub fn classify(&self, score: f64) -> Action {
        match score {
            s if s.is_nan() => Action::Hold,
            s if s >= self.strong_buy => Action::StrongBuy,
            s if s >= self.buy => Action::Buy,
            s if s >= self.sell => Action::Hold,
            s if s >= self.strong_sell => Action::Sell,
            _ => Action::StrongSell,
        }
    }
}
