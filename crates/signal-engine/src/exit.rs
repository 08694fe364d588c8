use analysis_core::numeric::round_dp;
use sentiment_analysis::{headline_polarity, PolarityLabel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    NegativeNews { headline: String, polarity: f64 },
}

/// When to leave an open position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitPolicy {
    pub take_profit_pct: f64,         // 8.0
    pub stop_loss_pct: f64,           // 5.0
    /// Bearish headlines scoring below this trigger an exit
    pub negative_news_threshold: f64, // -0.4
}

impl Default for ExitPolicy {
    fn default() -> Self {
        Self {
            take_profit_pct: 8.0,
            stop_loss_pct: 5.0,
            negative_news_threshold: -0.4,
        }
    }
}

impl ExitPolicy {
    /// First exit condition that holds, checked in order: take profit, stop
    /// loss, negative news. Price checks are skipped when either price is not
    /// a finite positive number.
    pub fn check<S: AsRef<str>>(
        &self,
        entry_price: f64,
        current_price: f64,
        headlines: &[S],
    ) -> Option<ExitReason> {
        let prices_usable = entry_price.is_finite()
            && entry_price > 0.0
            && current_price.is_finite()
            && current_price > 0.0;

        if prices_usable {
            let change_pct = (current_price - entry_price) / entry_price * 100.0;
            if change_pct >= self.take_profit_pct {
                return Some(ExitReason::TakeProfit);
            }
            if change_pct <= -self.stop_loss_pct {
                return Some(ExitReason::StopLoss);
            }
        }

        headlines.iter().find_map(|h| {
            let polarity = headline_polarity(h.as_ref());
            (polarity.label == PolarityLabel::Bearish
                && polarity.score < self.negative_news_threshold)
                .then(|| ExitReason::NegativeNews {
                    headline: h.as_ref().to_string(),
                    polarity: polarity.score,
                })
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevels {
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}

/// Take-profit / stop-loss distances for a fresh entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryLevels {
    pub take_profit_pct: f64, // 10.0
    pub stop_loss_pct: f64,   // 5.0
}

impl Default for EntryLevels {
    fn default() -> Self {
        Self {
            take_profit_pct: 10.0,
            stop_loss_pct: 5.0,
        }
    }
}

impl EntryLevels {
    pub fn levels(&self, price: f64) -> Option<PriceLevels> {
        if !price.is_finite() || price <= 0.0 {
            return None;
        }
        Some(PriceLevels {
            entry: price,
            take_profit: round_dp(price * (1.0 + self.take_profit_pct / 100.0), 2),
            stop_loss: round_dp(price * (1.0 - self.stop_loss_pct / 100.0), 2),
        })
    }
}
