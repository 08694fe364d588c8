use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AnalysisError;

/// A piece of text pulled from a news source, RSS feed or quote page.
///
/// The source tag is kept for reporting only; every snippet is pooled into
/// the same bag of words when scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSnippet {
    #[serde(default)]
    pub source: String,
    pub text: String,
}

impl TextSnippet {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

impl From<&str> for TextSnippet {
    fn from(text: &str) -> Self {
        Self::new("", text)
    }
}

impl From<String> for TextSnippet {
    fn from(text: String) -> Self {
        Self::new("", text)
    }
}

/// Daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }

    /// A close is usable when it is a finite, strictly positive price.
    pub fn is_usable(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Chronological close prices. May be empty or shorter than any indicator window.
pub type PriceSeries = Vec<PricePoint>;

/// Categorical action derived from a combined score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Action {
    /// Human-readable label used in alerts
    pub fn to_label(&self) -> &'static str {
        match self {
            Action::StrongBuy => "STRONG BUY",
            Action::Buy => "BUY",
            Action::Hold => "HOLD",
            Action::Sell => "SELL",
            Action::StrongSell => "STRONG SELL",
        }
    }

    /// +1 for buy-side actions, -1 for sell-side, 0 for hold.
    pub fn direction(&self) -> i8 {
        match self {
            Action::StrongBuy | Action::Buy => 1,
            Action::Hold => 0,
            Action::Sell | Action::StrongSell => -1,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_label())
    }
}

impl FromStr for Action {
    type Err = AnalysisError;

    /// Accepts "STRONG BUY", "strong_buy", "Strong-Buy", "StrongBuy" and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "strongbuy" => Ok(Action::StrongBuy),
            "buy" => Ok(Action::Buy),
            "hold" | "neutral" => Ok(Action::Hold),
            "sell" => Ok(Action::Sell),
            "strongsell" => Ok(Action::StrongSell),
            _ => Err(AnalysisError::InvalidData(format!("Unknown action label: {s}"))),
        }
    }
}

/// Recommendation from a third party or model (e.g. "ModelA").
///
/// Never authoritative: it is attached to the output as an [`Advisory`] and does
/// not influence the combined score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalOpinion {
    pub source: String,
    pub action_label: String,
    pub confidence: f64,
    #[serde(default)]
    pub trailing_pct: Option<f64>,
    #[serde(default)]
    pub offset_pct: Option<f64>,
}

/// Sanitised external opinion as reported alongside a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub source: String,
    /// None when the opinion's label could not be parsed
    pub action: Option<Action>,
    /// Clamped to 0.0..=1.0, 0.0 when not finite
    pub confidence: f64,
    pub trailing_pct: Option<f64>,
    pub offset_pct: Option<f64>,
    /// Whether the opinion points the same way (buy/hold/sell) as the internal action
    pub agrees: bool,
}

/// Sub-scores that went into the blend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sentiment: f64,
    pub technical: f64,
    /// Signed perturbation applied to the sentiment component (0.0 when disabled)
    pub jitter: f64,
}

/// Output of one scoring call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub combined_score: f64, // 0.0 to 1.0
    pub action: Action,
    pub trailing_pct: f64,
    pub offset_pct: f64,
    pub breakdown: ScoreBreakdown,
    #[serde(default)]
    pub advisories: Vec<Advisory>,
}

impl Recommendation {
    /// Number of advisories whose direction matches the internal action
    pub fn agreeing_advisories(&self) -> usize {
        self.advisories.iter().filter(|a| a.agrees).count()
    }
}
