//! Signal scoring engine.
//!
//! Pools news snippets into a keyword sentiment score, derives a technical
//! score from closes, blends the two into a combined score in 0.0..=1.0 and
//! maps that onto an action and trailing / offset percentages. External model
//! opinions ride along as advisories only.

pub mod batch;
pub mod classifier;
pub mod combiner;
pub mod config;
pub mod engine;
pub mod exit;
pub mod risk;


pub use batch::{score_batch, top_pick_indices, top_picks, TickerInput, TickerRecommendation};
pub use classifier::ActionThresholds;
pub use combiner::{combine, Blend, EntropyJitter, Jitter, NoJitter, SeededJitter};
pub use config::ScoringConfig;
pub use engine::{score, SignalEngine};
pub use exit::{EntryLevels, ExitPolicy, ExitReason, PriceLevels};
pub use risk::{RiskLevels, RiskParams};

pub use analysis_core::{
    Action, Advisory, ExternalOpinion, PricePoint, PriceSeries, Recommendation, ScoreBreakdown,
    TextSnippet,
};
