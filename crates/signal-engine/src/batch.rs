use analysis_core::{Action, ExternalOpinion, PriceSeries, Recommendation, TextSnippet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::ScoringConfig;
use crate::engine::SignalEngine;

/// Already-fetched inputs for one ticker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickerInput {
    pub ticker: String,
    #[serde(default)]
    pub snippets: Vec<TextSnippet>,
    #[serde(default)]
    pub prices: PriceSeries,
    #[serde(default)]
    pub opinions: Vec<ExternalOpinion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRecommendation {
    pub ticker: String,
    pub recommendation: Recommendation,
}

impl SignalEngine {
    /// Score every ticker in parallel. Output order matches input order.
    pub fn score_batch(&self, inputs: &[TickerInput]) -> Vec<TickerRecommendation> {
        let results: Vec<TickerRecommendation> = inputs
            .par_iter()
            .map(|input| {
                let mut jitter = self.config().jitter_for(&input.ticker);
                let recommendation = self.score_with_jitter(
                    &input.snippets,
                    &input.prices,
                    &input.opinions,
                    jitter.as_mut(),
                );
                TickerRecommendation {
                    ticker: input.ticker.clone(),
                    recommendation,
                }
            })
            .collect();

        tracing::info!(
            tickers = results.len(),
            strong_buys = results
                .iter()
                .filter(|r| r.recommendation.action == Action::StrongBuy)
                .count(),
            "batch scored"
        );
        results
    }
}

/// [`SignalEngine::score_batch`] with an explicit config; invalid sections fall back to defaults.
pub fn score_batch(inputs: &[TickerInput], config: &ScoringConfig) -> Vec<TickerRecommendation> {
    SignalEngine::lenient(config).score_batch(inputs)
}

/// Up to `limit` results with the given action, highest combined score first.
/// Ties are broken by ticker so the ranking is stable.
pub fn top_picks(
    results: &[TickerRecommendation],
    action: Action,
    limit: usize,
) -> Vec<&TickerRecommendation> {
    top_pick_indices(results, action, limit)
        .into_iter()
        .map(|i| &results[i])
        .collect()
}

/// Same ranking as [`top_picks`], as positions in `results`.
///
/// Batch results line up with their inputs, so an index also identifies the
/// input a pick came from, even when a ticker appears more than once.
pub fn top_pick_indices(results: &[TickerRecommendation], action: Action, limit: usize) -> Vec<usize> {
    let mut picks: Vec<usize> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.recommendation.action == action)
        .map(|(i, _)| i)
        .collect();

    picks.sort_by(|&a, &b| {
        let (a, b) = (&results[a], &results[b]);
        b.recommendation
            .combined_score
            .partial_cmp(&a.recommendation.combined_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    picks.truncate(limit);
    picks
}
