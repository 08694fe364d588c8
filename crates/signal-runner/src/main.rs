use std::io::Read;

use analysis_core::Action;
use anyhow::{Context, Result};
use serde::Serialize;
use signal_engine::config::env_or;
use signal_engine::{
    top_pick_indices, EntryLevels, PriceLevels, ScoringConfig, SignalEngine, TickerInput,
    TickerRecommendation,
};
use technical_analysis::{forecast_trend, usable_closes, TrendForecast};

mod input;

const FORECAST_DAYS: usize = 5;

#[derive(Debug, Serialize)]
struct Pick<'a> {
    #[serde(flatten)]
    scored: &'a TickerRecommendation,
    forecast: TrendForecast,
    entry_levels: Option<PriceLevels>,
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    results: &'a [TickerRecommendation],
    top_picks: Vec<Pick<'a>>,
}

fn main() -> Result<()> {
    // 1. Load .env, init tracing (logs go to stderr, the report to stdout)
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // 2. Configuration
    let config = ScoringConfig::from_env()?;
    let top_n: usize = env_or("SIGNAL_TOP_PICKS", 4)?;
    tracing::info!(
        "Scoring config: weights {:.2}/{:.2}, jitter {}",
        config.sentiment_weight,
        config.technical_weight,
        if config.jitter_enabled { "on" } else { "off" }
    );
    let engine = SignalEngine::new(config)?;

    // 3. Read the batch from a file argument or stdin
    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {path}"))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    let inputs = input::parse_batch(&raw).context("input is not a valid ticker batch")?;
    tracing::info!("Loaded {} tickers", inputs.len());

    // 4. Score and rank
    let results = engine.score_batch(&inputs);
    let top_picks = build_picks(&inputs, &results, top_n);
    if top_picks.is_empty() {
        tracing::info!("No STRONG BUY signals this run");
    }

    let report = RunReport {
        results: &results,
        top_picks,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// STRONG BUY picks with a forecast and entry levels from each pick's own prices.
///
/// `results` must line up with `inputs`, as `SignalEngine::score_batch` returns them.
fn build_picks<'a>(
    inputs: &[TickerInput],
    results: &'a [TickerRecommendation],
    limit: usize,
) -> Vec<Pick<'a>> {
    let entry = EntryLevels::default();
    top_pick_indices(results, Action::StrongBuy, limit)
        .into_iter()
        .map(|i| {
            let scored = &results[i];
            let prices = inputs.get(i).map(|input| input.prices.as_slice()).unwrap_or(&[]);
            let last_close = usable_closes(prices).last().copied();
            tracing::info!(
                ticker = %scored.ticker,
                score = scored.recommendation.combined_score,
                trailing = scored.recommendation.trailing_pct,
                offset = scored.recommendation.offset_pct,
                "top pick"
            );
            Pick {
                scored,
                forecast: forecast_trend(prices, FORECAST_DAYS),
                entry_levels: last_close.and_then(|p| entry.levels(p)),
            }
        })
        .collect()
}
