use analysis_core::numeric::round_dp;
use analysis_core::PricePoint;
use serde::{Deserialize, Serialize};

use crate::indicators::{linear_regression, usable_closes};

/// Fewer usable closes than this produces an empty forecast
pub const MIN_FORECAST_POINTS: usize = 10;

/// Per-step move of more than 1% counts as up / down
const STEP_MOVE_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepDirection {
    Up,
    Down,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Uptrend,
    Downtrend,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastStep {
    /// 1-based days ahead
    pub day: usize,
    pub value: Option<f64>,
    pub direction: StepDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendForecast {
    pub steps: Vec<ForecastStep>,
    pub trend: TrendDirection,
}

impl TrendForecast {
    fn empty(days: usize) -> Self {
        Self {
            steps: (1..=days)
                .map(|day| ForecastStep {
                    day,
                    value: None,
                    direction: StepDirection::Flat,
                })
                .collect(),
            trend: TrendDirection::Neutral,
        }
    }
}

/// Straight-line projection of closes `days` steps past the last point.
///
/// Each step is compared with the one before it (the first with the last
/// actual close). The overall trend compares the first and last projections.
pub fn forecast_trend(prices: &[PricePoint], days: usize) -> TrendForecast {
    let closes = usable_closes(prices);
    if closes.len() < MIN_FORECAST_POINTS || days == 0 {
        return TrendForecast::empty(days);
    }

    let Some(fit) = linear_regression(&closes) else {
        return TrendForecast::empty(days);
    };

    let n = closes.len();
    let mut previous = closes[n - 1];
    let mut steps = Vec::with_capacity(days);

    for day in 1..=days {
        let projected = fit.predict((n - 1 + day) as f64);
        let direction = if projected > previous * (1.0 + STEP_MOVE_THRESHOLD) {
            StepDirection::Up
        } else if projected < previous * (1.0 - STEP_MOVE_THRESHOLD) {
            StepDirection::Down
        } else {
            StepDirection::Flat
        };
        steps.push(ForecastStep {
            day,
            value: Some(round_dp(projected, 2)),
            direction,
        });
        previous = projected;
    }

    let first = steps.first().and_then(|s| s.value);
    let last = steps.last().and_then(|s| s.value);
    let trend = match (first, last) {
        (Some(f), Some(l)) if l > f => TrendDirection::Uptrend,
        (Some(f), Some(l)) if l < f => TrendDirection::Downtrend,
        _ => TrendDirection::Neutral,
    };

    TrendForecast { steps, trend }
}
