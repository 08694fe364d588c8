use analysis_core::{AnalysisError, PricePoint};

/// RSI reported when the average loss is zero (flat or one-way series).
pub const RSI_FALLBACK: f64 = 50.0;

/// Usable closes in chronological order.
///
/// Non-finite and non-positive closes are dropped; the remaining points are
/// stably sorted by timestamp so out-of-order input still reads oldest first.
pub fn usable_closes(prices: &[PricePoint]) -> Vec<f64> {
    let mut points: Vec<&PricePoint> = prices.iter().filter(|p| p.is_usable()).collect();
    if !points.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
        points.sort_by_key(|p| p.timestamp);
    }
    points.into_iter().map(|p| p.close).collect()
}

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Mean of the last `period` values, or of the whole slice when it is shorter.
pub fn trailing_mean(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.is_empty() {
        return None;
    }
    let window = period.min(data.len());
    sma(&data[data.len() - window..], window).last().copied()
}

/// Relative strength over the last `period` daily deltas.
///
/// RS is the mean positive delta over the mean absolute negative delta, mapped
/// to 0..=100 the usual way. There is no Wilder smoothing. A zero average loss
/// yields [`RSI_FALLBACK`] instead of a division by zero.
pub fn simple_rsi(data: &[f64], period: usize) -> Option<f64> {
    try_simple_rsi(data, period).ok()
}

pub fn try_simple_rsi(data: &[f64], period: usize) -> Result<f64, AnalysisError> {
    if period == 0 || data.len() < 2 {
        return Err(AnalysisError::InsufficientData(
            "RSI needs at least two closes".to_string(),
        ));
    }

    let deltas: Vec<f64> = data.windows(2).map(|w| w[1] - w[0]).collect();
    let window = &deltas[deltas.len().saturating_sub(period)..];
    let n = window.len() as f64;

    let avg_gain = window.iter().filter(|d| **d > 0.0).sum::<f64>() / n;
    let avg_loss = window.iter().filter(|d| **d < 0.0).map(|d| d.abs()).sum::<f64>() / n;

    if avg_loss == 0.0 {
        return Ok(RSI_FALLBACK);
    }

    let rs = avg_gain / avg_loss;
    Ok(100.0 - (100.0 / (1.0 + rs)))
}

/// Ordinary least squares fit of `y` against its index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

pub fn linear_regression(y: &[f64]) -> Option<LinearFit> {
    if y.len() < 2 {
        return None;
    }

    let n = y.len() as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = y.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &v) in y.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (v - y_mean);
        den += dx * dx;
    }

    if den == 0.0 {
        return None;
    }

    let slope = num / den;
    Some(LinearFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}
