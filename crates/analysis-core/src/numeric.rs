//! Numeric helpers shared by the scorers.

/// Score reported when there is no usable signal.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Clamp to 0.0..=1.0. NaN maps to the neutral score.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return NEUTRAL_SCORE;
    }
    value.clamp(0.0, 1.0)
}

/// Round half away from zero to `places` decimals.
pub fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
