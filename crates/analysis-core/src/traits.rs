use crate::{PricePoint, TextSnippet};

/// Turns a bag of text snippets into a score in 0.0..=1.0 (0.5 = neutral).
///
/// Implementations must not fail: missing or unusable input resolves to 0.5.
pub trait SentimentAnalyzer: Send + Sync {
    fn score(&self, snippets: &[TextSnippet]) -> f64;
}

/// Turns a price series into a score in 0.0..=1.0 (0.5 = neutral).
///
/// Implementations must not fail: short or malformed series resolve to 0.5.
pub trait TechnicalAnalyzer: Send + Sync {
    fn score(&self, prices: &[PricePoint]) -> f64;
}
