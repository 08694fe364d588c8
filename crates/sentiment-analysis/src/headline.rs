use serde::{Deserialize, Serialize};

/// Weighted bullish phrases; each counts once per headline when present.
const BULLISH_PHRASES: &[(&str, f64)] = &[
    ("upgrade", 0.3),
    ("breakout", 0.4),
    ("rally", 0.3),
    ("strong buy", 0.6),
    ("surge", 0.5),
];

const BEARISH_PHRASES: &[(&str, f64)] = &[
    ("downgrade", 0.3),
    ("sell", 0.3),
    ("drop", 0.4),
    ("decline", 0.3),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolarityLabel {
    Bullish,
    Bearish,
    Neutral,
}

/// Signed polarity of a single headline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadlinePolarity {
    pub score: f64,
    pub label: PolarityLabel,
}

/// Score one headline by phrase presence rather than counts.
///
/// Unlike the pooled keyword scorer this is unbounded and signed: a headline
/// carrying both "downgrade" and "sell" lands at -0.6.
pub fn headline_polarity(headline: &str) -> HeadlinePolarity {
    let text = headline.to_lowercase();

    let bullish: f64 = BULLISH_PHRASES
        .iter()
        .filter(|(phrase, _)| text.contains(phrase))
        .map(|(_, w)| w)
        .sum();
    let bearish: f64 = BEARISH_PHRASES
        .iter()
        .filter(|(phrase, _)| text.contains(phrase))
        .map(|(_, w)| w)
        .sum();

    let score = bullish - bearish;
    let label = if score > 0.0 {
        PolarityLabel::Bullish
    } else if score < 0.0 {
        PolarityLabel::Bearish
    } else {
        PolarityLabel::Neutral
    };

    HeadlinePolarity { score, label }
}
