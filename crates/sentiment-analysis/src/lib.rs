use analysis_core::numeric::{clamp_unit, NEUTRAL_SCORE};
use analysis_core::{SentimentAnalyzer, TextSnippet};
use serde::{Deserialize, Serialize};

pub mod headline;
pub use headline::{headline_polarity, HeadlinePolarity, PolarityLabel};

pub const DEFAULT_BUY_KEYWORDS: &[&str] = &[
    "upgrade", "buy", "strong buy", "outperform", "beats", "beat", "surge", "gain", "record",
];

pub const DEFAULT_SELL_KEYWORDS: &[&str] = &[
    "downgrade", "sell", "strong sell", "miss", "misses", "loss", "fall", "decline", "bearish",
];

/// Raw keyword hit counts over a corpus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCounts {
    pub buy: usize,
    pub sell: usize,
}

impl KeywordCounts {
    pub fn total(&self) -> usize {
        self.buy + self.sell
    }

    /// buy / (buy + sell), or 0.5 when nothing matched.
    pub fn ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return NEUTRAL_SCORE;
        }
        clamp_unit(self.buy as f64 / total as f64)
    }
}

/// Bag-of-words keyword scorer.
///
/// All snippets are lower-cased and joined into one corpus, then each keyword
/// is counted as a plain substring (non-overlapping). This is deliberately
/// loose: "gain" also hits "again", "record" hits "recorded" and "beat" hits
/// every "beats".
#[derive(Debug, Clone)]
pub struct KeywordSentimentScorer {
    buy_keywords: Vec<String>,
    sell_keywords: Vec<String>,
}

impl KeywordSentimentScorer {
    pub fn new() -> Self {
        Self::with_keywords(DEFAULT_BUY_KEYWORDS, DEFAULT_SELL_KEYWORDS)
    }

    /// Keywords are lower-cased and trimmed. Blank keywords and any keyword
    /// present in both lists are dropped so the two sets stay disjoint.
    pub fn with_keywords<B, S>(buy: &[B], sell: &[S]) -> Self
    where
        B: AsRef<str>,
        S: AsRef<str>,
    {
        let normalize = |words: Vec<String>| -> Vec<String> {
            let mut out: Vec<String> = Vec::with_capacity(words.len());
            for w in words {
                if !w.is_empty() && !out.contains(&w) {
                    out.push(w);
                }
            }
            out
        };

        let buy = normalize(buy.iter().map(|w| w.as_ref().trim().to_lowercase()).collect());
        let sell = normalize(sell.iter().map(|w| w.as_ref().trim().to_lowercase()).collect());

        let buy_keywords: Vec<String> = buy.iter().filter(|w| !sell.contains(w)).cloned().collect();
        let sell_keywords: Vec<String> = sell.into_iter().filter(|w| !buy.contains(w)).collect();

        Self {
            buy_keywords,
            sell_keywords,
        }
    }

    pub fn buy_keywords(&self) -> &[String] {
        &self.buy_keywords
    }

    pub fn sell_keywords(&self) -> &[String] {
        &self.sell_keywords
    }

    /// Count keyword hits across all snippets.
    pub fn counts(&self, snippets: &[TextSnippet]) -> KeywordCounts {
        let corpus = build_corpus(snippets);
        if corpus.trim().is_empty() {
            return KeywordCounts::default();
        }

        KeywordCounts {
            buy: self
                .buy_keywords
                .iter()
                .map(|k| corpus.matches(k.as_str()).count())
                .sum(),
            sell: self
                .sell_keywords
                .iter()
                .map(|k| corpus.matches(k.as_str()).count())
                .sum(),
        }
    }

    /// Sentiment in 0.0..=1.0; 0.5 when there are no snippets or no hits.
    pub fn score(&self, snippets: &[TextSnippet]) -> f64 {
        let counts = self.counts(snippets);
        let score = counts.ratio();
        tracing::debug!(
            snippets = snippets.len(),
            buy_hits = counts.buy,
            sell_hits = counts.sell,
            score,
            "keyword sentiment scored"
        );
        score
    }
}

impl Default for KeywordSentimentScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentAnalyzer for KeywordSentimentScorer {
    fn score(&self, snippets: &[TextSnippet]) -> f64 {
        KeywordSentimentScorer::score(self, snippets)
    }
}

fn build_corpus(snippets: &[TextSnippet]) -> String {
    snippets
        .iter()
        .map(|s| s.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
