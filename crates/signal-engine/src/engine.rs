use analysis_core::{
    Action, Advisory, AnalysisError, ExternalOpinion, PricePoint, Recommendation, ScoreBreakdown,
    SentimentAnalyzer, TechnicalAnalyzer, TextSnippet,
};
use sentiment_analysis::KeywordSentimentScorer;
use technical_analysis::TechnicalScorer;

use crate::combiner::{combine, Jitter};
use crate::config::ScoringConfig;

/// Turns snippets, prices and external opinions into a [`Recommendation`].
///
/// Holds no per-call state, so one engine can score many tickers from many
/// threads at once.
pub struct SignalEngine {
    config: ScoringConfig,
    sentiment: Box<dyn SentimentAnalyzer>,
    technical: Box<dyn TechnicalAnalyzer>,
}

impl SignalEngine {
    pub fn new(config: ScoringConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Engine from a config that may be partly invalid; broken sections
    /// fall back to their defaults.
    pub fn lenient(config: &ScoringConfig) -> Self {
        Self::from_valid(config.sanitized())
    }

    fn from_valid(config: ScoringConfig) -> Self {
        let technical = TechnicalScorer::with_config(config.technical.clone());
        Self {
            config,
            sentiment: Box::new(KeywordSentimentScorer::new()),
            technical: Box::new(technical),
        }
    }

    pub fn with_sentiment_analyzer(mut self, analyzer: impl SentimentAnalyzer + 'static) -> Self {
        self.sentiment = Box::new(analyzer);
        self
    }

    pub fn with_technical_analyzer(mut self, analyzer: impl TechnicalAnalyzer + 'static) -> Self {
        self.technical = Box::new(analyzer);
        self
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one ticker. Never fails: missing data resolves to neutral sub-scores.
    pub fn score(
        &self,
        snippets: &[TextSnippet],
        prices: &[PricePoint],
        opinions: &[ExternalOpinion],
    ) -> Recommendation {
        let mut jitter = self.config.jitter();
        self.score_with_jitter(snippets, prices, opinions, jitter.as_mut())
    }

    pub fn score_with_jitter(
        &self,
        snippets: &[TextSnippet],
        prices: &[PricePoint],
        opinions: &[ExternalOpinion],
        jitter: &mut dyn Jitter,
    ) -> Recommendation {
        let sentiment = self.sentiment.score(snippets);
        let technical = self.technical.score(prices);

        let blend = combine(
            sentiment,
            technical,
            (self.config.sentiment_weight, self.config.technical_weight),
            self.config.jitter_amplitude,
            jitter,
        );
        let action = self.config.thresholds.classify(blend.score);
        let levels = self.config.risk.map(blend.score);
        let advisories = advise(opinions, action);

        tracing::debug!(
            snippets = snippets.len(),
            prices = prices.len(),
            opinions = opinions.len(),
            sentiment = blend.sentiment,
            technical = blend.technical,
            jitter = blend.jitter,
            combined = blend.score,
            action = %action,
            "recommendation scored"
        );

        Recommendation {
            combined_score: blend.score,
            action,
            trailing_pct: levels.trailing_pct,
            offset_pct: levels.offset_pct,
            breakdown: ScoreBreakdown {
                sentiment: blend.sentiment,
                technical: blend.technical,
                jitter: blend.jitter,
            },
            advisories,
        }
    }
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self::from_valid(ScoringConfig::default())
    }
}

/// One-shot scoring with an explicit config.
///
/// Invalid config sections are replaced by their defaults (with a warning)
/// rather than reported, so this never fails.
pub fn score(
    snippets: &[TextSnippet],
    prices: &[PricePoint],
    opinions: &[ExternalOpinion],
    config: &ScoringConfig,
) -> Recommendation {
    SignalEngine::lenient(config).score(snippets, prices, opinions)
}

/// Attach external opinions as annotations. They never feed back into the score.
fn advise(opinions: &[ExternalOpinion], action: Action) -> Vec<Advisory> {
    opinions
        .iter()
        .map(|opinion| {
            let parsed = opinion.action_label.parse::<Action>().ok();
            if parsed.is_none() {
                tracing::debug!(
                    source = %opinion.source,
                    label = %opinion.action_label,
                    "unrecognised external action label"
                );
            }
            Advisory {
                source: opinion.source.clone(),
                action: parsed,
                confidence: normalize_confidence(opinion.confidence),
                trailing_pct: opinion.trailing_pct.filter(|v| v.is_finite() && *v > 0.0),
                offset_pct: opinion.offset_pct.filter(|v| v.is_finite() && *v > 0.0),
                agrees: parsed.is_some_and(|a| a.direction() == action.direction()),
            }
        })
        .collect()
}

/// Confidence in 0.0..=1.0. Values in (1, 100] are read as percentages.
fn normalize_confidence(confidence: f64) -> f64 {
    if !confidence.is_finite() || confidence <= 0.0 {
        return 0.0;
    }
    if confidence > 1.0 && confidence <= 100.0 {
        return confidence / 100.0;
    }
    confidence.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opinion(source: &str, label: &str, confidence: f64) -> ExternalOpinion {
        ExternalOpinion {
            source: source.to_string(),
            action_label: label.to_string(),
            confidence,
            trailing_pct: None,
            offset_pct: None,
        }
    }

    #[test]
    fn test_normalize_confidence() {
        assert_eq!(normalize_confidence(0.8), 0.8);
        assert_eq!(normalize_confidence(85.0), 0.85);
        assert_eq!(normalize_confidence(250.0), 1.0);
        assert_eq!(normalize_confidence(-0.2), 0.0);
        assert_eq!(normalize_confidence(f64::NAN), 0.0);
    }

    #[test]
    fn test_advisories_mark_agreement_by_direction() {
        let advisories = advise(
            &[
                opinion("ModelA", "BUY", 0.7),
                opinion("ModelB", "strong sell", 0.9),
                opinion("ModelC", "to the moon", 1.0),
            ],
            Action::StrongBuy,
        );
        assert_eq!(advisories.len(), 3);
        assert!(advisories[0].agrees);
        assert_eq!(advisories[1].action, Some(Action::StrongSell));
        assert!(!advisories[1].agrees);
        assert_eq!(advisories[2].action, None);
        assert!(!advisories[2].agrees);
    }

    #[test]
    fn test_advisory_risk_hints_are_sanitised() {
        let mut o = opinion("ModelA", "HOLD", 0.5);
        o.trailing_pct = Some(-4.0);
        o.offset_pct = Some(2.5);
        let advisories = advise(&[o], Action::Hold);
        assert_eq!(advisories[0].trailing_pct, None);
        assert_eq!(advisories[0].offset_pct, Some(2.5));
        assert!(advisories[0].agrees);
    }

    struct Constant(f64);

    impl SentimentAnalyzer for Constant {
        fn score(&self, _snippets: &[TextSnippet]) -> f64 {
            self.0
        }
    }

    impl TechnicalAnalyzer for Constant {
        fn score(&self, _prices: &[PricePoint]) -> f64 {
            self.0
        }
    }

    #[test]
    fn test_custom_analyzers_are_used() {
        let engine = SignalEngine::default()
            .with_sentiment_analyzer(Constant(1.0))
            .with_technical_analyzer(Constant(1.0));
        let rec = engine.score(&[], &[], &[]);
        assert_eq!(rec.combined_score, 1.0);
        assert_eq!(rec.action, Action::StrongBuy);
    }

    #[test]
    fn test_misbehaving_analyzer_is_contained() {
        let engine = SignalEngine::default()
            .with_sentiment_analyzer(Constant(f64::NAN))
            .with_technical_analyzer(Constant(-12.0));
        let rec = engine.score(&[], &[], &[]);
        assert!((0.0..=1.0).contains(&rec.combined_score));
        assert_eq!(rec.breakdown.sentiment, 0.5);
        assert_eq!(rec.breakdown.technical, 0.0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ScoringConfig {
            sentiment_weight: -1.0,
            ..ScoringConfig::default()
        };
        assert!(SignalEngine::new(config).is_err());
    }
}
