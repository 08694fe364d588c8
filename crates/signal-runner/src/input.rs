use analysis_core::{ExternalOpinion, PricePoint, TextSnippet};
use serde::Deserialize;
use signal_engine::TickerInput;
use std::collections::BTreeMap;

/// A snippet as fetchers tend to hand it over: a bare string or a tagged object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSnippet {
    Plain(String),
    Tagged(TextSnippet),
}

impl From<RawSnippet> for TextSnippet {
    fn from(raw: RawSnippet) -> Self {
        match raw {
            RawSnippet::Plain(text) => TextSnippet::from(text),
            RawSnippet::Tagged(snippet) => snippet,
        }
    }
}

/// One ticker's worth of fetched data, before normalisation
#[derive(Debug, Clone, Deserialize)]
pub struct RawTickerInput {
    pub ticker: String,
    #[serde(default)]
    pub snippets: Vec<RawSnippet>,
    /// Headlines grouped per source, e.g. {"GoogleNews": ["..."], "Barrons": ["..."]}
    #[serde(default)]
    pub sources: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub prices: Vec<PricePoint>,
    #[serde(default)]
    pub opinions: Vec<ExternalOpinion>,
}

impl From<RawTickerInput> for TickerInput {
    fn from(raw: RawTickerInput) -> Self {
        let mut snippets: Vec<TextSnippet> = raw.snippets.into_iter().map(Into::into).collect();
        for (source, headlines) in raw.sources {
            snippets.extend(
                headlines
                    .into_iter()
                    .filter(|h| !h.trim().is_empty())
                    .map(|h| TextSnippet::new(source.clone(), h)),
            );
        }

        TickerInput {
            ticker: raw.ticker.trim().to_uppercase(),
            snippets,
            prices: raw.prices,
            opinions: raw.opinions,
        }
    }
}

pub fn parse_batch(json: &str) -> serde_json::Result<Vec<TickerInput>> {
    let raw: Vec<RawTickerInput> = serde_json::from_str(json)?;
    Ok(raw.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_snippet_shapes_are_flattened() {
        let json = r#"[{
            "ticker": " aapl ",
            "snippets": ["Apple beats estimates", {"source": "CNBC", "text": "Record iPhone sales"}],
            "sources": {"GoogleNews": ["Upgrade from analyst", ""], "Barrons": ["Surge continues"]}
        }]"#;
        let batch = parse_batch(json).unwrap();
        assert_eq!(batch.len(), 1);

        let input = &batch[0];
        assert_eq!(input.ticker, "AAPL");
        let texts: Vec<(&str, &str)> = input
            .snippets
            .iter()
            .map(|s| (s.source.as_str(), s.text.as_str()))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("", "Apple beats estimates"),
                ("CNBC", "Record iPhone sales"),
                ("Barrons", "Surge continues"),
                ("GoogleNews", "Upgrade from analyst"),
            ]
        );
        assert!(input.prices.is_empty());
    }

    #[test]
    fn test_prices_and_opinions_pass_through() {
        let json = r#"[{
            "ticker": "MSFT",
            "prices": [{"timestamp": "2024-05-01T20:00:00Z", "close": 410.5}],
            "opinions": [{"source": "ModelA", "action_label": "BUY", "confidence": 0.8}]
        }]"#;
        let batch = parse_batch(json).unwrap();
        assert_eq!(batch[0].prices.len(), 1);
        assert_eq!(batch[0].prices[0].close, 410.5);
        assert_eq!(batch[0].opinions[0].source, "ModelA");
        assert!(batch[0].opinions[0].trailing_pct.is_none());
    }

    #[test]
    fn test_missing_ticker_is_an_error() {
        assert!(parse_batch(r#"[{"snippets": []}]"#).is_err());
    }
}
