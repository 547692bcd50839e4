//! Classification client: provider abstraction + best-effort JSON parsing.
//!
//! The contract is deliberately forgiving: whatever goes wrong between the
//! prompt and the parsed result, `Analyzer::classify` returns an
//! [`Analysis`] — degraded to [`Analysis::fallback`] in the worst case —
//! so a backend outage never blocks ingestion.

pub mod anthropic;
pub mod deepseek;
pub mod openai;

pub use anthropic::AnthropicBackend;
pub use deepseek::DeepseekBackend;
pub use openai::OpenAiBackend;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, warn};

use crate::config::{AiConfig, AiProvider};
use crate::model::{Analysis, ImpactLevel};

/// Low-level provider seam. The only thing the client asks of a backend is
/// "take a rendered prompt, return raw text".
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynBackend = Arc<dyn CompletionBackend>;

/// Build the configured backend once at startup; selection never happens
/// per-call.
pub fn build_backend(config: &AiConfig) -> DynBackend {
    match config.provider {
        AiProvider::OpenAi => Arc::new(OpenAiBackend::new(&config.api_key, &config.model)),
        AiProvider::Anthropic => Arc::new(AnthropicBackend::new(&config.api_key, &config.model)),
        AiProvider::Deepseek => Arc::new(DeepseekBackend::new(&config.api_key, &config.model)),
    }
}

/// System prompt shared by all chat-style backends.
pub(crate) const SYSTEM_PROMPT: &str =
    "You are a professional cryptocurrency market analyst. Output the analysis as JSON.";

/// Classification client wrapping one active backend.
#[derive(Clone)]
pub struct Analyzer {
    backend: DynBackend,
}

impl Analyzer {
    pub fn new(backend: DynBackend) -> Self {
        Self { backend }
    }

    pub fn from_config(config: &AiConfig) -> Self {
        Self::new(build_backend(config))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Classify a tweet's likely impact on the given token. Never fails:
    /// backend errors and unparsable output degrade to the neutral fallback.
    pub async fn classify(&self, tweet_text: &str, token_symbol: &str) -> Analysis {
        let prompt = build_prompt(tweet_text, token_symbol);
        let raw = match self.backend.complete(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(backend = self.backend.name(), error = %e, "classification call failed");
                return Analysis::fallback();
            }
        };
        match parse_analysis(&raw) {
            Some(analysis) => analysis,
            None => {
                warn!(
                    backend = self.backend.name(),
                    "backend output contained no parseable JSON"
                );
                Analysis::fallback()
            }
        }
    }
}

/// Render the instruction prompt. States the five permitted impact labels
/// verbatim and asks for strict JSON with exactly the five required keys.
pub fn build_prompt(tweet_text: &str, token_symbol: &str) -> String {
    format!(
        "You are a cryptocurrency market analyst. Assess the potential impact of the \
tweet below on the price of the token [{token_symbol}].

Base the assessment on:
1. Whether it involves key events such as partnerships, regulatory approval, or technical breakthroughs
2. Market-sentiment keywords (e.g. \"major milestone\", \"first ever\", \"exclusive\")
3. Comparable historical events and how the token's price reacted to them
4. Crypto-industry sentiment vocabulary

Tweet: {tweet_text}

Required output:
1. A short summary of the event type
2. Impact level, exactly one of:
- Extremely Bullish
- Bullish
- Non-Significant
- Bearish
- Extremely Bearish
3. Expected volatility as a ± percentage range
4. Three key factors driving the assessment
5. Historical reference: a comparable past event and the market reaction at the time

Respond with strict JSON containing exactly these keys: \
event_type, impact_level, expected_volatility, key_factors (array of strings), historical_reference"
    )
}

/// Two-stage parse: strict JSON first, then the first-`{` .. last-`}`
/// substring (backends wrap JSON in prose or code fences). Returns `None`
/// only when neither attempt yields a JSON object; a well-formed object
/// missing keys is filled with placeholders instead of being discarded.
pub fn parse_analysis(raw: &str) -> Option<Analysis> {
    let value: Value = serde_json::from_str(raw)
        .ok()
        .or_else(|| extract_json_object(raw).and_then(|s| serde_json::from_str(s).ok()))?;
    let obj = value.as_object()?;

    let text_field = |key: &str| -> String {
        match obj.get(key).and_then(Value::as_str) {
            Some(s) => s.to_string(),
            None => {
                warn!(key, "backend response missing required field");
                "not provided".to_string()
            }
        }
    };

    let impact_level = obj
        .get("impact_level")
        .and_then(Value::as_str)
        .and_then(ImpactLevel::parse)
        .unwrap_or(ImpactLevel::NonSignificant);

    let key_factors = obj
        .get("key_factors")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(Analysis {
        event_type: text_field("event_type"),
        impact_level,
        expected_volatility: text_field("expected_volatility"),
        key_factors,
        historical_reference: text_field("historical_reference"),
    })
}

/// Brace-delimited substring of `raw`, if any.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end >= start).then(|| &raw[start..=end])
}
