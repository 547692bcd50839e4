//! Core domain types: tracked projects, ingested posts, and the
//! classification result attached to each post.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Five-point ordinal scale for expected market impact.
///
/// Variant order is severity order: the derived `Ord` puts the bearish
/// extremes below `NonSignificant` and the bullish extremes above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ImpactLevel {
    #[serde(rename = "Extremely Bearish")]
    ExtremelyBearish,
    #[serde(rename = "Bearish")]
    Bearish,
    #[serde(rename = "Non-Significant")]
    NonSignificant,
    #[serde(rename = "Bullish")]
    Bullish,
    #[serde(rename = "Extremely Bullish")]
    ExtremelyBullish,
}

impl ImpactLevel {
    pub const ALL: [ImpactLevel; 5] = [
        ImpactLevel::ExtremelyBearish,
        ImpactLevel::Bearish,
        ImpactLevel::NonSignificant,
        ImpactLevel::Bullish,
        ImpactLevel::ExtremelyBullish,
    ];

    /// Wire label, exactly as backends are asked to emit it.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactLevel::ExtremelyBearish => "Extremely Bearish",
            ImpactLevel::Bearish => "Bearish",
            ImpactLevel::NonSignificant => "Non-Significant",
            ImpactLevel::Bullish => "Bullish",
            ImpactLevel::ExtremelyBullish => "Extremely Bullish",
        }
    }

    /// Parse a wire label. Returns `None` for anything outside the closed set;
    /// callers decide how to degrade.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Extremely Bearish" => Some(ImpactLevel::ExtremelyBearish),
            "Bearish" => Some(ImpactLevel::Bearish),
            "Non-Significant" => Some(ImpactLevel::NonSignificant),
            "Bullish" => Some(ImpactLevel::Bullish),
            "Extremely Bullish" => Some(ImpactLevel::ExtremelyBullish),
            _ => None,
        }
    }

    /// Only the four non-neutral levels are worth waking anyone up for.
    pub fn triggers_notification(&self) -> bool {
        !matches!(self, ImpactLevel::NonSignificant)
    }

    /// Fixed bilingual display label with a color marker, used in alerts.
    pub fn label(&self) -> &'static str {
        match self {
            ImpactLevel::ExtremelyBullish => "🟢 Extremely Bullish / 极度看涨",
            ImpactLevel::Bullish => "🟢 Bullish / 看涨",
            ImpactLevel::NonSignificant => "⚪ Non-Significant / 无显著影响",
            ImpactLevel::Bearish => "🔴 Bearish / 看跌",
            ImpactLevel::ExtremelyBearish => "🔴 Extremely Bearish / 极度看跌",
        }
    }
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured judgement produced by the classification client.
/// A value object embedded in a [`Post`]; never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub event_type: String,
    pub impact_level: ImpactLevel,
    pub expected_volatility: String,
    pub key_factors: Vec<String>,
    pub historical_reference: String,
}

impl Analysis {
    /// Safety-valve result used when classification fails for any reason.
    /// Neutral level, so a backend outage never produces alerts.
    pub fn fallback() -> Self {
        Self {
            event_type: "Analysis unavailable".to_string(),
            impact_level: ImpactLevel::NonSignificant,
            expected_volatility: "±0-1%".to_string(),
            key_factors: vec![
                "AI analysis failed; no key factors available".to_string(),
                "Review the tweet content manually".to_string(),
                "Check the classification backend configuration".to_string(),
            ],
            historical_reference: "No historical reference available".to_string(),
        }
    }
}

/// A tracked crypto project. Identity is assigned by the directory at
/// creation and never changes; everything else is mutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub token_symbol: String,
    /// Twitter handle without the leading `@`; the routing join key.
    pub twitter_username: String,
    #[serde(default)]
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// One ingested tweet plus its classification, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Store-assigned document id; `None` until inserted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// External id from the source platform.
    pub tweet_id: String,
    pub project_id: String,
    pub twitter_username: String,
    pub token_symbol: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Attached at ingestion; the formatter tolerates `None`.
    pub analysis: Option<Analysis>,
}

/// Inbound webhook payload. The source platform sends either `id_str` or a
/// numeric `id`; `id_str` wins when both are present.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundTweet {
    #[serde(default)]
    pub id_str: Option<String>,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub user: Option<InboundUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundUser {
    pub screen_name: String,
}

impl InboundTweet {
    pub fn external_id(&self) -> Option<String> {
        if let Some(s) = &self.id_str {
            return Some(s.clone());
        }
        match &self.id {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn screen_name(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.screen_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_level_ordering_follows_severity() {
        assert!(ImpactLevel::ExtremelyBearish < ImpactLevel::Bearish);
        assert!(ImpactLevel::Bearish < ImpactLevel::NonSignificant);
        assert!(ImpactLevel::NonSignificant < ImpactLevel::Bullish);
        assert!(ImpactLevel::Bullish < ImpactLevel::ExtremelyBullish);
    }

    #[test]
    fn only_non_neutral_levels_trigger_notifications() {
        let triggering: Vec<_> = ImpactLevel::ALL
            .iter()
            .filter(|l| l.triggers_notification())
            .collect();
        assert_eq!(triggering.len(), 4);
        assert!(!ImpactLevel::NonSignificant.triggers_notification());
    }

    #[test]
    fn impact_level_serde_uses_wire_labels() {
        let json = serde_json::to_string(&ImpactLevel::ExtremelyBullish).unwrap();
        assert_eq!(json, "\"Extremely Bullish\"");
        let back: ImpactLevel = serde_json::from_str("\"Non-Significant\"").unwrap();
        assert_eq!(back, ImpactLevel::NonSignificant);
    }

    #[test]
    fn parse_rejects_unknown_labels() {
        assert_eq!(ImpactLevel::parse("Bullish"), Some(ImpactLevel::Bullish));
        assert_eq!(ImpactLevel::parse("  Bearish "), Some(ImpactLevel::Bearish));
        assert_eq!(ImpactLevel::parse("Moon"), None);
    }

    #[test]
    fn inbound_tweet_prefers_id_str_over_numeric_id() {
        let ev: InboundTweet = serde_json::from_str(
            r#"{"id_str": "123", "id": 456, "text": "hi", "user": {"screen_name": "acme"}}"#,
        )
        .unwrap();
        assert_eq!(ev.external_id().as_deref(), Some("123"));
        assert_eq!(ev.screen_name(), Some("acme"));

        let ev: InboundTweet =
            serde_json::from_str(r#"{"id": 456, "text": "hi"}"#).unwrap();
        assert_eq!(ev.external_id().as_deref(), Some("456"));
        assert_eq!(ev.screen_name(), None);
    }

    #[test]
    fn fallback_analysis_is_neutral_with_three_factors() {
        let a = Analysis::fallback();
        assert_eq!(a.impact_level, ImpactLevel::NonSignificant);
        assert_eq!(a.key_factors.len(), 3);
        assert_eq!(a.expected_volatility, "±0-1%");
    }
}
