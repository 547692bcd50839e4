// src/config.rs
//! Process configuration, read once at startup and passed into component
//! constructors. No module-level globals.

use std::env;

use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    OpenAi,
    Anthropic,
    Deepseek,
}

impl AiProvider {
    pub fn parse(label: &str) -> Result<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAi),
            "anthropic" => Ok(AiProvider::Anthropic),
            "deepseek" => Ok(AiProvider::Deepseek),
            other => bail!("Unsupported AI provider: {other}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: AiProvider,
    pub api_key: String,
    pub model: String,
}

impl AiConfig {
    /// Reads `AI_PROVIDER` plus the matching `*_API_KEY` / `*_MODEL` pair.
    /// An unknown provider label fails here, at startup, not per-call.
    pub fn from_env() -> Result<Self> {
        let provider = AiProvider::parse(
            &env::var("AI_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
        )?;

        let (key_var, model_var, default_model) = match provider {
            AiProvider::OpenAi => ("OPENAI_API_KEY", "OPENAI_MODEL", "gpt-4o-mini"),
            AiProvider::Anthropic => (
                "ANTHROPIC_API_KEY",
                "ANTHROPIC_MODEL",
                "claude-3-5-sonnet-latest",
            ),
            AiProvider::Deepseek => ("DEEPSEEK_API_KEY", "DEEPSEEK_MODEL", "deepseek-chat"),
        };

        Ok(Self {
            provider,
            api_key: env::var(key_var).unwrap_or_default(),
            model: env::var(model_var).unwrap_or_else(|_| default_model.to_string()),
        })
    }
}

/// Telegram destination. Either field may be unset; the dispatcher
/// short-circuits to failure instead of attempting delivery.
#[derive(Debug, Clone, Default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    pub fn from_env() -> Self {
        Self {
            bot_token: env::var("TELEGRAM_BOT_TOKEN").ok().filter(|s| !s.is_empty()),
            chat_id: env::var("TELEGRAM_CHAT_ID").ok().filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Expected value of the `X-Webhook-Secret` header.
    pub webhook_secret: Option<String>,
    pub ai: AiConfig,
    pub telegram: TelegramConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(s) => s.parse().map_err(|_| anyhow::anyhow!("Invalid PORT: {s}"))?,
            Err(_) => 5000,
        };
        Ok(Self {
            port,
            webhook_secret: env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty()),
            ai: AiConfig::from_env()?,
            telegram: TelegramConfig::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_labels_are_case_insensitive() {
        assert_eq!(AiProvider::parse("OpenAI").unwrap(), AiProvider::OpenAi);
        assert_eq!(AiProvider::parse("deepseek").unwrap(), AiProvider::Deepseek);
        assert_eq!(
            AiProvider::parse(" Anthropic ").unwrap(),
            AiProvider::Anthropic
        );
        assert!(AiProvider::parse("bard").is_err());
    }
}
