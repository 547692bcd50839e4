//! DeepSeek backend. OpenAI-shaped chat completions at the DeepSeek endpoint.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CompletionBackend, SYSTEM_PROMPT};

const DEFAULT_API_BASE: &str = "https://api.deepseek.com";

pub struct DeepseekBackend {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl DeepseekBackend {
    pub fn new(api_key: &str, model: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("xmonitor/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the backend at a different base URL (tests).
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: String,
}

#[async_trait]
impl CompletionBackend for DeepseekBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("DEEPSEEK_API_KEY is not set");
        }

        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let url = format!("{}/v1/chat/completions", self.api_base);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("deepseek request")?;

        if !resp.status().is_success() {
            bail!("DeepSeek API returned {}", resp.status());
        }

        let body: Resp = resp.json().await.context("deepseek response body")?;
        match body.choices.into_iter().next() {
            Some(c) if !c.message.content.is_empty() => Ok(c.message.content),
            _ => bail!("DeepSeek response contained no choices"),
        }
    }

    fn name(&self) -> &'static str {
        "deepseek"
    }
}
