//! Telegram Bot API dispatcher.
//!
//! Delivery is best-effort: every public method reports success as a bool,
//! logs failures, and never propagates an error. Missing credentials
//! short-circuit to `false` without any network I/O.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use super::{pack_rows, Button, Notifier};
use crate::config::TelegramConfig;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    bot_token: Option<String>,
    chat_id: Option<String>,
    api_base: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<serde_json::Value>,
}

impl TelegramNotifier {
    pub fn from_config(config: &TelegramConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("xmonitor/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(10))
            .build()
            .expect("reqwest client");
        Self {
            http,
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the notifier at a different API base (tests).
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, token, method)
    }

    /// Send a plain HTML message. `false` when unconfigured or on any
    /// delivery failure.
    pub async fn send_message(&self, message: &str) -> bool {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            error!("Telegram configuration incomplete; notification not sent");
            return false;
        };

        let body = json!({
            "chat_id": chat_id,
            "text": message,
            "parse_mode": "HTML",
            "disable_web_page_preview": false,
        });
        self.post_send_message(token, body).await
    }

    /// Send an HTML message with an inline keyboard, two buttons per row.
    pub async fn send_with_buttons(&self, message: &str, buttons: &[Button]) -> bool {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            error!("Telegram configuration incomplete; notification not sent");
            return false;
        };
        if buttons.is_empty() {
            return self.send_message(message).await;
        }

        let body = json!({
            "chat_id": chat_id,
            "text": message,
            "parse_mode": "HTML",
            "disable_web_page_preview": false,
            "reply_markup": { "inline_keyboard": pack_rows(buttons) },
        });
        self.post_send_message(token, body).await
    }

    async fn post_send_message(&self, token: &str, body: serde_json::Value) -> bool {
        let url = self.method_url(token, "sendMessage");
        let resp = match self.http.post(&url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!(error = %e, "Telegram request failed");
                return false;
            }
        };

        let status = resp.status();
        let api: ApiResponse = match resp.json().await {
            Ok(api) => api,
            Err(e) => {
                error!(error = %e, "Telegram response was not valid JSON");
                return false;
            }
        };

        if status.is_success() && api.ok {
            info!("Telegram notification delivered");
            true
        } else {
            error!(
                status = %status,
                description = api.description.as_deref().unwrap_or("none"),
                "Telegram notification rejected"
            );
            false
        }
    }

    /// Connectivity self-test against `getMe`. Logs the bot username on
    /// success.
    pub async fn test_connection(&self) -> bool {
        let Some(token) = &self.bot_token else {
            error!("Telegram bot token missing; cannot test connection");
            return false;
        };

        let url = self.method_url(token, "getMe");
        let resp = match self.http.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!(error = %e, "Telegram connectivity test failed");
                return false;
            }
        };

        let status = resp.status();
        match resp.json::<ApiResponse>().await {
            Ok(api) if status.is_success() && api.ok => {
                let username = api
                    .result
                    .as_ref()
                    .and_then(|r| r.get("username"))
                    .and_then(|u| u.as_str())
                    .unwrap_or("unknown");
                info!(bot = username, "Telegram bot connection OK");
                true
            }
            Ok(api) => {
                warn!(
                    status = %status,
                    description = api.description.as_deref().unwrap_or("none"),
                    "Telegram bot identity check failed"
                );
                false
            }
            Err(e) => {
                error!(error = %e, "Telegram getMe response was not valid JSON");
                false
            }
        }
    }

    /// Wrap an error string in the fixed alert template and send it.
    pub async fn send_error_notification(&self, error_message: &str) -> bool {
        let message = format!("⚠️ <b>XMonitor system error</b>\n\n<pre>{error_message}</pre>");
        self.send_message(&message).await
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str, buttons: Option<&[Button]>) -> bool {
        match buttons {
            Some(buttons) if !buttons.is_empty() => {
                self.send_with_buttons(message, buttons).await
            }
            _ => self.send_message(message).await,
        }
    }
}
