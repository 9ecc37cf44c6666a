//! Telegram front-end over the Bot HTTP API
//!
//! Long polls `getUpdates`, hands each text message to the dispatcher on its
//! own task, and answers with `sendMessage` / `sendPhoto`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::bot::{ReplySink, RequestDispatcher};
use crate::error::{Result, StockError};

const API_BASE: &str = "https://api.telegram.org";

/// Seconds Telegram holds a `getUpdates` call open
const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed poll
const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Telegram bot configuration
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token from BotFather
    pub token: String,
    /// HTTP timeout for send calls
    pub request_timeout: Duration,
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Create config from `TELEGRAM_BOT_TOKEN`
    pub fn from_env() -> Result<Self> {
        bot_utils::env_var("TELEGRAM_BOT_TOKEN")
            .map(Self::new)
            .ok_or_else(|| StockError::ConfigError("TELEGRAM_BOT_TOKEN not set".to_string()))
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Bot API envelope
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

impl Update {
    /// Chat id and text of a plain text message
    pub fn text_message(&self) -> Option<(i64, &str)> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        Some((message.chat.id, text))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Minimal Bot API client
pub struct TelegramClient {
    http: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: format!("{API_BASE}/bot{}", config.token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    /// Long poll for updates after `offset`
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let response = self
            .http
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .json(&json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message"],
            }))
            .send()
            .await?;

        Ok(parse_response::<Vec<Update>>(response).await?.unwrap_or_default())
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await?;

        parse_response::<serde_json::Value>(response).await?;
        Ok(())
    }

    pub async fn send_photo(&self, chat_id: i64, png: Vec<u8>, caption: &str) -> Result<()> {
        let photo = Part::bytes(png)
            .file_name("chart.png")
            .mime_str("image/png")?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", photo);

        let response = self
            .http
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;

        parse_response::<serde_json::Value>(response).await?;
        Ok(())
    }
}

async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
    let status = response.status();
    let body = response.text().await?;
    let envelope: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
        StockError::TransportError(format!("unexpected Telegram response ({status}): {e}"))
    })?;
    into_result(envelope, status.as_u16())
}

fn into_result<T>(envelope: ApiResponse<T>, status: u16) -> Result<Option<T>> {
    if envelope.ok {
        Ok(envelope.result)
    } else {
        Err(StockError::TransportError(format!(
            "Telegram API error {status}: {}",
            envelope.description.unwrap_or_default()
        )))
    }
}

/// Replies into one chat
pub struct TelegramReplySink {
    client: Arc<TelegramClient>,
    chat_id: i64,
}

impl TelegramReplySink {
    pub fn new(client: Arc<TelegramClient>, chat_id: i64) -> Self {
        Self { client, chat_id }
    }
}

#[async_trait]
impl ReplySink for TelegramReplySink {
    async fn send_text(&self, text: &str) -> Result<()> {
        self.client.send_message(self.chat_id, text).await
    }

    async fn send_image(&self, png: Vec<u8>, caption: &str) -> Result<()> {
        self.client.send_photo(self.chat_id, png, caption).await
    }
}

/// Long-polling Telegram bot
pub struct TelegramBot {
    client: Arc<TelegramClient>,
    dispatcher: Arc<RequestDispatcher>,
}

impl TelegramBot {
    pub fn new(config: &TelegramConfig, dispatcher: Arc<RequestDispatcher>) -> Result<Self> {
        Ok(Self {
            client: Arc::new(TelegramClient::new(config)?),
            dispatcher,
        })
    }

    /// Poll until Ctrl-C; each message is handled on its own task
    pub async fn run(&self) -> Result<()> {
        info!("Telegram bot polling for updates");
        let mut offset = None;

        loop {
            let polled = tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("shutdown signal received");
                    return Ok(());
                }
                polled = self.client.get_updates(offset) => polled,
            };

            let updates = match polled {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "polling failed, retrying");
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                let Some((chat_id, text)) = update.text_message() else {
                    debug!(update_id = update.update_id, "skipping non-text update");
                    continue;
                };
                self.spawn_handler(chat_id, text.to_string());
            }
        }
    }

    fn spawn_handler(&self, chat_id: i64, text: String) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let sink = TelegramReplySink::new(Arc::clone(&self.client), chat_id);

        tokio::spawn(async move {
            if let Err(e) = dispatcher.handle(&text, &sink).await {
                warn!(chat_id, error = %e, "failed to deliver reply");
            }
        });
    }
}
