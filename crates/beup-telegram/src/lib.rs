//! Telegram Bot API adapter.
//!
//! Implements the `beup-core` Notifier port directly over the HTTP API
//! (`sendMessage` / `sendDocument`) with reqwest. Only the two methods the
//! pipeline needs are wired up; there is no polling side.

use std::{path::Path, time::Duration};

use async_trait::async_trait;
use tracing::{info, warn};

use beup_core::{config::Config, errors::Error, notify::Notifier, Result};

#[derive(Clone, Debug)]
pub struct TelegramNotifier {
    base_url: String,
    token: String,
    chat_id: String,
    message_timeout: Duration,
    upload_timeout: Duration,
    http: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(cfg: &Config) -> Self {
        Self {
            base_url: cfg.api_base_url.clone(),
            token: cfg.bot_token.clone(),
            chat_id: cfg.chat_id.clone(),
            message_timeout: cfg.message_timeout,
            upload_timeout: cfg.upload_timeout,
            http: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}{}/{}", self.base_url, self.token, method)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str) -> Result<()> {
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        let resp = self
            .http
            .post(self.api_url("sendMessage"))
            .json(&payload)
            .timeout(self.message_timeout)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("sendMessage request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "sendMessage failed: {status} {}",
                truncate_text(&body, 200)
            )));
        }

        info!("telegram message sent: {text}");
        Ok(())
    }

    async fn send_document(&self, path: &Path, caption: &str) -> Result<bool> {
        if !path.exists() {
            warn!("file not found for upload: {}", path.display());
            return Ok(false);
        }

        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document.bin")
            .to_string();

        // Read the part into memory up front; the file handle is released
        // before the request starts, on every path.
        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) => {
                warn!("failed to read {}: {e}", path.display());
                return Ok(false);
            }
        };

        let form = reqwest::multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .part(
                "document",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name.clone()),
            );

        info!("uploading {file_name}...");
        let resp = match self
            .http
            .post(self.api_url("sendDocument"))
            .multipart(form)
            .timeout(self.upload_timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("error uploading {file_name}: {e}");
                return Ok(false);
            }
        };

        if !resp.status().is_success() {
            warn!("upload of {file_name} failed with status {}", resp.status());
            return Ok(false);
        }

        let body: serde_json::Value = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!("invalid sendDocument response for {file_name}: {e}");
                return Ok(false);
            }
        };

        // Telegram reports logical failures with a 2xx status and
        // `"ok": false`, so the flag is checked in addition to the status.
        if body.get("ok").and_then(|v| v.as_bool()).unwrap_or(false) {
            info!("successfully uploaded {file_name}");
            Ok(true)
        } else {
            let desc = body
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            warn!("failed to upload {file_name}: {desc}");
            Ok(false)
        }
    }
}

fn truncate_text(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut out = s.chars().take(max_len).collect::<String>();
    out.push_str("...");
    out
}
