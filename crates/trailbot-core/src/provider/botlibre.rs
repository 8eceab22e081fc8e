//! BotLibre scripted-bot provider.
//!
//! BotLibre bots keep their own context server-side, so only the latest
//! turn is forwarded. Replies are always direct answers.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{ChatMessage, Reply, ToolDefinition};
use super::LlmProvider;
use crate::error::{Result, TrailbotError};
use crate::http::send_for_body;

const SERVICE: &str = "botlibre";

const DEFAULT_BASE_URL: &str = "https://www.botlibre.com";

pub struct BotLibreProvider {
    client: Client,
    application: String,
    instance: String,
    base_url: String,
}

impl BotLibreProvider {
    pub fn new(application: &str, instance: &str, api_base: Option<&str>, client: Client) -> Self {
        Self {
            client,
            application: application.to_string(),
            instance: instance.to_string(),
            base_url: api_base
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    application: &'a str,
    instance: &'a str,
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: String,
}

#[async_trait]
impl LlmProvider for BotLibreProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolDefinition],
        _model: Option<&str>,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<Reply> {
        let message = messages
            .iter()
            .rev()
            .find(|m| m.role != "system")
            .and_then(|m| m.content.as_deref())
            .unwrap_or_default();

        let url = format!("{}/rest/json/chat", self.base_url);
        debug!(url = %url, instance = %self.instance, "Sending BotLibre chat request");

        let request = self.client.post(&url).json(&ChatRequest {
            application: &self.application,
            instance: &self.instance,
            message,
        });
        let body = send_for_body(SERVICE, request).await?;

        let response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| TrailbotError::upstream(SERVICE, format!("malformed response: {e}")))?;

        Ok(Reply::Answer(response.message))
    }

    fn name(&self) -> &str {
        "botlibre"
    }

    fn default_model(&self) -> &str {
        &self.instance
    }
}
