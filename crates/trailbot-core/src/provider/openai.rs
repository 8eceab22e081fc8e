//! OpenAI-compatible completion provider.
//!
//! Talks to any endpoint exposing `/chat/completions` and is the only
//! backend that supports function calling. The reply is classified into a
//! [`Reply`] here: a tool call (or a legacy `function_call`) becomes
//! [`Reply::Invoke`], anything else is a direct answer.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::{ChatMessage, Invocation, Reply, ToolDefinition};
use super::LlmProvider;
use crate::error::{Result, TrailbotError};
use crate::http::{send_for_body_with, truncate};

const SERVICE: &str = "completion provider";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible provider.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl OpenAiProvider {
    /// Create a new provider.
    ///
    /// # Arguments
    /// * `api_key` - API key for authentication
    /// * `api_base` - Custom base URL (defaults to the OpenAI API)
    /// * `default_model` - Default model to use
    /// * `client` - Shared HTTP client (carries the request timeout)
    pub fn new(api_key: &str, api_base: Option<&str>, default_model: &str, client: Client) -> Self {
        let base_url = api_base
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        debug!(base_url = %base_url, "Initialized OpenAI provider");

        Self {
            client,
            api_key: api_key.to_string(),
            base_url,
            default_model: default_model.to_string(),
        }
    }
}

// ── OpenAI API request/response types ───────────────────────────────

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageResponse,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct MessageResponse {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallResponse>>,
    #[serde(default)]
    function_call: Option<FunctionCallResponse>,
}

#[derive(Deserialize)]
struct ToolCallResponse {
    #[serde(default)]
    function: FunctionCallResponse,
}

/// Call as the model sent it. Missing keys stay empty so the orchestrator
/// sees them as a shape mismatch instead of a failed response.
#[derive(Deserialize, Default)]
struct FunctionCallResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl MessageResponse {
    /// Classify the message as a direct answer or a capability invocation.
    fn into_reply(self) -> Reply {
        let mut calls = self
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| tc.function)
            .chain(self.function_call);

        match calls.next() {
            Some(call) => {
                let dropped = calls.count();
                if dropped > 0 {
                    warn!(
                        tool = %call.name,
                        dropped,
                        "Model requested several calls, only the first is run"
                    );
                }
                Reply::Invoke {
                    call: Invocation::new(call.name, call.arguments),
                    content: self.content,
                }
            }
            None => Reply::Answer(self.content.unwrap_or_default()),
        }
    }
}

// ── LlmProvider implementation ──────────────────────────────────────

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        model: Option<&str>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Reply> {
        let model = model.unwrap_or(&self.default_model);
        let url = format!("{}/chat/completions", self.base_url);

        let tools_opt = if tools.is_empty() { None } else { Some(tools) };

        let request_body = CompletionRequest {
            model,
            messages,
            max_tokens,
            temperature,
            tools: tools_opt,
            tool_choice: tools_opt.map(|_| "auto"),
        };

        debug!(model, url = %url, msg_count = messages.len(), "Sending chat completion request");

        let request = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body);

        let body = send_for_body_with(SERVICE, request, |body| {
            serde_json::from_str::<ErrorBody>(body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| truncate(body).to_string())
        })
        .await?;

        let completion: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| TrailbotError::upstream(SERVICE, format!("malformed response: {e}")))?;

        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| TrailbotError::upstream(SERVICE, "response contained no choices"))?;

        debug!(
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            "Received completion"
        );

        Ok(choice.message.into_reply())
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}
