//! Hugging Face inference API provider.
//!
//! Drives a hosted conversational model (DialoGPT and friends). These models
//! have no notion of a system prompt or of function calling, so the system
//! prompt is replayed as the first user turn and the reply is always a
//! direct answer.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{ChatMessage, Reply, ToolDefinition};
use super::LlmProvider;
use crate::error::{Result, TrailbotError};
use crate::http::{send_for_body_with, truncate};

const SERVICE: &str = "huggingface";

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

pub struct HuggingFaceProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl HuggingFaceProvider {
    pub fn new(api_key: &str, api_base: Option<&str>, default_model: &str, client: Client) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: api_base
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            default_model: default_model.to_string(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
struct ConversationInputs {
    past_user_inputs: Vec<String>,
    generated_responses: Vec<String>,
    text: String,
}

#[derive(Serialize)]
struct InferenceRequest {
    inputs: ConversationInputs,
    max_length: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_length: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Generated {
        generated_text: String,
    },
    Failed {
        error: String,
        #[serde(default)]
        estimated_time: Option<f64>,
    },
}

/// Error text for a non-2xx body. A loading model answers 503 with JSON.
fn describe_failure(body: &str) -> String {
    match serde_json::from_str::<InferenceResponse>(body) {
        Ok(InferenceResponse::Failed {
            error,
            estimated_time: Some(secs),
        }) => format!("{} (model loading, retry in ~{:.0}s)", error, secs),
        Ok(InferenceResponse::Failed { error, .. }) => error,
        _ => truncate(body).to_string(),
    }
}

/// Fold the transcript into the past-inputs / past-responses shape the
/// conversational pipeline expects. The newest user input becomes `text`.
fn build_inputs(messages: &[ChatMessage]) -> ConversationInputs {
    let system_prompt = messages
        .iter()
        .find(|m| m.role == "system")
        .and_then(|m| m.content.clone())
        .unwrap_or_default();

    let mut past_user_inputs = vec![system_prompt.clone()];
    let mut generated_responses = vec![format!(
        "ok I will answer according to the context, where context is '{}'",
        system_prompt
    )];

    for message in messages.iter().filter(|m| m.role != "system") {
        let content = message.content.clone().unwrap_or_default();
        if message.role == "user" {
            past_user_inputs.push(content);
        } else {
            generated_responses.push(content);
        }
    }

    let text = past_user_inputs.pop().unwrap_or_default();

    ConversationInputs {
        past_user_inputs,
        generated_responses,
        text,
    }
}

#[async_trait]
impl LlmProvider for HuggingFaceProvider {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        _tools: &[ToolDefinition],
        model: Option<&str>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Reply> {
        let model = model.unwrap_or(&self.default_model);
        let url = format!("{}/models/{}", self.base_url, model);

        let request = InferenceRequest {
            inputs: build_inputs(messages),
            max_length: max_tokens,
            temperature,
            min_length: None,
            top_k: None,
        };

        debug!(model, url = %url, "Sending inference request");

        let request = self.client.post(&url).bearer_auth(&self.api_key).json(&request);
        let body = send_for_body_with(SERVICE, request, describe_failure).await?;

        match serde_json::from_str::<InferenceResponse>(&body) {
            Ok(InferenceResponse::Generated { generated_text }) => Ok(Reply::Answer(generated_text)),
            Ok(InferenceResponse::Failed { error, .. }) => Err(TrailbotError::upstream(SERVICE, error)),
            Err(e) => Err(TrailbotError::upstream(SERVICE, format!("malformed response: {e}"))),
        }
    }

    fn name(&self) -> &str {
        "huggingface"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}
