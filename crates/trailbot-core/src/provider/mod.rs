//! Completion provider trait and backends.
//!
//! Defines the `LlmProvider` trait every backend implements. Only the
//! `openai` backend supports function calling; `huggingface` and `botlibre`
//! always answer with plain text. One backend is chosen per process by
//! [`build_provider`].

pub mod botlibre;
pub mod huggingface;
pub mod openai;
pub mod types;

use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::config::{ActiveProvider, Config};
use crate::error::{Result, TrailbotError};
use types::{ChatMessage, Reply, ToolDefinition};

/// Trait for completion providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request.
    ///
    /// # Arguments
    /// * `messages` - System prompt followed by the conversation
    /// * `tools` - Capabilities the model may invoke (ignored by backends
    ///   without function calling)
    /// * `model` - Model identifier override (None = use default)
    /// * `max_tokens` - Maximum response tokens
    /// * `temperature` - Sampling temperature
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
        model: Option<&str>,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<Reply>;

    /// Short backend name, used in logs.
    fn name(&self) -> &str;

    /// Get the default model identifier.
    fn default_model(&self) -> &str;
}

/// Construct the provider selected by `config`.
pub fn build_provider(config: &Config, client: Client) -> Result<Box<dyn LlmProvider>> {
    let active = config
        .providers
        .find_active(config.agent.provider.as_deref())
        .ok_or_else(|| TrailbotError::Config("no completion provider is configured".into()))?;

    let model = |entry_model: &Option<String>| {
        entry_model
            .clone()
            .unwrap_or_else(|| config.agent.model.clone())
    };

    info!(provider = active.name(), "Selected completion provider");

    let provider: Box<dyn LlmProvider> = match active {
        ActiveProvider::OpenAi(entry) => Box::new(openai::OpenAiProvider::new(
            &entry.api_key,
            entry.api_base.as_deref(),
            &model(&entry.model),
            client,
        )),
        ActiveProvider::HuggingFace(entry) => Box::new(huggingface::HuggingFaceProvider::new(
            &entry.api_key,
            entry.api_base.as_deref(),
            &model(&entry.model),
            client,
        )),
        ActiveProvider::BotLibre(entry) => Box::new(botlibre::BotLibreProvider::new(
            &entry.application,
            &entry.instance,
            entry.api_base.as_deref(),
            client,
        )),
    };

    Ok(provider)
}
