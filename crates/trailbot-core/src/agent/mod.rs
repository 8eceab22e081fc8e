//! Completion orchestrator: the core of trailbot.
//!
//! One exchange is a single round:
//! 1. Send system prompt + history to the provider, advertising the
//!    registered capabilities
//! 2. A direct answer is returned as-is
//! 3. A capability invocation is executed and its result becomes the
//!    answer, without a second trip to the provider
//!
//! Invocations that do not match the expected shape fall back to the
//! reply's text. Failures while running a well-formed invocation are
//! returned to the caller.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::conversation::History;
use crate::error::{Result, TrailbotError};
use crate::geocode::MapsCoGeocoder;
use crate::http::build_http_client;
use crate::provider::types::{ChatMessage, Reply};
use crate::provider::{build_provider, LlmProvider};
use crate::tools::trail_finder::TrailFinderTool;
use crate::tools::ToolRegistry;
use crate::trails::TrailApiClient;

/// Generation settings for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Model override (None = the provider's default).
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: 3000,
            temperature: 0.7,
        }
    }
}

pub struct Orchestrator {
    provider: Box<dyn LlmProvider>,
    tools: ToolRegistry,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(provider: Box<dyn LlmProvider>, tools: ToolRegistry, config: OrchestratorConfig) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Wire the selected provider and the trail finder from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(config.agent.request_timeout())?;
        let provider = build_provider(config, client.clone())?;

        let geocoder = Arc::new(MapsCoGeocoder::new(&config.services.geocoder, client.clone()));
        let catalog = Arc::new(TrailApiClient::new(&config.services.trails, client));

        let mut tools = ToolRegistry::new();
        tools.register(Box::new(TrailFinderTool::new(
            geocoder,
            catalog,
            config.agent.max_trails_shown,
        )));

        let settings = OrchestratorConfig {
            model: None,
            max_tokens: config.agent.max_tokens,
            temperature: config.agent.temperature,
        };

        Ok(Self::new(provider, tools, settings))
    }

    /// Name of the provider in use.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Answer the latest turn of `history`.
    pub async fn answer(&self, system_prompt: &str, history: &History) -> Result<String> {
        let messages = ChatMessage::transcript(system_prompt, history.turns());
        let tool_defs = self.tools.definitions();

        debug!(
            provider = self.provider.name(),
            msg_count = messages.len(),
            tools = tool_defs.len(),
            "Calling completion provider"
        );

        let reply = self
            .provider
            .chat(
                &messages,
                &tool_defs,
                self.config.model.as_deref(),
                self.config.max_tokens,
                self.config.temperature,
            )
            .await?;

        match reply {
            Reply::Answer(text) => {
                info!(len = text.len(), "Direct answer");
                Ok(text)
            }
            Reply::Invoke { call, content } => {
                info!(tool = %call.name, "Model requested capability");
                match self.tools.execute(&call).await {
                    Ok(summary) => Ok(summary),
                    Err(TrailbotError::CapabilityShapeMismatch(reason)) => {
                        warn!(tool = %call.name, %reason, "Invocation not understood, using reply text");
                        Ok(content.unwrap_or_default())
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }
}
