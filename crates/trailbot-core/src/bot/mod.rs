//! Bot entry point: the adapter a message-handling host calls.
//!
//! The host passes the whole history and whatever state it got back last
//! time; the bot returns plain text plus the updated state. Errors never
//! reach the host, they are logged and rendered as an apology.

use tracing::{error, info};

use crate::agent::Orchestrator;
use crate::config::Config;
use crate::conversation::{ConversationState, History};
use crate::error::{Result, TrailbotError};

/// Default persona for the completion model.
pub const SYSTEM_PROMPT: &str = "\
You are an AI bike trail expert. You need to help users plan their bike trail journeys.
The user will ask you about the available bike trails in an area.
If the user asks anything not related to bike trails, you must tell the user to ask anything relevant to bike trails.
If you do not know the answer to the user's question, politely say that you don't know and ask the user if they would want help with any other bike trail information.

In the beginning, introduce yourself by telling that you can help find the best bike trails in the world and urge the user to ask anything about bike trails.
";

pub struct Bot {
    orchestrator: Orchestrator,
    system_prompt: String,
}

impl Bot {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Build a bot from configuration, honoring `agent.systemPrompt`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let bot = Self::new(Orchestrator::from_config(config)?);
        Ok(match &config.agent.system_prompt {
            Some(prompt) if !prompt.trim().is_empty() => bot.with_system_prompt(prompt.as_str()),
            _ => bot,
        })
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Handle one exchange.
    pub async fn on_message(
        &self,
        history: &History,
        state: Option<ConversationState>,
    ) -> (String, ConversationState) {
        let state = ConversationState::advance(state);
        info!(counter = state.counter, turns = history.len(), "Handling message");

        let text = match self.orchestrator.answer(&self.system_prompt, history).await {
            Ok(text) => text,
            Err(e) => {
                error!(error = %e, "Failed to answer");
                apology(&e)
            }
        };

        (text, state)
    }
}

/// User-facing text for a failed exchange.
fn apology(err: &TrailbotError) -> String {
    match err {
        TrailbotError::NotFound { location } => format!(
            "Sorry, I couldn't find a place called \"{}\". Could you give me a more specific location?",
            location
        ),
        TrailbotError::NoTrails => {
            "Sorry, I couldn't find any bike trails near that location. Want to try somewhere nearby?".into()
        }
        _ => "Sorry, I ran into a problem while looking that up. Please try again in a moment.".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::OrchestratorConfig;
    use crate::conversation::Turn;
    use crate::geocode::Coordinates;
    use crate::provider::types::{Invocation, Reply};
    use crate::testing::{barton_creek, CountingCatalog, CountingGeocoder, ScriptedProvider};
    use crate::tools::trail_finder::{TrailFinderTool, TOOL_NAME};
    use crate::tools::ToolRegistry;
    use std::sync::Arc;

    fn bot(reply: Reply, geocoder: CountingGeocoder, catalog: CountingCatalog) -> Bot {
        let mut tools = ToolRegistry::new();
        tools.register(Box::new(TrailFinderTool::new(Arc::new(geocoder), Arc::new(catalog), 1)));
        Bot::new(Orchestrator::new(
            Box::new(ScriptedProvider::new(reply)),
            tools,
            OrchestratorConfig::default(),
        ))
    }

    fn trail_request() -> Reply {
        Reply::Invoke {
            call: Invocation::new(TOOL_NAME, r#"{"location": "Austin, Texas"}"#),
            content: None,
        }
    }

    #[tokio::test]
    async fn test_state_counter_progression() {
        let bot = bot(
            Reply::answer("Hi, I can help you find the best bike trails in the world!"),
            CountingGeocoder::empty(),
            CountingCatalog::default(),
        );
        let mut history = History::from(vec![Turn::user("Hello")]);

        let (reply, state) = bot.on_message(&history, None).await;
        assert_eq!(state, ConversationState { counter: 0 });
        assert!(reply.contains("bike trails"));

        history.push(Turn::assistant(reply));
        history.push(Turn::user("Thanks"));
        let (_, state) = bot.on_message(&history, Some(state)).await;
        assert_eq!(state, ConversationState { counter: 1 });
    }

    #[tokio::test]
    async fn test_trail_answer_reaches_host() {
        let bot = bot(
            trail_request(),
            CountingGeocoder::returning(Coordinates::new("30.27", "-97.74")),
            CountingCatalog::returning(vec![barton_creek()]),
        );
        let history = History::from(vec![Turn::user("Find trails near Austin, Texas")]);

        let (reply, _) = bot.on_message(&history, None).await;
        assert_eq!(reply, barton_creek().summary());
    }

    #[tokio::test]
    async fn test_unknown_place_becomes_apology() {
        let bot = bot(trail_request(), CountingGeocoder::empty(), CountingCatalog::default());
        let history = History::from(vec![Turn::user("Find trails near Austin, Texas")]);

        let (reply, state) = bot.on_message(&history, Some(ConversationState { counter: 4 })).await;
        assert_eq!(
            reply,
            "Sorry, I couldn't find a place called \"Austin, Texas\". Could you give me a more specific location?"
        );
        assert_eq!(state.counter, 5);
    }

    #[tokio::test]
    async fn test_no_trails_becomes_apology() {
        let bot = bot(
            trail_request(),
            CountingGeocoder::returning(Coordinates::new("30.27", "-97.74")),
            CountingCatalog::returning(Vec::new()),
        );
        let history = History::from(vec![Turn::user("Find trails near Austin, Texas")]);

        let (reply, _) = bot.on_message(&history, None).await;
        assert!(reply.starts_with("Sorry, I couldn't find any bike trails"));
    }

    #[tokio::test]
    async fn test_geocoder_outage_becomes_generic_apology() {
        let bot = bot(
            trail_request(),
            CountingGeocoder::unavailable(),
            CountingCatalog::returning(vec![barton_creek()]),
        );
        let history = History::from(vec![Turn::user("Find trails near Austin, Texas")]);

        let (reply, state) = bot.on_message(&history, None).await;
        assert_eq!(reply, "Sorry, I ran into a problem while looking that up. Please try again in a moment.");
        assert!(!reply.contains("503"));
        assert_eq!(state.counter, 0);
    }

    #[tokio::test]
    async fn test_malformed_trail_becomes_generic_apology() {
        let bot = bot(
            trail_request(),
            CountingGeocoder::returning(Coordinates::new("30.27", "-97.74")),
            CountingCatalog::malformed_at(0),
        );
        let history = History::from(vec![Turn::user("Find trails near Austin, Texas")]);

        let (reply, _) = bot.on_message(&history, None).await;
        assert_eq!(reply, "Sorry, I ran into a problem while looking that up. Please try again in a moment.");
    }

    #[test]
    fn test_service_failure_apology_is_generic() {
        let text = apology(&TrailbotError::Parse {
            index: 0,
            message: "missing field `url`".into(),
        });
        assert!(text.contains("problem"));
        assert!(!text.contains("url"));
    }

    #[test]
    fn test_from_config_uses_prompt_override() {
        let config: Config = serde_json::from_str(
            r#"{"providers": {"openai": {"apiKey": "sk-x"}}, "agent": {"systemPrompt": "Only talk about gravel."}}"#,
        )
        .unwrap();
        let bot = Bot::from_config(&config).unwrap();
        assert_eq!(bot.system_prompt, "Only talk about gravel.");
        assert_eq!(bot.orchestrator().provider_name(), "openai");
    }
}
