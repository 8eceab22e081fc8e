//! Types shared by every completion provider.
//!
//! Providers take a list of [`ChatMessage`]s and answer with a [`Reply`]:
//! either finished text or a request to run one declared capability.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversation::{Role, Turn};
use crate::error::{Result, TrailbotError};

/// A single message in OpenAI chat format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".into(),
            content: Some(content.into()),
            name: None,
            function_call: None,
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".into(),
            content: Some(content.into()),
            name: None,
            function_call: None,
        }
    }

    /// Build the full request transcript: system prompt first, then history.
    pub fn transcript(system_prompt: &str, turns: &[Turn]) -> Vec<Self> {
        std::iter::once(Self::system(system_prompt))
            .chain(turns.iter().map(Self::from))
            .collect()
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        let call = turn.function_call.as_ref();
        match turn.role {
            Role::Function => Self {
                role: Role::Function.as_str().into(),
                content: Some(turn.content.clone()),
                name: turn.name.clone(),
                function_call: None,
            },
            Role::Assistant if call.is_some() => Self {
                role: Role::Assistant.as_str().into(),
                content: None,
                name: None,
                function_call: call.map(|c| FunctionCall {
                    name: c.name.clone(),
                    arguments: c.arguments.clone(),
                }),
            },
            role => Self {
                role: role.as_str().into(),
                content: Some(turn.content.clone()),
                name: None,
                function_call: None,
            },
        }
    }
}

/// Function name + raw JSON arguments, as the provider sends them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// A capability invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub name: String,
    /// Arguments exactly as the model produced them (JSON text).
    pub arguments: String,
}

impl Invocation {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Decode the arguments into a typed payload.
    pub fn parse_arguments<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.arguments).map_err(|e| {
            TrailbotError::CapabilityShapeMismatch(format!(
                "bad arguments for `{}`: {}",
                self.name, e
            ))
        })
    }
}

/// What the provider decided to do with the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Finished assistant text.
    Answer(String),
    /// The model wants a capability run. `content` is whatever text came
    /// alongside the call (usually none).
    Invoke {
        call: Invocation,
        content: Option<String>,
    },
}

impl Reply {
    pub fn answer(text: impl Into<String>) -> Self {
        Self::Answer(text.into())
    }
}

/// Tool definition in OpenAI function-calling format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub def_type: String,
    pub function: ToolFunctionDef,
}

/// Function metadata within a tool definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}
