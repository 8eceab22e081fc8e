//! Conversation history and per-exchange state.
//!
//! A [`History`] is the ordered, append-only list of [`Turn`]s a host hands
//! to the bot on every exchange. [`ConversationState`] is the small counter
//! bag the host carries between exchanges.

use serde::{Deserialize, Serialize};

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Function => "function",
        }
    }
}

/// A function call recorded on a turn: the capability name plus its
/// arguments as JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCallPayload {
    pub name: String,
    pub arguments: String,
}

/// A single message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    /// Capability that produced a function turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCallPayload>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            function_call: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// A function result turn. `name` is the capability that produced it.
    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(Role::Function, content)
        }
    }
}

/// Ordered, append-only sequence of turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<Vec<Turn>> for History {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}

impl FromIterator<Turn> for History {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}

/// Bookkeeping the host carries between exchanges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub counter: u64,
}

impl ConversationState {
    /// Start a fresh state, or advance the one supplied by the host.
    pub fn advance(state: Option<Self>) -> Self {
        match state {
            None => Self::default(),
            Some(s) => Self {
                counter: s.counter.saturating_add(1),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_keeps_order() {
        let mut history = History::new();
        history.push(Turn::user("Hi"));
        history.push(Turn::assistant("Hello!"));
        history.push(Turn::user("Trails near Boise?"));

        assert_eq!(history.len(), 3);
        assert_eq!(history.turns()[0].role, Role::User);
        assert_eq!(history.last().unwrap().content, "Trails near Boise?");
    }

    #[test]
    fn test_role_wire_names() {
        let turn: Turn = serde_json::from_str(r#"{"role":"assistant","content":"ok"}"#).unwrap();
        assert_eq!(turn.role, Role::Assistant);
        assert!(turn.function_call.is_none());
        assert_eq!(Role::Function.as_str(), "function");
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = serde_json::from_str::<Turn>(r#"{"role":"narrator","content":"..."}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_history_is_a_json_array() {
        let history: History =
            serde_json::from_str(r#"[{"role":"user","content":"What is a bike trail?"}]"#).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_state_advance() {
        let first = ConversationState::advance(None);
        assert_eq!(first.counter, 0);
        let second = ConversationState::advance(Some(first));
        assert_eq!(second.counter, 1);
    }

    #[test]
    fn test_state_advance_saturates_at_max() {
        let state: ConversationState =
            serde_json::from_str(&format!(r#"{{"counter":{}}}"#, u64::MAX)).unwrap();
        assert_eq!(ConversationState::advance(Some(state)).counter, u64::MAX);
    }

    #[test]
    fn test_function_turn_records_capability_name() {
        let turn = Turn::function("get_lat_long", "30.27,-97.74");
        assert_eq!(turn.role, Role::Function);
        assert_eq!(turn.name.as_deref(), Some("get_lat_long"));
        assert!(turn.function_call.is_none());

        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["name"], "get_lat_long");
        assert!(json.get("function_call").is_none());
    }
}
