use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of the participant that authored a [`Turn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The fixed instruction prompt that seeds every call.
    System,
    /// The automated assistant speaking to the caller.
    Assistant,
    /// The caller, as recognized by the telephony provider.
    User,
}

impl Role {
    /// Wire name used by chat-completion APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Assistant => "assistant",
            Role::User => "user",
        }
    }
}

/// A single entry of a call transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// The role of the turn author.
    pub role: Role,
    /// What was said.
    pub content: String,
    /// UTC timestamp of when the turn was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Creates a turn with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a [`Role::System`] turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a [`Role::Assistant`] turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a [`Role::User`] turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}
