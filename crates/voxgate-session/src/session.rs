use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use voxgate_core::{Role, SessionId, Turn};

/// Server-side state of one phone call.
///
/// The transcript is append-only and always starts with the system prompt
/// followed by the canned greeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSession {
    pub id: SessionId,
    /// Provider call identifier (e.g. Twilio `CallSid`), when known.
    pub call_sid: Option<String>,
    pub transcript: Vec<Turn>,
    /// How many times the language model asked to hand the call to a human.
    pub escalation_attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CallSession {
    /// Start a new call: fresh id, transcript seeded with the system prompt
    /// and the greeting line.
    pub fn seeded(system_prompt: &str, greeting: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            call_sid: None,
            transcript: vec![Turn::system(system_prompt), Turn::assistant(greeting)],
            escalation_attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_call_sid(mut self, call_sid: impl Into<String>) -> Self {
        self.call_sid = Some(call_sid.into());
        self
    }

    pub fn add_turn(&mut self, turn: Turn) {
        self.updated_at = Utc::now();
        self.transcript.push(turn);
    }

    pub fn add_user_turn(&mut self, content: impl Into<String>) {
        self.add_turn(Turn::user(content));
    }

    pub fn add_assistant_turn(&mut self, content: impl Into<String>) {
        self.add_turn(Turn::assistant(content));
    }

    /// Count one more escalation request and return the new total.
    pub fn record_escalation(&mut self) -> u32 {
        self.updated_at = Utc::now();
        self.escalation_attempts = self.escalation_attempts.saturating_add(1);
        self.escalation_attempts
    }

    pub fn turn_count(&self) -> usize {
        self.transcript.len()
    }

    /// Number of caller turns recorded so far.
    pub fn user_turns(&self) -> usize {
        self.transcript
            .iter()
            .filter(|t| t.role == Role::User)
            .count()
    }

    /// Whether the session has been idle for longer than `ttl`.
    pub fn is_idle(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.updated_at) > ttl
    }
}
