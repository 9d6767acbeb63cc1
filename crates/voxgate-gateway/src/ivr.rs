//! The IVR call state machine.
//!
//! ```text
//! Ringing -> Greeting -> Gathering -> Processing -> Speaking   -> Gathering ...
//!                                               \-> Escalating -> Gathering | (operator)
//!                                               \-> Terminated
//! ```
//!
//! Every step returns markup. Branches that could strand the caller (no
//! speech recognized, language model failure, unanswered transfer) each have
//! a spoken fallback.

use crate::script::CallScript;
use crate::twiml::{Dial, Gather, VoiceResponse};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use voxgate_agent::{AgentReply, Assistant};
use voxgate_core::{SessionId, Turn, VoxgateResult};
use voxgate_session::{CallSession, SessionStore};
use voxgate_speech::{AudioArtifact, AudioStore, Synthesizer};

/// Webhook path that opens a speech-recognition window.
pub const GATHER_PATH: &str = "/gather";
/// Webhook path that receives recognized speech.
pub const PROCESS_SPEECH_PATH: &str = "/process_speech";
/// Webhook path that receives the operator transfer outcome.
pub const TRANSFER_RESULT_PATH: &str = "/handle_transfer_result";
/// Route prefix for audio playback.
pub const STREAM_AUDIO_PATH: &str = "/stream_audio";

/// `DialCallStatus` value meaning the operator picked up.
const DIAL_COMPLETED: &str = "completed";

/// Where a call is in its lifecycle. Used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Greeting,
    /// Waiting for the caller to speak.
    Gathering,
    Processing,
    Speaking,
    /// Transfer to the operator in progress.
    Escalating,
    /// No further webhooks expected from the assistant side.
    Terminated,
}

/// Drives one inbound call per session through greet, listen, answer and
/// escalate steps.
pub struct IvrController {
    sessions: Arc<dyn SessionStore>,
    assistant: Arc<Assistant>,
    synthesizer: Arc<Synthesizer>,
    script: CallScript,
}

impl IvrController {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        assistant: Arc<Assistant>,
        synthesizer: Arc<Synthesizer>,
        script: CallScript,
    ) -> Self {
        Self {
            sessions,
            assistant,
            synthesizer,
            script,
        }
    }

    pub fn script(&self) -> &CallScript {
        &self.script
    }

    fn audio(&self) -> &Arc<dyn AudioStore> {
        self.synthesizer.store()
    }

    /// Call start: create the session and greet the caller.
    ///
    /// `base_url` is the externally reachable origin used to build the
    /// playback URL.
    pub async fn start_call(
        &self,
        call_sid: Option<&str>,
        base_url: &str,
    ) -> VoxgateResult<(SessionId, VoiceResponse)> {
        let mut session = CallSession::seeded(&self.script.system_prompt, &self.script.greeting);
        if let Some(sid) = call_sid {
            session = session.with_call_sid(sid);
        }
        let session_id = session.id;
        self.sessions.put(&session).await?;

        info!(
            session_id = %session_id,
            call_sid = call_sid.unwrap_or("-"),
            state = ?CallState::Greeting,
            "Call started"
        );

        let response = self
            .speak(&self.script.greeting, session_id, base_url)
            .await
            .redirect(GATHER_PATH);
        Ok((session_id, response))
    }

    /// Open a speech-recognition window routed to the speech callback.
    pub fn gather(&self) -> VoiceResponse {
        VoiceResponse::new().gather(Gather {
            action: PROCESS_SPEECH_PATH.to_string(),
            language: self.script.language.clone(),
            speech_timeout: "auto".to_string(),
        })
    }

    /// Handle one recognized caller utterance.
    ///
    /// The session is looked up by `session_id`, then by the provider
    /// `call_sid`. Returns the session id the turn was recorded under; it
    /// differs from the input when the session could not be found and a
    /// fresh one was started. A re-prompt never creates a session, so the
    /// id is `None` when there was no speech and no live session.
    pub async fn process_speech(
        &self,
        session_id: Option<SessionId>,
        call_sid: Option<&str>,
        speech: Option<&str>,
        base_url: &str,
    ) -> VoxgateResult<(Option<SessionId>, VoiceResponse)> {
        let speech = speech.map(str::trim).filter(|s| !s.is_empty());
        let existing = self.find_session(session_id, call_sid).await?;

        let Some(text) = speech else {
            info!(
                session_id = ?existing.as_ref().map(|s| s.id),
                state = ?CallState::Gathering,
                "No speech recognized, re-prompting"
            );
            let response = VoiceResponse::new()
                .say(&self.script.reprompt)
                .redirect(GATHER_PATH);
            return Ok((existing.map(|s| s.id), response));
        };

        let mut session = match existing {
            Some(session) => session,
            None => self.seed_session(session_id, call_sid).await?,
        };
        let session_id = session.id;

        info!(
            session_id = %session_id,
            state = ?CallState::Processing,
            chars = text.len(),
            "Caller said something"
        );

        // The user turn is only persisted together with a reply, so an
        // escalated turn leaves the transcript unchanged.
        let mut transcript = session.transcript.clone();
        transcript.push(Turn::user(text));

        match self.assistant.reply(&transcript).await {
            AgentReply::Escalate => {
                let response = self.escalate(&mut session).await?;
                Ok((Some(session_id), response))
            }
            AgentReply::Reply(reply) => {
                session.add_user_turn(text);
                session.add_assistant_turn(&reply);
                self.sessions.put(&session).await?;

                info!(session_id = %session_id, state = ?CallState::Speaking, "Replying to caller");
                let response = self
                    .speak(&reply, session_id, base_url)
                    .await
                    .redirect(GATHER_PATH);
                Ok((Some(session_id), response))
            }
        }
    }

    async fn escalate(&self, session: &mut CallSession) -> VoxgateResult<VoiceResponse> {
        let attempts = session.record_escalation();
        let session_id = session.id;

        if attempts >= self.script.max_escalations {
            warn!(
                session_id = %session_id,
                attempts,
                state = ?CallState::Terminated,
                "Escalation limit reached, ending call"
            );
            self.end_call(session_id).await;
            return Ok(VoiceResponse::new().say(&self.script.manager_unavailable));
        }

        self.sessions.put(session).await?;
        info!(
            session_id = %session_id,
            attempts,
            state = ?CallState::Escalating,
            "Transferring caller to operator"
        );
        Ok(VoiceResponse::new()
            .say(&self.script.transfer_notice)
            .dial(Dial {
                number: self.script.operator_number.clone(),
                action: TRANSFER_RESULT_PATH.to_string(),
                timeout_secs: self.script.transfer_timeout_secs,
            }))
    }

    /// Handle the outcome of an operator transfer.
    ///
    /// Anything but `completed` returns the caller to the assistant. A
    /// completed transfer belongs to the operator leg and gets an empty
    /// response.
    pub fn transfer_result(
        &self,
        session_id: Option<SessionId>,
        dial_status: Option<&str>,
    ) -> VoiceResponse {
        let status = dial_status.unwrap_or("");
        if status == DIAL_COMPLETED {
            info!(session_id = ?session_id, state = ?CallState::Terminated, "Operator took the call");
            VoiceResponse::new()
        } else {
            info!(
                session_id = ?session_id,
                dial_status = status,
                state = ?CallState::Gathering,
                "Transfer did not complete, resuming assistant"
            );
            VoiceResponse::new()
                .say(&self.script.transfer_failed)
                .redirect(GATHER_PATH)
        }
    }

    /// Hand the session's current audio to the provider and drop it.
    pub async fn fetch_audio(&self, session_id: SessionId) -> VoxgateResult<Option<AudioArtifact>> {
        self.audio().take(session_id).await
    }

    /// Markup for a failed webhook: apologize and end the call.
    ///
    /// The session and its audio are removed on a best-effort basis.
    pub async fn fail(&self, session_id: Option<SessionId>) -> VoiceResponse {
        if let Some(id) = session_id {
            warn!(
                session_id = %id,
                state = ?CallState::Terminated,
                "Ending call after handler failure"
            );
            self.end_call(id).await;
        }
        VoiceResponse::new().say(&self.script.apology)
    }

    /// Drop sessions idle longer than `ttl` together with their audio.
    pub async fn expire_idle(&self, ttl: Duration) -> VoxgateResult<usize> {
        let expired = self.sessions.purge_expired(ttl).await?;
        for id in &expired {
            self.discard_audio(*id).await;
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "Expired idle call sessions");
        }
        Ok(expired.len())
    }

    /// Resolve the session for a provider call identifier.
    pub async fn session_for_call(&self, call_sid: &str) -> Option<SessionId> {
        match self.sessions.find_by_call_sid(call_sid).await {
            Ok(found) => found,
            Err(e) => {
                warn!(call_sid, error = %e, "Call lookup failed");
                None
            }
        }
    }

    /// Cookie id first, then the call id alias.
    async fn find_session(
        &self,
        session_id: Option<SessionId>,
        call_sid: Option<&str>,
    ) -> VoxgateResult<Option<CallSession>> {
        if let Some(id) = session_id {
            if let Some(session) = self.sessions.get(id).await? {
                return Ok(Some(session));
            }
        }
        if let Some(sid) = call_sid {
            if let Some(id) = self.sessions.find_by_call_sid(sid).await? {
                return self.sessions.get(id).await;
            }
        }
        Ok(None)
    }

    async fn seed_session(
        &self,
        requested: Option<SessionId>,
        call_sid: Option<&str>,
    ) -> VoxgateResult<CallSession> {
        let mut session = CallSession::seeded(&self.script.system_prompt, &self.script.greeting);
        if let Some(sid) = call_sid {
            session = session.with_call_sid(sid);
        }
        warn!(
            requested = ?requested,
            call_sid = call_sid.unwrap_or("-"),
            session_id = %session.id,
            "Call session missing, starting from a fresh transcript"
        );
        self.sessions.put(&session).await?;
        Ok(session)
    }

    /// Synthesize `text` and play it, or let the provider say it.
    async fn speak(&self, text: &str, session_id: SessionId, base_url: &str) -> VoiceResponse {
        match self.synthesizer.speak(text, session_id).await {
            Some(locator) => VoiceResponse::new().play(format!(
                "{}{STREAM_AUDIO_PATH}/{}",
                base_url.trim_end_matches('/'),
                locator.session_id
            )),
            None => VoiceResponse::new().say(text),
        }
    }

    async fn end_call(&self, session_id: SessionId) {
        self.discard_audio(session_id).await;
        if let Err(e) = self.sessions.delete(session_id).await {
            warn!(session_id = %session_id, error = %e, "Failed to remove ended call session");
        }
    }

    /// Advisory cleanup: failures are logged, never surfaced.
    async fn discard_audio(&self, session_id: SessionId) {
        if let Err(e) = self.audio().delete(session_id).await {
            warn!(session_id = %session_id, error = %e, "Failed to clean up audio artifact");
        }
    }
}
