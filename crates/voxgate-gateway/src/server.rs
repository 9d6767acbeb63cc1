use crate::ivr::{IvrController, GATHER_PATH, PROCESS_SPEECH_PATH, TRANSFER_RESULT_PATH};
use crate::webhook::{
    resolve_base_url, session_cookie, session_from_cookies, WebhookForm, WebhookParams,
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use voxgate_core::SessionId;

const BANNER: &str = "voxgate IVR gateway is running";
const AUDIO_NOT_FOUND: &str = "Audio file not found";

/// Deployment settings the router needs beyond the controller.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Externally reachable origin used in playback URLs.
    pub public_url: Option<String>,
    /// Lifetime of the session cookie.
    pub session_ttl: Duration,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            public_url: None,
            session_ttl: Duration::from_secs(30 * 60),
        }
    }
}

/// Shared application state.
pub struct AppState {
    pub controller: Arc<IvrController>,
    pub options: GatewayOptions,
}

impl AppState {
    fn base_url(&self, headers: &HeaderMap) -> String {
        resolve_base_url(self.options.public_url.as_deref(), headers)
    }

    /// Cookie first, then the provider call id alias.
    async fn resolve_session(
        &self,
        headers: &HeaderMap,
        params: &WebhookParams,
    ) -> Option<SessionId> {
        if let Some(id) = session_from_cookies(headers) {
            return Some(id);
        }
        match params.call_sid.as_deref() {
            Some(sid) => self.controller.session_for_call(sid).await,
            None => None,
        }
    }

    fn with_cookie(&self, session_id: SessionId, body: impl IntoResponse) -> Response {
        (
            [(
                header::SET_COOKIE,
                session_cookie(session_id, self.options.session_ttl),
            )],
            body,
        )
            .into_response()
    }
}

/// The IVR webhook server.
pub struct GatewayServer;

impl GatewayServer {
    /// Build the router with the full webhook set.
    pub fn build(controller: Arc<IvrController>, options: GatewayOptions) -> Router {
        let state = Arc::new(AppState {
            controller,
            options,
        });

        Router::new()
            .route("/", get(banner_handler))
            .route("/health", get(health_handler))
            .route("/voice", post(voice_handler))
            .route(GATHER_PATH, post(gather_handler))
            .route(PROCESS_SPEECH_PATH, post(process_speech_handler))
            .route(TRANSFER_RESULT_PATH, post(transfer_result_handler))
            .route("/stream_audio/{session_id}", get(stream_audio_handler))
            .with_state(state)
    }
}

/// Periodically drop idle call sessions and their audio.
pub fn spawn_session_sweeper(
    controller: Arc<IvrController>,
    ttl: Duration,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match controller.expire_idle(ttl).await {
                Ok(n) => debug!(expired = n, "Session sweep finished"),
                Err(e) => warn!(error = %e, "Session sweep failed"),
            }
        }
    })
}

async fn banner_handler() -> &'static str {
    BANNER
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "voxgate"}))
}

async fn voice_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    WebhookForm(params): WebhookForm<WebhookParams>,
) -> Response {
    let base_url = state.base_url(&headers);
    match state
        .controller
        .start_call(params.call_sid.as_deref(), &base_url)
        .await
    {
        Ok((session_id, markup)) => state.with_cookie(session_id, markup),
        Err(e) => {
            error!(error = %e, call_sid = ?params.call_sid, "Failed to start call");
            state.controller.fail(None).await.into_response()
        }
    }
}

async fn gather_handler(State(state): State<Arc<AppState>>) -> Response {
    state.controller.gather().into_response()
}

async fn process_speech_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    WebhookForm(params): WebhookForm<WebhookParams>,
) -> Response {
    let session_id = state.resolve_session(&headers, &params).await;
    let base_url = state.base_url(&headers);
    match state
        .controller
        .process_speech(
            session_id,
            params.call_sid.as_deref(),
            params.speech_result.as_deref(),
            &base_url,
        )
        .await
    {
        Ok((Some(resolved), markup)) => state.with_cookie(resolved, markup),
        Ok((None, markup)) => markup.into_response(),
        Err(e) => {
            error!(error = %e, session_id = ?session_id, "Failed to process speech");
            state.controller.fail(session_id).await.into_response()
        }
    }
}

async fn transfer_result_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    WebhookForm(params): WebhookForm<WebhookParams>,
) -> Response {
    let session_id = state.resolve_session(&headers, &params).await;
    state
        .controller
        .transfer_result(session_id, params.dial_call_status.as_deref())
        .into_response()
}

async fn stream_audio_handler(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Response {
    let Ok(session_id) = raw_id.parse::<SessionId>() else {
        return (StatusCode::NOT_FOUND, AUDIO_NOT_FOUND).into_response();
    };
    match state.controller.fetch_audio(session_id).await {
        Ok(Some(artifact)) => {
            info!(session_id = %session_id, bytes = artifact.len(), "Streaming audio");
            (
                [
                    (header::CONTENT_TYPE, artifact.content_type),
                    // Every utterance of a call shares this URL.
                    (header::CACHE_CONTROL, "no-cache".to_string()),
                ],
                artifact.bytes,
            )
                .into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, AUDIO_NOT_FOUND).into_response(),
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Failed to read audio");
            (StatusCode::NOT_FOUND, AUDIO_NOT_FOUND).into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = GatewayOptions::default();
        assert!(options.public_url.is_none());
        assert_eq!(options.session_ttl, Duration::from_secs(1800));
    }

    #[tokio::test]
    async fn test_banner() {
        assert_eq!(banner_handler().await, BANNER);
    }
}
