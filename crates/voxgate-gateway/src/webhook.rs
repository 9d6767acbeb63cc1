use axum::extract::{FromRequest, Request};
use axum::http::header::{CONTENT_TYPE, COOKIE, HOST};
use axum::http::HeaderMap;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tracing::warn;
use voxgate_core::SessionId;

/// Name of the cookie carrying the call session id.
pub const SESSION_COOKIE: &str = "voxgate_session";

/// Fields the telephony provider posts to the call webhooks.
///
/// Only what the IVR reads is modelled; everything else in the body is
/// ignored.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct WebhookParams {
    /// Provider identifier of the call leg.
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    /// Recognized caller speech from a `<Gather>`.
    #[serde(rename = "SpeechResult")]
    pub speech_result: Option<String>,
    /// Outcome of a `<Dial>`: `completed`, `busy`, `no-answer`, `failed`...
    #[serde(rename = "DialCallStatus")]
    pub dial_call_status: Option<String>,
}

/// Body extractor that accepts form-encoded or JSON webhook payloads.
///
/// Never rejects: an unreadable body becomes `T::default()` so the call flow
/// can still answer with markup.
pub struct WebhookForm<T>(pub T);

impl<S, T> FromRequest<S> for WebhookForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let parsed = if content_type.starts_with("application/json") {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(v)| v)
                .map_err(|e| e.body_text())
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(v)| v)
                .map_err(|e| e.body_text())
        } else {
            return Ok(Self(T::default()));
        };

        match parsed {
            Ok(value) => Ok(Self(value)),
            Err(reason) => {
                warn!(content_type = %content_type, reason = %reason, "Unreadable webhook body");
                Ok(Self(T::default()))
            }
        }
    }
}

/// Read the session id from the request cookies, if present and valid.
pub fn session_from_cookies(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// `Set-Cookie` value binding the caller to a session for `ttl`.
pub fn session_cookie(session_id: SessionId, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; Max-Age={}",
        ttl.as_secs()
    )
}

/// Externally reachable origin for playback URLs.
///
/// A configured public URL wins. Otherwise the request's `Host` header is
/// used with the `X-Forwarded-Proto` scheme, or `http`. Without either the
/// result is empty and playback URLs stay relative.
pub fn resolve_base_url(public_url: Option<&str>, headers: &HeaderMap) -> String {
    if let Some(url) = public_url.filter(|u| !u.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }
    let Some(host) = headers.get(HOST).and_then(|v| v.to_str().ok()) else {
        return String::new();
    };
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("http");
    format!("{scheme}://{host}")
}
