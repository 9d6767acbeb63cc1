//! Telephony webhook gateway for voxgate.
//!
//! [`GatewayServer::build`] wires the call webhooks to an [`IvrController`],
//! which runs the greet, listen, answer and escalate loop for each call and
//! answers every step with TwiML.

pub mod ivr;
pub mod script;
pub mod server;
pub mod twiml;
pub mod webhook;

pub use ivr::{CallState, IvrController};
pub use script::CallScript;
pub use server::{spawn_session_sweeper, GatewayOptions, GatewayServer};
pub use twiml::{VoiceResponse, Verb};
pub use webhook::{WebhookForm, WebhookParams, SESSION_COOKIE};
