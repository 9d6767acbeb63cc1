//! Call session state for voxgate.
//!
//! A [`CallSession`] lives for exactly one phone call. It is kept in a
//! [`SessionStore`] keyed by its [`SessionId`](voxgate_core::SessionId) and is
//! never written to durable storage.

/// The per-call session type.
pub mod session;
/// Session store trait and the in-memory implementation.
pub mod store;

pub use session::CallSession;
pub use store::{InMemorySessionStore, SessionStore};
