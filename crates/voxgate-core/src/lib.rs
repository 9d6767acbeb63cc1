//! Core types and error definitions for voxgate.
//!
//! This crate provides the foundational types shared across all voxgate crates:
//! the unified error enum and the transcript representation that flows between
//! the call session, the language model adapter, and the IVR controller.
//!
//! # Main types
//!
//! - [`VoxgateError`]: Unified error enum for all voxgate subsystems.
//! - [`VoxgateResult`]: Convenience alias for `Result<T, VoxgateError>`.
//! - [`Role`]: Transcript role (system, assistant, user).
//! - [`Turn`]: A single entry of a call transcript.
//! - [`SessionId`]: Identifier of one phone call's server-side state.

/// Error types.
pub mod error;
/// Transcript types.
pub mod turn;

pub use error::{VoxgateError, VoxgateResult};
pub use turn::{Role, Turn};

/// Opaque identifier of a call session. One per inbound phone call.
pub type SessionId = uuid::Uuid;
