//! Error types for the todo core.
//!
//! # Design
//! "Not found" is not an error here: the repository reports it as `None` or
//! `false`. `StoreError` covers every failure talking to the remote store,
//! and `ValidationError` covers request payloads rejected before any store
//! round trip.

use thiserror::Error;

/// Any failure originating from the remote table-store or its transport.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never produced a response (DNS, connect, TLS, I/O).
    #[error("store transport failed: {0}")]
    Transport(String),

    /// The store answered with a non-success status, e.g. a constraint
    /// violation or a bad API key.
    #[error("store rejected request with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// An insert succeeded at the HTTP level but no row came back.
    #[error("store returned no row for insert")]
    MissingRow,

    /// The response body was not a list of `todos` rows.
    #[error("failed to decode store response: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode store request: {0}")]
    Encode(String),
}

/// A request payload that is well-formed JSON but breaks a field rule.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
}

/// Missing or malformed process configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}
