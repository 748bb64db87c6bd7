// src/error.rs
//! Error taxonomy for the verification service.
//!
//! Distinguishes configuration and cryptographic failures (not retriable,
//! operator must fix the deployment) from failures of calls to the external
//! verifier (surfaced to the caller, retried at the caller's discretion).

use thiserror::Error;

/// Errors produced by the token issuer and the verification session tracker.
#[derive(Debug, Error)]
pub enum Error {
    /// A required piece of signing configuration is missing or empty.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The private key could not be parsed as PEM.
    #[error("key format error: {0}")]
    KeyFormat(String),

    /// The cryptographic signing operation failed (for example, the key
    /// family does not match the RS256 algorithm).
    #[error("signing error: {0}")]
    Signing(String),

    /// Opening a verification session with the external verifier failed.
    /// Retrying automatically risks creating duplicate pending sessions,
    /// so retry is left to the operator.
    #[error("verification request failed: {0}")]
    Request(String),

    /// A single status poll against the external verifier failed. The
    /// polling driver logs these and keeps polling.
    #[error("status poll failed: {0}")]
    Poll(String),
}

impl Error {
    /// Whether the condition can clear on its own without operator action.
    ///
    /// Configuration, key format and signing errors require a deployment
    /// fix; request and poll errors come from the external verifier and
    /// may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Request(_) | Error::Poll(_))
    }
}
