// src/models/session.rs
//! Verification session data model.
//!
//! A session represents one outstanding request to prove a credential with
//! the external verifier. The verifier owns all session state; these types
//! only carry what it reported.

use crate::models::status::VerificationStatus;
use serde::{Deserialize, Serialize};

/// Handle for one externally-tracked verification attempt.
///
/// Returned when a session is opened. The `verification_request_id` is the
/// session's primary key with the external verifier; the `verification_url`
/// is the user-facing link to complete the proof.
///
/// # Lifecycle
/// Created when the session-open call succeeds (status `Pending`). The
/// session is never mutated locally; callers observe progress by polling,
/// and the session logically ends at the first terminal classification or
/// when the poll ceiling elapses.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSession {
    /// Opaque request id assigned by the external verifier
    pub verification_request_id: String,

    /// Link the user opens to complete the verification flow
    pub verification_url: String,

    /// Classification of the status reported at session open
    pub status: VerificationStatus,
}

/// Result of a single status poll.
///
/// `proof_result` is an opaque payload from the external verifier and is
/// only meaningful when `status` is `Verified`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    /// Classification of the raw status string
    pub status: VerificationStatus,

    /// Opaque proof payload, present only on terminal success
    pub proof_result: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_serializes_camel_case() {
        let session = VerificationSession {
            verification_request_id: "req-123".into(),
            verification_url: "https://verifier.example/flow/req-123".into(),
            status: VerificationStatus::Pending,
        };
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["verificationRequestId"], "req-123");
        assert_eq!(json["verificationUrl"], "https://verifier.example/flow/req-123");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_report_includes_null_proof() {
        let report = StatusReport {
            status: VerificationStatus::Processing,
            proof_result: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["proofResult"].is_null());
    }
}
