// src/models/status.rs
//! Verification status classification.
//!
//! The external verifier reports the state of a verification request as a
//! free-form string. This module maps those raw strings onto a closed set of
//! semantic states and exposes the predicates the polling loop terminates on.

use serde::{Deserialize, Serialize};

/// Semantic state of a verification request.
///
/// Derived from the external verifier's raw status string via [`classify`].
/// The external system is the source of truth; this enum only names what was
/// observed, it carries no local state machine.
///
/// # Terminal states
/// `Verified` (success) and `Failed`/`Rejected`/`Revoked`/`Expired` (failure)
/// end a session. `Pending` and `Processing` mean the proof is still being
/// produced. `Unknown` is an unrecognized raw string and is treated as
/// non-terminal.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// The credential was proven valid (terminal success).
    Verified,
    /// The request is open but the user has not completed the flow.
    Pending,
    /// The external verifier is actively evaluating the proof.
    Processing,
    /// The proof could not be produced or checked (terminal failure).
    Failed,
    /// The verifier declined the credential (terminal failure).
    Rejected,
    /// The credential has been revoked by its issuer (terminal failure).
    Revoked,
    /// The credential is past its validity period (terminal failure).
    Expired,
    /// The raw status string was not recognized.
    Unknown,
}

/// Classifies a raw status string from the external verifier.
///
/// Pure and total: matching is case-insensitive against a fixed synonym
/// dictionary and anything unrecognized maps to
/// [`VerificationStatus::Unknown`].
pub fn classify(raw: &str) -> VerificationStatus {
    match raw.trim().to_ascii_lowercase().as_str() {
        "compliant" | "verified" | "valid" | "success" | "completed" => {
            VerificationStatus::Verified
        }
        "revoked" => VerificationStatus::Revoked,
        "expired" => VerificationStatus::Expired,
        "pending" => VerificationStatus::Pending,
        "processing" | "in_progress" => VerificationStatus::Processing,
        "failed" => VerificationStatus::Failed,
        "rejected" | "denied" => VerificationStatus::Rejected,
        _ => VerificationStatus::Unknown,
    }
}

impl VerificationStatus {
    /// True only for `Verified`.
    pub fn is_terminal_success(&self) -> bool {
        matches!(self, VerificationStatus::Verified)
    }

    /// True for the terminal failure states: `Failed`, `Rejected`,
    /// `Revoked` and `Expired`.
    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            VerificationStatus::Failed
                | VerificationStatus::Rejected
                | VerificationStatus::Revoked
                | VerificationStatus::Expired
        )
    }

    /// True for the non-terminal in-flight states `Pending` and
    /// `Processing`. `Unknown` is neither pending nor terminal.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            VerificationStatus::Pending | VerificationStatus::Processing
        )
    }

    /// True once polling must stop (either terminal success or failure).
    pub fn is_terminal(&self) -> bool {
        self.is_terminal_success() || self.is_terminal_failure()
    }

    /// Short human-facing label for UI display.
    pub fn label(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => "Verified",
            VerificationStatus::Pending => "Pending",
            VerificationStatus::Processing => "Processing",
            VerificationStatus::Failed => "Failed",
            VerificationStatus::Rejected => "Rejected",
            VerificationStatus::Revoked => "Revoked",
            VerificationStatus::Expired => "Expired",
            VerificationStatus::Unknown => "Unknown",
        }
    }

    /// One-sentence description of the state, suitable for end users.
    pub fn description(&self) -> &'static str {
        match self {
            VerificationStatus::Verified => {
                "The credential is valid and compliant with all requirements."
            }
            VerificationStatus::Pending => {
                "Verification is in progress. Please complete the verification process."
            }
            VerificationStatus::Processing => "Your verification request is being processed.",
            VerificationStatus::Failed => {
                "Verification failed. Please try again or contact support."
            }
            VerificationStatus::Rejected => {
                "The verification request was rejected. Credentials do not meet requirements."
            }
            VerificationStatus::Revoked => {
                "The credential has been revoked and is no longer valid."
            }
            VerificationStatus::Expired => {
                "The credential has expired and needs to be renewed."
            }
            VerificationStatus::Unknown => {
                "Verification status is unknown. Please try again."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_synonyms() {
        for raw in ["compliant", "verified", "valid", "success", "completed"] {
            assert_eq!(classify(raw), VerificationStatus::Verified, "raw: {raw}");
        }
    }

    #[test]
    fn test_failure_synonyms_are_terminal() {
        for raw in ["revoked", "expired", "failed", "rejected", "denied"] {
            let status = classify(raw);
            assert!(status.is_terminal_failure(), "raw: {raw}");
            assert!(!status.is_terminal_success(), "raw: {raw}");
        }
    }

    #[test]
    fn test_pending_synonyms() {
        assert_eq!(classify("pending"), VerificationStatus::Pending);
        assert_eq!(classify("processing"), VerificationStatus::Processing);
        assert_eq!(classify("in_progress"), VerificationStatus::Processing);
        assert!(classify("pending").is_pending());
        assert!(classify("in_progress").is_pending());
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("COMPLIANT"), classify("compliant"));
        assert_eq!(classify("COMPLIANT"), VerificationStatus::Verified);
        assert_eq!(classify("Pending"), VerificationStatus::Pending);
        assert_eq!(classify("DENIED"), VerificationStatus::Rejected);
    }

    #[test]
    fn test_unrecognized_maps_to_unknown() {
        let status = classify("banana");
        assert_eq!(status, VerificationStatus::Unknown);
        assert!(!status.is_terminal_success());
        assert!(!status.is_terminal_failure());
        assert!(!status.is_pending());
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&VerificationStatus::Verified).unwrap();
        assert_eq!(json, "\"verified\"");
    }
}
