// src/services/air_client.rs
//! Client for the external identity verifier.
//!
//! The verifier is an opaque remote capability: it opens verification
//! sessions and reports their raw status. This module defines the
//! [`VerifierApi`] trait the rest of the service depends on, plus the
//! production HTTP implementation. Handlers receive the capability by
//! injection so tests can substitute a fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Session handle returned when the verifier opens a session.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandle {
    /// User-facing link to complete the proof
    pub verification_url: String,

    /// Opaque session primary key assigned by the verifier
    pub verification_request_id: String,

    /// Raw status at session open; absent means freshly pending
    #[serde(default)]
    pub status: Option<String>,
}

/// Raw status sample for one verification request.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawVerificationResult {
    /// Free-form status string ("pending", "completed", "failed", ...)
    pub status: String,

    /// Opaque proof payload, populated on completion
    #[serde(default)]
    pub proof_result: Option<serde_json::Value>,
}

/// Remote verifier capability.
///
/// Both operations are stateless and idempotent from this service's point
/// of view; the verifier holds all session state.
#[async_trait]
pub trait VerifierApi: Send + Sync {
    /// Opens a verification session authenticated by `auth_token`.
    async fn verify_credential(
        &self,
        auth_token: &str,
        program_id: &str,
        redirect_url: &str,
    ) -> anyhow::Result<SessionHandle>;

    /// Samples the current status of a previously opened session.
    async fn get_verification_status(
        &self,
        verification_request_id: &str,
    ) -> anyhow::Result<RawVerificationResult>;
}

/// HTTP implementation of [`VerifierApi`] against the verifier's REST API.
pub struct AirClient {
    http: reqwest::Client,
    base_url: String,
    partner_id: String,
}

impl AirClient {
    /// Creates a client for the verifier at `base_url`.
    pub fn new(base_url: &str, partner_id: &str) -> Self {
        AirClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            partner_id: partner_id.to_string(),
        }
    }
}

#[async_trait]
impl VerifierApi for AirClient {
    async fn verify_credential(
        &self,
        auth_token: &str,
        program_id: &str,
        redirect_url: &str,
    ) -> anyhow::Result<SessionHandle> {
        let url = format!("{}/verify", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({
                "partnerId": self.partner_id,
                "authToken": auth_token,
                "programId": program_id,
                "redirectUrl": redirect_url,
            }))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<SessionHandle>().await?)
    }

    async fn get_verification_status(
        &self,
        verification_request_id: &str,
    ) -> anyhow::Result<RawVerificationResult> {
        let url = format!("{}/status", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&json!({
                "partnerId": self.partner_id,
                "verificationRequestId": verification_request_id,
            }))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<RawVerificationResult>().await?)
    }
}
