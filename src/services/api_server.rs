// src/services/api_server.rs
//! API Server for the Mocawin verification service.
//!
//! This module provides the REST interface consumed by the trading frontend:
//! - opening a verification session for a wallet address
//! - sampling the status of an open session
//! - minting a generic partner assertion (JWT)
//!
//! The API is built using Axum. Handlers translate the error taxonomy into
//! JSON error bodies; internal detail is only included when the service runs
//! in a development configuration.

use crate::auth::token_issuer::TokenIssuer;
use crate::error::Error;
use crate::services::session_tracker::SessionTracker;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

// API request and response structures

/// Request payload for opening a verification session
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequestBody {
    user_address: Option<String>,
}

/// Request payload for sampling a session's status
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyStatusBody {
    verification_request_id: Option<String>,
}

/// Request payload for generic assertion issuance
#[derive(Serialize, Deserialize, Default)]
struct TokenRequestBody {
    nonce: Option<String>,
}

/// Response containing a freshly minted assertion
#[derive(Serialize, Deserialize)]
struct TokenResponse {
    jwt: String,
}

/// Error body returned on 4xx/5xx responses
#[derive(Serialize, Deserialize)]
struct ErrorBody {
    error: String,

    /// Internal detail, only populated in development mode
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// API server state containing all service dependencies
pub struct ApiServer {
    /// Tracker for verification sessions against the external verifier
    tracker: Arc<SessionTracker>,

    /// Issuer for partner assertions
    issuer: Arc<TokenIssuer>,

    /// Whether error responses may carry internal detail
    dev_mode: bool,
}

impl ApiServer {
    /// Creates a new instance of the API server
    ///
    /// # Arguments
    /// * `tracker` - Verification session tracker
    /// * `issuer` - Partner assertion issuer (shared with the tracker)
    /// * `dev_mode` - Include internal error detail in responses
    pub fn new(tracker: SessionTracker, issuer: Arc<TokenIssuer>, dev_mode: bool) -> Self {
        ApiServer {
            tracker: Arc::new(tracker),
            issuer,
            dev_mode,
        }
    }

    /// Builds the router with all API routes
    pub fn router(state: Arc<ApiServer>) -> Router {
        Router::new()
            .route("/verify/request", post(Self::verify_request_handler))
            .route("/verify/status", post(Self::verify_status_handler))
            .route("/token", post(Self::token_handler))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Starts the API server and begins listening for requests
    ///
    /// # Arguments
    /// * `addr` - Socket address to bind to (e.g., "127.0.0.1:3000")
    pub async fn run(&self, addr: SocketAddr) {
        let app = Self::router(Arc::new(self.clone()));

        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        axum::serve(listener, app).await.unwrap();
    }

    /// Builds a 500 response from a service error, attaching internal
    /// detail only in development mode.
    fn error_response(&self, error: &Error) -> Response {
        let body = ErrorBody {
            error: error.to_string(),
            details: self.dev_mode.then(|| format!("{:?}", error)),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }

    /// Opens a verification session for a wallet address
    ///
    /// # Endpoint
    /// POST /verify/request
    ///
    /// # Request Body
    /// JSON payload containing `userAddress`
    ///
    /// # Responses
    /// - 200 OK: Returns `verificationUrl`, `verificationRequestId`, `status`
    /// - 400 Bad Request: Missing `userAddress`
    /// - 500 Internal Server Error: Issuer or external verifier failed
    async fn verify_request_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<VerifyRequestBody>,
    ) -> Response {
        let address = match payload.user_address {
            Some(a) if !a.trim().is_empty() => a,
            _ => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Missing userAddress" })),
                )
                    .into_response()
            }
        };

        match state.tracker.request_session(&address).await {
            Ok(session) => (StatusCode::OK, Json(session)).into_response(),
            Err(e) => {
                log::error!("verification request for {} failed: {}", address, e);
                state.error_response(&e)
            }
        }
    }

    /// Samples the status of an open verification session
    ///
    /// # Endpoint
    /// POST /verify/status
    ///
    /// # Request Body
    /// JSON payload containing `verificationRequestId`
    ///
    /// # Responses
    /// - 200 OK: Returns `status`, `proofResult` and display metadata
    /// - 400 Bad Request: Missing `verificationRequestId`
    /// - 500 Internal Server Error: Status query failed
    async fn verify_status_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<VerifyStatusBody>,
    ) -> Response {
        let request_id = match payload.verification_request_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": "Missing verificationRequestId" })),
                )
                    .into_response()
            }
        };

        match state.tracker.poll_status(&request_id).await {
            Ok(report) => (
                StatusCode::OK,
                Json(json!({
                    "status": report.status,
                    "proofResult": report.proof_result,
                    "label": report.status.label(),
                    "description": report.status.description(),
                })),
            )
                .into_response(),
            Err(e) => {
                log::error!("status check for {} failed: {}", request_id, e);
                state.error_response(&e)
            }
        }
    }

    /// Mints a generic partner assertion
    ///
    /// # Endpoint
    /// POST /token
    ///
    /// # Request Body
    /// JSON payload with an optional `nonce`
    ///
    /// # Responses
    /// - 200 OK: Returns the signed JWT
    /// - 500 Internal Server Error: Configuration or signing failure
    async fn token_handler(
        State(state): State<Arc<ApiServer>>,
        Json(payload): Json<TokenRequestBody>,
    ) -> Response {
        match state.issuer.issue_for_partner(payload.nonce) {
            Ok(jwt) => (StatusCode::OK, Json(TokenResponse { jwt })).into_response(),
            Err(e) => {
                log::error!("JWT generation failed: {}", e);
                state.error_response(&e)
            }
        }
    }
}

// Implement Clone for ApiServer to use with Axum's State
impl Clone for ApiServer {
    fn clone(&self) -> Self {
        ApiServer {
            tracker: Arc::clone(&self.tracker),
            issuer: Arc::clone(&self.issuer),
            dev_mode: self.dev_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session_tracker::test_support::{test_issuer, FakeVerifier};
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    fn test_router(dev_mode: bool) -> Router {
        let fake = Arc::new(FakeVerifier::always("pending"));
        let issuer = test_issuer();
        let tracker = SessionTracker::new(
            fake,
            issuer.clone(),
            "program-1".into(),
            "https://app.example/profile?verification_complete=true".into(),
        )
        .unwrap();
        ApiServer::router(Arc::new(ApiServer::new(tracker, issuer, dev_mode)))
    }

    fn failing_router(dev_mode: bool) -> Router {
        let fake = Arc::new(FakeVerifier::failing_open());
        let issuer = test_issuer();
        let tracker = SessionTracker::new(
            fake,
            issuer.clone(),
            "program-1".into(),
            "https://app.example".into(),
        )
        .unwrap();
        ApiServer::router(Arc::new(ApiServer::new(tracker, issuer, dev_mode)))
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_verify_request_returns_session() {
        let app = test_router(false);
        let response = app
            .oneshot(json_post("/verify/request", r#"{"userAddress": "0xabc"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["verificationRequestId"], "req-1");
        assert_eq!(json["status"], "pending");
    }

    #[tokio::test]
    async fn test_verify_request_missing_address_is_400() {
        let app = test_router(false);
        let response = app
            .oneshot(json_post("/verify/request", r#"{}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing userAddress");
    }

    #[tokio::test]
    async fn test_verify_status_missing_id_is_400() {
        let app = test_router(false);
        let response = app
            .oneshot(json_post("/verify/status", r#"{}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_verify_status_reports_classification() {
        let app = test_router(false);
        let response = app
            .oneshot(json_post(
                "/verify/status",
                r#"{"verificationRequestId": "req-1"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "pending");
        assert!(json["proofResult"].is_null());
        assert_eq!(json["label"], "Pending");
        assert!(json["description"].as_str().unwrap().contains("Verification"));
    }

    #[tokio::test]
    async fn test_token_endpoint_returns_jwt() {
        let app = test_router(false);
        let response = app.oneshot(json_post("/token", r#"{}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let jwt = json["jwt"].as_str().unwrap();
        assert_eq!(jwt.split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_error_detail_hidden_outside_dev_mode() {
        let app = failing_router(false);
        let response = app
            .oneshot(json_post("/verify/request", r#"{"userAddress": "0xabc"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(json["error"]
            .as_str()
            .unwrap()
            .contains("verifier unavailable"));
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn test_error_detail_present_in_dev_mode() {
        let app = failing_router(true);
        let response = app
            .oneshot(json_post("/verify/request", r#"{"userAddress": "0xabc"}"#))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert!(json["details"].is_string());
    }
}
