// src/main.rs

//! # Mocawin Verification Service - Main Entry Point
//!
//! This module serves as the main entry point for the verification backend
//! of the Mocawin prediction-market demo. It wires the token issuer, the
//! external verifier client and the session tracker together and starts the
//! API server.
//!
//! ## Architecture Overview
//! 1. **Auth Layer**: `TokenIssuer` minting RS256 partner assertions
//! 2. **Verifier Layer**: `AirClient` talking to the external identity verifier
//! 3. **Services Layer**: Session tracking, polling and API endpoints
//!
//! ## Environment Variables Required
//! - `PRIVATE_KEY_PATH` or `PRIVATE_KEY_B64`: RSA signing key (PEM)
//! - `AIR_PARTNER_ID`: Partner identifier registered with the verifier
//! - `JWT_KEY_ID`: Key identifier placed in token headers
//! - `AIR_API_URL`: Base URL of the external verifier
//! - `AIR_PROGRAM_ID`: Program/policy the verifier evaluates against
//! - `APP_URL`: (Optional) Frontend base URL for redirects (default: http://localhost:3000)
//! - `TOKEN_TTL_SECS`: (Optional) Assertion validity window (default: 300)
//! - `APP_ENV`: (Optional) "development" enables error detail in responses
//! - `PORT`: (Optional) Listen port (default: 3000)

use crate::auth::signing_identity::SigningIdentity;
use crate::auth::token_issuer::TokenIssuer;
use crate::services::air_client::AirClient;
use crate::services::api_server::ApiServer;
use crate::services::session_tracker::SessionTracker;
use dotenv::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

// Module declarations (organized by functional domain)
mod auth; // Signing identity and JWT issuance
mod error; // Error taxonomy
mod models; // Data structures
mod services; // Business logic and API

/// Main application entry point
///
/// # Initialization Sequence
/// 1. Load environment configuration
/// 2. Build the token issuer from the signing identity
/// 3. Initialize the external verifier client and session tracker
/// 4. Start API server
///
/// # Panics
/// - If required environment variables are missing
/// - If the signing key cannot be parsed
#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::init();

    // Signing identity for partner assertions
    let identity = SigningIdentity::from_env()
        .expect("Signing identity incomplete - check PRIVATE_KEY_PATH/PRIVATE_KEY_B64, AIR_PARTNER_ID, JWT_KEY_ID");

    let validity_secs = std::env::var("TOKEN_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(300);
    let issuer = Arc::new(
        TokenIssuer::new(&identity, Duration::from_secs(validity_secs))
            .expect("Failed to load signing key - verify the PEM is an RSA private key"),
    );

    // External verifier configuration
    let air_api_url = std::env::var("AIR_API_URL")
        .expect("AIR_API_URL must be set in .env");
    let program_id = std::env::var("AIR_PROGRAM_ID")
        .expect("AIR_PROGRAM_ID must be set in .env");
    let app_url = std::env::var("APP_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    let redirect_url = format!("{}/profile?verification_complete=true", app_url);

    let verifier = Arc::new(AirClient::new(&air_api_url, &identity.partner_id));

    // Session tracker over the injected verifier capability
    let tracker = SessionTracker::new(verifier, issuer.clone(), program_id, redirect_url)
        .expect("Failed to initialize SessionTracker - check AIR_PROGRAM_ID");

    let dev_mode = std::env::var("APP_ENV")
        .map(|env| env == "development")
        .unwrap_or(false);

    // Initialize API Server with all dependencies
    let api_server = ApiServer::new(tracker, issuer, dev_mode);

    // Start the HTTP server
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    println!("API server running at http://{}", addr);
    println!("Available endpoints:");
    println!("- POST /verify/request");
    println!("- POST /verify/status");
    println!("- POST /token");

    api_server.run(addr).await;
}
