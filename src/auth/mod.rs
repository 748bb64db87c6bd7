pub mod signing_identity;
pub mod token_issuer;
