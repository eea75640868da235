use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::models::claims::TokenClaims;

#[derive(Debug, Error, PartialEq)]
pub enum JwtError {
    #[error("Token invalid atau expired")]
    InvalidToken,

    #[error("JWT secret tidak ditemukan")]
    MissingSecret,

    #[error("Token type tidak valid untuk endpoint ini")]
    InvalidTokenType,
}

/// Validate JWT token dari hosted auth provider dan extract claims.
///
/// Hanya access token yang diterima; audience tidak dicek karena setiap
/// project di auth provider memakai audience berbeda.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenClaims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }

    // Production safety check
    if !cfg!(debug_assertions) && secret.contains("change-this") {
        return Err(JwtError::MissingSecret);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| JwtError::InvalidToken)?;

    if !token_data.claims.is_access_token() {
        return Err(JwtError::InvalidTokenType);
    }

    Ok(token_data.claims)
}

/// Extract bearer token dari Authorization header
pub fn extract_bearer_token(auth_header: &str) -> Option<String> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
}
