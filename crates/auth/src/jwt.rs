//! JWT validation and token extraction helpers

use axum::http::HeaderValue;
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::claims::TokenClaims;
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Validate an access token and return its claims
pub(crate) fn validate_jwt_token(
    token: &str,
    config: &AuthConfig,
) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(config.algorithm);
    validation.validate_aud = false;

    let decoding_key = DecodingKey::from_secret(config.secret_key.as_ref());

    let token_data = decode::<TokenClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        AuthError::InvalidToken
    })?;

    Ok(token_data.claims)
}

/// Extract bearer token from Authorization header
pub(crate) fn extract_bearer_token(header: &HeaderValue) -> Result<String, AuthError> {
    let header_str = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    match header_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AuthError::InvalidAuthorizationFormat),
    }
}
