//! Authentication configuration

use jsonwebtoken::Algorithm;

use crate::error::AuthError;

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub algorithm: Algorithm,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl AuthConfig {
    /// Build a config from a shared secret and an algorithm name such as `HS256`.
    ///
    /// Only HMAC algorithms are accepted since tokens are verified with the shared secret.
    pub fn new(secret_key: impl Into<String>, algorithm: &str) -> Result<Self, AuthError> {
        let algorithm: Algorithm = algorithm
            .parse()
            .map_err(|_| AuthError::UnsupportedAlgorithm(algorithm.to_string()))?;

        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::UnsupportedAlgorithm(format!("{:?}", algorithm)));
        }

        Ok(Self {
            secret_key: secret_key.into(),
            algorithm,
        })
    }
}
