//! Authenticated request context

/// The identity every core operation runs as.
///
/// The username is trusted as-is once the token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
}

impl AuthContext {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}
