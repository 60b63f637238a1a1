//! JWT claims types

use serde::{Deserialize, Serialize};

/// Claims carried by access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Expires at
    pub exp: u64,
}
