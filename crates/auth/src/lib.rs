//! Authentication middleware for the Chatvault API
//!
//! Verifies bearer JWTs and provides an axum extractor that works with any
//! domain state implementing `FromRef<S>` for `AuthBackend`. Token issuance
//! lives with the credential service, not here.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;

pub use backend::AuthBackend;
pub use claims::TokenClaims;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::AuthUser;
