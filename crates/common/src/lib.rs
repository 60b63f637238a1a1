//! Shared utilities, configuration, and error handling for Chatvault
//!
//! - Configuration loaded from the environment
//! - The common `Error` type and its HTTP mapping
//! - Request extractors and state machine errors

pub mod config;
pub mod error;
pub mod extractors;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use extractors::ValidatedJson;
pub use state::StateError;
