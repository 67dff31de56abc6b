pub mod error;
pub mod types;
pub mod config;

pub use error::{WipiError, Result};
pub use types::*;
pub use config::*;

/// Scheme label prefixed to the token in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Default lifetime of an access token, in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

pub const DEFAULT_DEAUTH_PACKETS: u32 = 200;
pub const DEFAULT_DEAUTH_DELAY_MS: u32 = 200;
