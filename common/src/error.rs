use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use redis::RedisError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WipiError>;

#[derive(Error, Debug)]
pub enum WipiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("Access token has expired")]
    TokenExpired,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Bad request ({0})")]
    BadRequest(String),
    #[error("Interface does not exist: {0}")]
    InterfaceNotFound(String),
    #[error("Database job failed ({0})")]
    JobPersistenceFailed(String),
    #[error("Could not initialize scanner with device specified ({0})")]
    ScannerInitFailed(String),
    #[error("Failed to launch radio operation: {0}")]
    LaunchFailed(String),
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl WipiError {
    pub fn unauthorized() -> Self {
        WipiError::Unauthorized("Unauthorized".to_string())
    }

    /// Message shown to the client. Token failures never leak verification detail.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidToken(_) => "Unauthorized".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for WipiError {
    fn from(err: std::io::Error) -> Self {
        WipiError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for WipiError {
    fn from(err: serde_json::Error) -> Self {
        WipiError::SerializationError(err.to_string())
    }
}

impl From<RedisError> for WipiError {
    fn from(err: RedisError) -> Self {
        WipiError::StorageError(err.to_string())
    }
}

impl ResponseError for WipiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) | Self::TokenExpired | Self::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::BadRequest(_) | Self::InterfaceNotFound(_) | Self::ScannerInitFailed(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::JobPersistenceFailed(_) |
            Self::LaunchFailed(_) |
            Self::StorageError(_) |
            Self::SerializationError(_) |
            Self::ConfigError(_) |
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "data": { "message": self.public_message() }
        }))
    }
}
