//! Error types for travel-tracker

use thiserror::Error;

/// Main error type for travel-tracker operations
#[derive(Error, Debug)]
pub enum Error {
    /// Rejected locally, before any request was issued
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Missing {0} identifier")]
    MissingId(&'static str),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Backend answered with a non-2xx status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Geo error: {0}")]
    Geo(String),
}

impl Error {
    /// HTTP status reported by the backend, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// True for errors raised before a network call was attempted
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::MissingId(_) | Error::InvalidCoordinates(_)
        )
    }
}

/// Result type alias for travel-tracker operations
pub type Result<T> = std::result::Result<T, Error>;
