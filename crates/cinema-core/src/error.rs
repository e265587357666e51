//! Error types for the cinema catalog client
//!
//! This module defines all error types used throughout the library.
//! CinemaError implements Serialize for Tauri compatibility.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for catalog operations
#[derive(Error, Debug)]
pub enum CinemaError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// Response body could not be decoded into catalog records
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Rate limited by the server (HTTP 429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Requested resource was not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Client configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for CinemaError {
    fn from(err: serde_json::Error) -> Self {
        CinemaError::Decode(err.to_string())
    }
}

/// Serialize CinemaError as a string for Tauri compatibility
impl Serialize for CinemaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CinemaError>;
