//! Error types for clubcast-live
//!
//! Defines service-specific error types using thiserror for clear error
//! propagation. Validation rejections (cooldown/ban/limit failures) are
//! deliberately NOT errors; they are domain values carried in
//! [`crate::engine::RequestOutcome`] and reported to the caller with a
//! human-readable reason.

use thiserror::Error;

/// Main error type for the live broadcast service
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Resource not found (unknown song/playlist id)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Queue management errors
    #[error("Queue error: {0}")]
    Queue(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using clubcast-live Error
pub type Result<T> = std::result::Result<T, Error>;
