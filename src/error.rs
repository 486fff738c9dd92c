// src/error.rs

//! Unified error handling for the joke fetcher.

use thiserror::Error;

use crate::models::Language;

/// Result type alias for joke operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request could not be built, sent, or read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Structured response was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Joke store read or write failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A source responded but carried no joke lines
    #[error("no jokes found in response from {endpoint}")]
    NoJokesFound { endpoint: String },

    /// Every live fetch returned a joke that was already stored
    #[error("could not find a new joke after {attempts} attempts")]
    DuplicateExhausted { attempts: usize },

    /// Rotation pool stayed empty after a reset
    #[error("no jokes stored for language '{language}'")]
    PoolExhausted { language: Language },

    /// Fallback pick found nothing to show
    #[error("no stored joke to fall back on for language '{language}'")]
    EmptyStore { language: Language },
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a "no jokes found" error for the given endpoint.
    pub fn no_jokes(endpoint: impl Into<String>) -> Self {
        Self::NoJokesFound {
            endpoint: endpoint.into(),
        }
    }

    /// Whether a failure of the live fetch path may be answered with a
    /// random joke from the store instead.
    ///
    /// Store failures are never recoverable: the fallback needs the store.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateExhausted { .. }
                | Self::Http(_)
                | Self::Json(_)
                | Self::NoJokesFound { .. }
        )
    }
}
