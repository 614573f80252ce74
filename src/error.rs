//! Error handling for range planning
//!
//! This module provides error types and result aliases for planning and
//! executing timestamp range queries.

use std::io;
use thiserror::Error;

/// Errors that can occur while planning or executing a range query
#[derive(Error, Debug)]
pub enum Error {
    /// A start or end timestamp string is empty, too long, or not a calendar date
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The parsed start instant lies after the parsed end instant
    #[error("Invalid range: start {begin} is after end {end}")]
    InvalidRange {
        begin: String,
        end: String,
    },

    /// A string is not a canonical 14-digit calendar date-time
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A partial timestamp could not be widened into valid margins
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    /// Errors related to configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for range query operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new malformed input error
    pub fn malformed_input(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    /// Create a new invalid range error
    pub fn invalid_range(begin: impl Into<String>, end: impl Into<String>) -> Self {
        Self::InvalidRange {
            begin: begin.into(),
            end: end.into(),
        }
    }

    /// Create a new invalid timestamp error
    pub fn invalid_timestamp(message: impl Into<String>) -> Self {
        Self::InvalidTimestamp(message.into())
    }

    /// Create a new invalid prefix error
    pub fn invalid_prefix(message: impl Into<String>) -> Self {
        Self::InvalidPrefix(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this error was caused by the caller's start/end input
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::MalformedInput(_) | Self::InvalidRange { .. })
    }

    /// Check if this is an invalid prefix error
    pub fn is_invalid_prefix(&self) -> bool {
        matches!(self, Self::InvalidPrefix(_))
    }

    /// Get a user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MalformedInput(_) => Some(
                "Timestamps are 1 to 14 digits of YYYYMMDDhhmmss, e.g. 2019 or 20190430".to_string(),
            ),
            Self::InvalidRange { .. } => {
                Some("Swap the arguments so the start is not after the end".to_string())
            }
            Self::Io(err) if err.kind() == io::ErrorKind::NotFound => {
                Some("The specified configuration file does not exist".to_string())
            }
            Self::Serialization(_) => Some("Check the configuration file is valid JSON".to_string()),
            _ => None,
        }
    }
}
