// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReswatchError {
    /// Bad constructor input. Never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The existence, modification time or content of a resource could not
    /// be determined (transport failure, I/O error, unexpected status).
    #[error("Resource access error for {location}: {reason}")]
    ResourceAccess {
        location: String,
        status: Option<u16>,
        reason: String,
    },

    /// A content filter failed while transforming a resource stream.
    #[error("Filter error: {0}")]
    Filter(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReswatchError {
    /// Access failure without a transport status (I/O, DNS, refused, ...).
    pub fn access(location: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ReswatchError::ResourceAccess {
            location: location.into(),
            status: None,
            reason: reason.to_string(),
        }
    }

    /// Access failure caused by an unexpected transport status.
    pub fn status(location: impl Into<String>, status: u16) -> Self {
        ReswatchError::ResourceAccess {
            location: location.into(),
            status: Some(status),
            reason: format!("received HTTP status code {status}"),
        }
    }

    pub fn is_access(&self) -> bool {
        matches!(self, ReswatchError::ResourceAccess { .. })
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ReswatchError>;
