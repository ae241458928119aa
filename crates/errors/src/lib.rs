#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for crumbs
//!
//! This crate provides fine-grained error types organized by domain.
//! All error types implement Clone so they can travel through events.

use std::borrow::Cow;

use thiserror::Error;

pub mod attestation;
pub mod config;
pub mod fetch;
pub mod sourcemap;
pub mod verify;

pub use attestation::AttestationError;
pub use config::ConfigError;
pub use fetch::FetchError;
pub use sourcemap::SourcemapError;
pub use verify::VerifyError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("verification error: {0}")]
    Verify(#[from] VerifyError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("attestation error: {0}")]
    Attestation(#[from] AttestationError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        #[cfg_attr(feature = "serde", serde(with = "io_kind_as_str"))]
        kind: std::io::ErrorKind,
        message: String,
        path: Option<String>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<String>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Result type alias for crumbs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information.
pub trait UserFacingError {
    /// Short message suitable for terminal output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Verify(err) => err.user_message(),
            Error::Config(err) => err.user_message(),
            Error::Attestation(err) => err.user_message(),
            Error::Fetch(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            Error::Internal(_) => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Verify(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Fetch(err) => err.user_hint(),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Fetch(err) => err.is_retryable(),
            Error::Io { .. } => true,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Verify(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Attestation(err) => err.user_code(),
            Error::Fetch(err) => err.user_code(),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}

#[cfg(feature = "serde")]
mod io_kind_as_str {
    use serde::{Deserialize, Deserializer, Serializer};
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S>(kind: &std::io::ErrorKind, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&format!("{kind:?}"))
    }
    pub fn deserialize<'de, D>(deserializer: D) -> Result<std::io::ErrorKind, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "NotFound" => std::io::ErrorKind::NotFound,
            "PermissionDenied" => std::io::ErrorKind::PermissionDenied,
            "InvalidInput" => std::io::ErrorKind::InvalidInput,
            "InvalidData" => std::io::ErrorKind::InvalidData,
            "UnexpectedEof" => std::io::ErrorKind::UnexpectedEof,
            _ => std::io::ErrorKind::Other,
        })
    }
}
