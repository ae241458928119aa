//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Provide a configuration file or rely on the defaults."),
            Self::InvalidValue { .. } | Self::ParseError { .. } => {
                Some("Fix the configuration value and retry.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::NotFound { .. } => "config.not_found",
            Self::ParseError { .. } => "config.parse_error",
            Self::InvalidValue { .. } => "config.invalid_value",
        })
    }
}
