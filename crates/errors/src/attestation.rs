//! Attestation decoding error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum AttestationError {
    #[error("attestation payload is not valid base64: {message}")]
    InvalidEncoding { message: String },

    #[error("attestation payload is not a valid statement: {message}")]
    InvalidStatement { message: String },

    #[error("unexpected payload type: {payload_type}")]
    UnexpectedPayloadType { payload_type: String },

    #[error("duplicate {alias} attestation")]
    Duplicate { alias: String },
}

impl UserFacingError for AttestationError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::InvalidEncoding { .. } => "attestation.invalid_encoding",
            Self::InvalidStatement { .. } => "attestation.invalid_statement",
            Self::UnexpectedPayloadType { .. } => "attestation.unexpected_payload_type",
            Self::Duplicate { .. } => "attestation.duplicate",
        })
    }
}

impl From<base64::DecodeError> for AttestationError {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidEncoding {
            message: err.to_string(),
        }
    }
}
