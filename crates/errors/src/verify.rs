//! Verification engine error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum VerifyError {
    /// A published `.map` file is not parseable. This indicates a corrupt
    /// target rather than missing provenance, so it is never swallowed.
    #[error("malformed sourcemap {path}: {message}")]
    MalformedSourcemap { path: String, message: String },

    #[error("no {manifest} declaring package {package} found in sources")]
    RootNotFound { package: String, manifest: String },
}

impl UserFacingError for VerifyError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MalformedSourcemap { .. } => {
                Some("The published artifact ships a corrupt sourcemap; inspect the tarball.")
            }
            Self::RootNotFound { .. } => Some(
                "Check the repository reference, or disable strict root resolution to fall back to the repository root.",
            ),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::MalformedSourcemap { .. } => "verify.malformed_sourcemap",
            Self::RootNotFound { .. } => "verify.root_not_found",
        })
    }
}
