//! Errors reported by registry and repository collaborators

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum FetchError {
    #[error("package not found: {name}@{version}")]
    PackageNotFound { name: String, version: String },

    #[error("packument for {name} has no repository")]
    MissingRepository { name: String },

    #[error("invalid repository URL: {url}")]
    InvalidRepositoryUrl { url: String },

    #[error("checkout of {url}#{commit} failed: {message}")]
    CheckoutFailed {
        url: String,
        commit: String,
        message: String,
    },

    #[error("download failed: {message}")]
    DownloadFailed { message: String },

    #[error("file {path} is not valid UTF-8")]
    NonUtf8Content { path: String },
}

impl UserFacingError for FetchError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::PackageNotFound { .. } => Some("Check the package name, version and registry."),
            Self::MissingRepository { .. } => {
                Some("The package does not declare a source repository; provenance cannot be traced.")
            }
            Self::DownloadFailed { .. } | Self::CheckoutFailed { .. } => {
                Some("Check network connectivity and retry.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::DownloadFailed { .. } | Self::CheckoutFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::PackageNotFound { .. } => "fetch.package_not_found",
            Self::MissingRepository { .. } => "fetch.missing_repository",
            Self::InvalidRepositoryUrl { .. } => "fetch.invalid_repository_url",
            Self::CheckoutFailed { .. } => "fetch.checkout_failed",
            Self::DownloadFailed { .. } => "fetch.download_failed",
            Self::NonUtf8Content { .. } => "fetch.non_utf8_content",
        })
    }
}
