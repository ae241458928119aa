//! Sourcemap validation outcomes
//!
//! These never abort a verification run. The matcher turns every variant
//! into `valid: false` on the affected file.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum SourcemapError {
    #[error("sourcemap could not be decoded: {message}")]
    InvalidMap { message: String },

    #[error("unsupported sourcemap version: {version}")]
    UnsupportedVersion { version: String },

    #[error("no content available for source {source_name}")]
    MissingSourceContent { source_name: String },

    #[error("generated position {line}:{column} is outside the bundle")]
    GeneratedOutOfBounds { line: u32, column: u32 },

    #[error("original position {line}:{column} is outside {source_name}")]
    OriginalOutOfBounds {
        source_name: String,
        line: u32,
        column: u32,
    },

    #[error("expected name {name} at {source_name}:{line}:{column}")]
    NameMismatch {
        source_name: String,
        name: String,
        line: u32,
        column: u32,
    },

    #[error("validator panicked: {message}")]
    ValidatorPanicked { message: String },
}
