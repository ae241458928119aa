use serde::{Deserialize, Serialize};

use crate::EventSource;
use crumbs_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod general;
pub mod provenance;
pub mod verify;

pub use general::*;
pub use provenance::*;
pub use verify::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, debug logs)
    General(GeneralEvent),

    /// Matching engine events (root resolution, per-file verdicts)
    Verify(VerifyEvent),

    /// Collaborator events (fetching, attestation decoding, commit resolution)
    Provenance(ProvenanceEvent),
}

impl AppEvent {
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::General(_) => EventSource::GENERAL,
            Self::Verify(_) => EventSource::VERIFY,
            Self::Provenance(_) => EventSource::PROVENANCE,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::Verify(VerifyEvent::Failed { .. })
            | Self::Provenance(ProvenanceEvent::Failed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Verify(VerifyEvent::SourcemapRejected { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Verify(VerifyEvent::FileMatched { .. }) => Level::DEBUG,

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::General(_) => "crumbs::events::general",
            Self::Verify(_) => "crumbs::events::verify",
            Self::Provenance(_) => "crumbs::events::provenance",
        }
    }
}
