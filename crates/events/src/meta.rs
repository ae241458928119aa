use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use tracing::Level;

/// Structured metadata that accompanies every event emission.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    /// High-level correlation identifier (usually `name@version`).
    pub correlation_id: Option<String>,
    /// Severity used for routing to logging systems.
    pub level: EventLevel,
    /// Subsystem that originated the event.
    pub source: EventSource,
}

impl EventMeta {
    #[must_use]
    pub fn new(level: impl Into<EventLevel>, source: impl Into<EventSource>) -> Self {
        Self {
            correlation_id: None,
            level: level.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }
}

/// Lightweight severity levels used by the event system.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Level> for EventLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::TRACE => EventLevel::Trace,
            Level::DEBUG => EventLevel::Debug,
            Level::INFO => EventLevel::Info,
            Level::WARN => EventLevel::Warn,
            Level::ERROR => EventLevel::Error,
        }
    }
}

/// Component that originated the event.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct EventSource(Cow<'static, str>);

impl EventSource {
    pub const GENERAL: Self = Self::const_str("general");
    pub const VERIFY: Self = Self::const_str("verify");
    pub const PROVENANCE: Self = Self::const_str("provenance");

    const fn const_str(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for EventSource {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for EventSource {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}
