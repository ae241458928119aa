#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for crumbs
//!
//! Domain events describe what a verification run did. Every emission is
//! logged through `tracing` with structured fields and, when a channel is
//! attached, forwarded to the receiver so a host application can render
//! progress or collect an audit trail.

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, FailureContext, GeneralEvent, MatchOutcome, ProvenanceEvent, VerifyEvent,
};

mod logging;
pub use logging::log_event_with_tracing;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// An event paired with its metadata
#[derive(Debug, Clone)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    /// Wrap an event with metadata derived from its domain and level
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.log_level(), event.event_source());
        Self { meta, event }
    }
}

pub type EventSender = UnboundedSender<EventMessage>;

pub type EventReceiver = UnboundedReceiver<EventMessage>;

#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implementors only say where events go; logging happens on every emission
/// whether or not a sender is attached.
pub trait EventEmitter {
    fn event_sender(&self) -> Option<&EventSender>;

    /// Correlation identifier stamped on every emitted event
    fn correlation_id(&self) -> Option<String> {
        None
    }

    fn emit(&self, event: AppEvent) {
        let mut message = EventMessage::from_event(event);
        if let Some(id) = self.correlation_id() {
            message.meta = message.meta.with_correlation_id(id);
        }
        log_event_with_tracing(&message);
        if let Some(sender) = self.event_sender() {
            // Receiver may be gone; the run continues regardless
            let _ = sender.send(message);
        }
    }

    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    fn emit_verify(&self, event: VerifyEvent) {
        self.emit(AppEvent::Verify(event));
    }

    fn emit_provenance(&self, event: ProvenanceEvent) {
        self.emit(AppEvent::Provenance(event));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
