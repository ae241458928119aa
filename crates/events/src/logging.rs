//! Structured logging for events
//!
//! Converts domain events into tracing records with structured fields.

use crate::{AppEvent, EventMessage, GeneralEvent, MatchOutcome, ProvenanceEvent, VerifyEvent};
use tracing::{debug, error, info, warn};

/// Log an event at its level with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let source = meta.source.as_str();
    let correlation = meta.correlation_id.as_deref().unwrap_or("");

    match &message.event {
        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message } => {
                warn!(source, correlation, "{message}");
            }
            GeneralEvent::DebugLog { message } => {
                debug!(source, correlation, "{message}");
            }
        },

        AppEvent::Verify(event) => match event {
            VerifyEvent::Started {
                package,
                targets,
                sources,
            } => {
                info!(source, correlation, package = %package, targets, sources, "Verification started");
            }
            VerifyEvent::RootResolved {
                package,
                root,
                manifest,
            } => {
                info!(
                    source,
                    correlation,
                    package = %package,
                    root = %root,
                    manifest = ?manifest,
                    "Package root resolved"
                );
            }
            VerifyEvent::FileMatched { path, outcome } => match outcome {
                MatchOutcome::Exact { paths } => {
                    debug!(source, correlation, path = %path, matched = ?paths, "Exact source match");
                }
                MatchOutcome::Approximate { path: matched, coherence } => {
                    debug!(
                        source,
                        correlation,
                        path = %path,
                        matched = %matched,
                        coherence,
                        "Approximate source match"
                    );
                }
                MatchOutcome::Unmatched => {
                    debug!(source, correlation, path = %path, "No source match");
                }
            },
            VerifyEvent::SourcemapRejected { path, reason } => {
                warn!(source, correlation, path = %path, reason = %reason, "Sourcemap rejected");
            }
            VerifyEvent::Completed {
                package,
                summary,
                duration_ms,
            } => {
                info!(
                    source,
                    correlation,
                    package = %package,
                    files = summary.files,
                    exact = summary.exact,
                    approximate = summary.approximate,
                    unmatched = summary.unmatched,
                    invalid_sourcemaps = summary.invalid_sourcemaps,
                    duration_ms,
                    "Verification completed"
                );
            }
            VerifyEvent::Failed { package, failure } => {
                error!(
                    source,
                    correlation,
                    package = %package,
                    code = ?failure.code,
                    error = %failure.message,
                    hint = ?failure.hint,
                    "Verification failed"
                );
            }
        },

        AppEvent::Provenance(event) => match event {
            ProvenanceEvent::TargetsFetched { package, files } => {
                info!(source, correlation, package = %package, files, "Package contents fetched");
            }
            ProvenanceEvent::AttestationsDecoded { package, aliases } => {
                info!(source, correlation, package = %package, aliases = ?aliases, "Attestations decoded");
            }
            ProvenanceEvent::CommitResolved {
                package,
                commit,
                origin,
            } => {
                info!(
                    source,
                    correlation,
                    package = %package,
                    commit = %commit,
                    origin = %origin,
                    "Source commit resolved"
                );
            }
            ProvenanceEvent::SourcesFetched { url, commit, files } => {
                info!(source, correlation, url = %url, commit = %commit, files, "Repository sources fetched");
            }
            ProvenanceEvent::Failed { package, failure } => {
                error!(
                    source,
                    correlation,
                    package = %package,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    error = %failure.message,
                    "Provenance collection failed"
                );
            }
        },
    }
}
