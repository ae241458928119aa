use serde::{Deserialize, Serialize};

use super::FailureContext;
use crumbs_types::VerificationSummary;

/// How a single target file was traced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchOutcome {
    Exact { paths: Vec<String> },
    Approximate { path: String, coherence: f64 },
    Unmatched,
}

/// Events emitted by the matching engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerifyEvent {
    Started {
        package: String,
        targets: usize,
        sources: usize,
    },

    /// `manifest` is `None` when no manifest declared the package and the
    /// default root was used.
    RootResolved {
        package: String,
        root: String,
        manifest: Option<String>,
    },

    FileMatched {
        path: String,
        outcome: MatchOutcome,
    },

    SourcemapRejected {
        path: String,
        reason: String,
    },

    Completed {
        package: String,
        summary: VerificationSummary,
        duration_ms: u64,
    },

    Failed {
        package: String,
        failure: FailureContext,
    },
}
