use serde::{Deserialize, Serialize};

use super::FailureContext;

/// Events emitted while gathering the inputs of a verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProvenanceEvent {
    TargetsFetched {
        package: String,
        files: usize,
    },

    AttestationsDecoded {
        package: String,
        aliases: Vec<String>,
    },

    /// `origin` names where the commit came from (`attestation`, `manifest`
    /// or `default`).
    CommitResolved {
        package: String,
        commit: String,
        origin: String,
    },

    SourcesFetched {
        url: String,
        commit: String,
        files: usize,
    },

    Failed {
        package: String,
        failure: FailureContext,
    },
}
