//! Choosing which source commit to verify against

use crate::attestation::Attestations;
use crate::packument::Packument;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Revision checked out when nothing records a commit
pub const DEFAULT_COMMIT: &str = "HEAD";

/// Where the verified commit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOrigin {
    /// Recorded by a signed provenance attestation
    Attestation,
    /// Recorded by the publishing client in the version document
    Manifest,
    Default,
}

impl CommitOrigin {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attestation => "attestation",
            Self::Manifest => "manifest",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for CommitOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCommit {
    pub commit: String,
    pub origin: CommitOrigin,
}

impl ResolvedCommit {
    /// Commit to pin the repository reference to, `None` for the default
    #[must_use]
    pub fn pinned(&self) -> Option<&str> {
        (self.origin != CommitOrigin::Default).then_some(self.commit.as_str())
    }
}

/// Prefer the attested commit over `gitHead`, and `gitHead` over `HEAD`.
#[must_use]
pub fn resolve_source_commit(
    attestations: Option<&Attestations>,
    packument: &Packument,
) -> ResolvedCommit {
    let attested = attestations
        .and_then(Attestations::provenance)
        .and_then(|provenance| provenance.source_commit());
    if let Some(commit) = attested {
        return ResolvedCommit {
            commit: commit.to_string(),
            origin: CommitOrigin::Attestation,
        };
    }

    match packument.git_head.as_deref().filter(|h| !h.is_empty()) {
        Some(head) => ResolvedCommit {
            commit: head.to_string(),
            origin: CommitOrigin::Manifest,
        },
        None => ResolvedCommit {
            commit: DEFAULT_COMMIT.to_string(),
            origin: CommitOrigin::Default,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attestation::{AttestationBundles, Bundle, DsseEnvelope, RawAttestation};
    use crate::attestation::{IN_TOTO_PAYLOAD_TYPE, SLSA_PROVENANCE_V02};
    use base64::Engine as _;
    use serde_json::json;

    fn packument(git_head: Option<&str>) -> Packument {
        Packument {
            name: "p".to_string(),
            version: "1.0.0".to_string(),
            git_head: git_head.map(str::to_string),
            repository: None,
            exports: None,
        }
    }

    fn attested(commit: &str) -> Attestations {
        let statement = json!({
            "predicateType": SLSA_PROVENANCE_V02,
            "predicate": { "invocation": { "configSource": { "digest": { "sha1": commit } } } }
        });
        let bundles = AttestationBundles {
            attestations: vec![RawAttestation {
                predicate_type: SLSA_PROVENANCE_V02.to_string(),
                bundle: Bundle {
                    media_type: None,
                    verification_material: None,
                    dsse_envelope: DsseEnvelope {
                        payload: base64::engine::general_purpose::STANDARD
                            .encode(statement.to_string()),
                        payload_type: IN_TOTO_PAYLOAD_TYPE.to_string(),
                        signatures: vec![],
                    },
                },
            }],
        };
        Attestations::decode(&bundles).unwrap()
    }

    #[test]
    fn attestation_wins_over_git_head() {
        let resolved = resolve_source_commit(Some(&attested("aaa")), &packument(Some("bbb")));
        assert_eq!(resolved.commit, "aaa");
        assert_eq!(resolved.origin, CommitOrigin::Attestation);
        assert_eq!(resolved.pinned(), Some("aaa"));
    }

    #[test]
    fn git_head_used_without_attestation() {
        let resolved = resolve_source_commit(None, &packument(Some("bbb")));
        assert_eq!(resolved.origin, CommitOrigin::Manifest);
        assert_eq!(resolved.commit, "bbb");

        let empty = Attestations::default();
        let resolved = resolve_source_commit(Some(&empty), &packument(Some("bbb")));
        assert_eq!(resolved.origin, CommitOrigin::Manifest);
    }

    #[test]
    fn defaults_to_head() {
        let resolved = resolve_source_commit(None, &packument(Some("")));
        assert_eq!(resolved.commit, DEFAULT_COMMIT);
        assert_eq!(resolved.origin.to_string(), "default");
        assert!(resolved.pinned().is_none());
    }
}
