#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Provenance collaborators for crumbs
//!
//! The matching engine only ever sees in-memory file sets. This crate sits
//! in front of it: it knows the registry endpoints, decodes attestation
//! bundles into typed claims, picks the source commit to check out, and
//! drives pluggable fetchers to build the engine's inputs.

mod attestation;
mod auditor;
mod commit;
mod fetch;
mod packument;
mod registry;

pub use attestation::{
    decode_attestation, predicate_alias, Attestation, AttestationBundles, Attestations, Bundle,
    DsseEnvelope, RawAttestation, Signature, SourceClaim, Statement, Subject,
    IN_TOTO_PAYLOAD_TYPE, NPM_PUBLISH_V01, SLSA_PROVENANCE_V02, SLSA_PROVENANCE_V1,
};
pub use auditor::{AuditReport, Auditor};
pub use commit::{resolve_source_commit, CommitOrigin, ResolvedCommit, DEFAULT_COMMIT};
pub use fetch::{
    read_tree, AttestationFetcher, LocalTree, PackageFetcher, PackumentFetcher, SourceFetcher,
};
pub use packument::{entry_points, Packument, Repository};
pub use registry::{
    attestations_url, normalize_repo_url, packument_url, tarball_url, unscoped_name,
};
