#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for crumbs
//!
//! This crate provides the data model shared by the matcher and its
//! collaborators: file sets, the resolved package root, per-file verdicts
//! and the digest handed to auditors.

pub mod fileset;
pub mod path;
pub mod refs;
pub mod verdict;

pub use fileset::{FileSet, PackageRoot};
pub use refs::{PackageRef, RepoRef};
pub use verdict::{
    Coherence, Digest, DigestEntries, DigestMeta, FileVerdict, MatchResult, SourcemapInfo,
    VerificationSummary,
};
