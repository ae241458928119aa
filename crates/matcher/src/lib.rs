#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Verification and matching for crumbs
//!
//! Given the files published for a package version and the files of the
//! repository it claims to come from, this crate resolves where the package
//! lives in the repository, traces every published file to a source file and
//! checks companion sourcemaps against the sources they declare.

mod coherence;
mod engine;
mod file_match;
mod root;
mod similarity;
mod sourcemap_match;

pub use coherence::{BundleCoherence, Unscored};
pub use engine::{verify, VerificationEngine};
pub use file_match::{match_file, FileMatcher};
pub use root::{resolve_root, RootResolution, RootResolver};
pub use similarity::{common_length, similarity};
pub use sourcemap_match::{match_sourcemap, SourcemapMatch, SourcemapMatcher, MAP_SUFFIX};
