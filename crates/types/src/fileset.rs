//! File sets and the package root

use crate::path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Relative `/`-separated path to full text content.
///
/// Iteration follows the natural key order, which every matching step
/// relies on for deterministic tie-breaks.
pub type FileSet = BTreeMap<String, String>;

/// Directory inside the repository under which the package lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageRoot(String);

impl PackageRoot {
    /// Root for a path that is already a directory; it is normalized so the
    /// root itself can never point above the repository.
    #[must_use]
    pub fn new(dir: &str) -> Self {
        Self(path::normalize(dir))
    }

    /// The repository root itself (`.`)
    #[must_use]
    pub fn repository() -> Self {
        Self(".".to_string())
    }

    /// Root derived from the location of a package manifest
    #[must_use]
    pub fn from_manifest_path(manifest: &str) -> Self {
        Self::new(&path::dirname(manifest))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_repository_root(&self) -> bool {
        self.0 == "."
    }

    /// Resolve `relative` inside this root. Traversal segments are clamped
    /// at the root so the result always stays within it.
    #[must_use]
    pub fn join(&self, relative: &str) -> String {
        path::join_rooted(&self.0, relative)
    }
}

impl Default for PackageRoot {
    fn default() -> Self {
        Self::repository()
    }
}

impl fmt::Display for PackageRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
