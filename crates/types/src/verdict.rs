//! Per-file verdicts and the verification digest

use crate::{PackageRef, RepoRef};
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confidence that a target file derives from a source file.
///
/// Two scales coexist on the wire: an exact match is reported as the integer
/// sentinel `100`, an approximate match as a similarity ratio in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coherence {
    Exact,
    Similarity(f64),
}

impl Coherence {
    /// Wire value of an exact match
    pub const EXACT_SCORE: u64 = 100;

    #[must_use]
    pub fn is_exact(self) -> bool {
        matches!(self, Self::Exact)
    }

    /// Score on the single `[0, 1]` scale
    #[must_use]
    pub fn ratio(self) -> f64 {
        match self {
            Self::Exact => 1.0,
            Self::Similarity(ratio) => ratio,
        }
    }
}

impl Serialize for Coherence {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Exact => serializer.serialize_u64(Self::EXACT_SCORE),
            Self::Similarity(ratio) => serializer.serialize_f64(*ratio),
        }
    }
}

impl<'de> Deserialize<'de> for Coherence {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        #[allow(clippy::cast_precision_loss)]
        let exact = Self::EXACT_SCORE as f64;
        if (value - exact).abs() < f64::EPSILON {
            Ok(Self::Exact)
        } else if (0.0..=1.0).contains(&value) {
            Ok(Self::Similarity(value))
        } else {
            Err(de::Error::custom(format!(
                "coherence must be 100 or within [0, 1], got {value}"
            )))
        }
    }
}

/// Source file(s) a target was traced to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub matched_paths: Vec<String>,
    pub coherence: Coherence,
}

impl MatchResult {
    #[must_use]
    pub fn exact(paths: Vec<String>) -> Self {
        Self {
            matched_paths: paths,
            coherence: Coherence::Exact,
        }
    }

    #[must_use]
    pub fn approximate(path: String, ratio: f64) -> Self {
        Self {
            matched_paths: vec![path],
            coherence: Coherence::Similarity(ratio),
        }
    }
}

/// Sourcemap claimed alongside a target file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcemapInfo {
    /// The map's `sources`, rewritten under the package root
    pub declared_sources: Vec<String>,
    pub valid: bool,
    pub coherence: Option<f64>,
}

/// Verdict for one target file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileVerdict {
    pub source: Option<MatchResult>,
    pub sourcemap: Option<SourcemapInfo>,
}

/// Verdicts keyed by target path, in target key order
pub type DigestEntries = BTreeMap<String, FileVerdict>;

/// Run metadata supplied by the collaborators that produced the inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigestMeta {
    pub package_ref: PackageRef,
    pub repo_ref: RepoRef,
}

/// Complete verification output for one package version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    pub entries: DigestEntries,
    pub meta: DigestMeta,
}

impl Digest {
    #[must_use]
    pub fn summary(&self) -> VerificationSummary {
        VerificationSummary::from_entries(&self.entries)
    }
}

/// Aggregate counts over a set of verdicts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub files: usize,
    pub exact: usize,
    pub approximate: usize,
    pub unmatched: usize,
    pub sourcemaps: usize,
    pub invalid_sourcemaps: usize,
}

impl VerificationSummary {
    #[must_use]
    pub fn from_entries(entries: &DigestEntries) -> Self {
        entries.values().fold(Self::default(), |mut acc, verdict| {
            acc.files += 1;
            match &verdict.source {
                Some(m) if m.coherence.is_exact() => acc.exact += 1,
                Some(_) => acc.approximate += 1,
                None => acc.unmatched += 1,
            }
            if let Some(map) = &verdict.sourcemap {
                acc.sourcemaps += 1;
                if !map.valid {
                    acc.invalid_sourcemaps += 1;
                }
            }
            acc
        })
    }
}
