//! Matching a single target file against the repository sources

use crate::similarity::similarity;
use crumbs_hash::{ContentIndex, HashAlgorithm};
use crumbs_types::{FileSet, MatchResult, PackageRoot};

/// Traces one target to a source: identical content first, then the file at
/// the same root-relative position, scored by similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMatcher {
    all_exact: bool,
}

impl FileMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report every byte-identical source instead of only the first
    #[must_use]
    pub fn with_all_exact_matches(mut self, all_exact: bool) -> Self {
        self.all_exact = all_exact;
        self
    }

    /// `index` must have been built over `sources`.
    #[must_use]
    pub fn match_file(
        &self,
        target_path: &str,
        target_content: &str,
        sources: &FileSet,
        index: &ContentIndex<'_>,
        root: &PackageRoot,
    ) -> Option<MatchResult> {
        if let Some(paths) = self.exact_paths(target_path, target_content, sources, index) {
            return Some(MatchResult::exact(paths));
        }

        let candidate = root.join(target_path);
        sources.get(&candidate).map(|content| {
            let ratio = similarity(target_content, content);
            MatchResult::approximate(candidate, ratio)
        })
    }

    fn exact_paths(
        &self,
        target_path: &str,
        target_content: &str,
        sources: &FileSet,
        index: &ContentIndex<'_>,
    ) -> Option<Vec<String>> {
        let same_path = sources
            .get(target_path)
            .is_some_and(|content| content == target_content);

        if !self.all_exact {
            if same_path {
                return Some(vec![target_path.to_string()]);
            }
            return index.first(target_content).map(|p| vec![p.to_string()]);
        }

        let mut paths: Vec<String> = Vec::new();
        if same_path {
            paths.push(target_path.to_string());
        }
        paths.extend(
            index
                .lookup(target_content)
                .into_iter()
                .filter(|p| *p != target_path)
                .map(str::to_string),
        );
        (!paths.is_empty()).then_some(paths)
    }
}

/// Match one target with default settings, indexing `sources` on the spot.
#[must_use]
pub fn match_file(
    target_path: &str,
    target_content: &str,
    sources: &FileSet,
    root: &PackageRoot,
) -> Option<MatchResult> {
    let index = ContentIndex::build(sources, HashAlgorithm::default());
    FileMatcher::new().match_file(target_path, target_content, sources, &index, root)
}
