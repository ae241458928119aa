//! Content-addressed lookup over a file set

use crate::{Hash, HashAlgorithm};
use crumbs_types::FileSet;
use std::collections::HashMap;

/// Maps content hashes to the paths holding that content.
///
/// Paths under one hash keep the file set's key order, so the first entry of
/// a lookup is the first byte-identical file in key order.
#[derive(Debug)]
pub struct ContentIndex<'a> {
    files: &'a FileSet,
    algorithm: HashAlgorithm,
    by_hash: HashMap<Hash, Vec<&'a str>>,
}

impl<'a> ContentIndex<'a> {
    #[must_use]
    pub fn build(files: &'a FileSet, algorithm: HashAlgorithm) -> Self {
        let mut by_hash: HashMap<Hash, Vec<&'a str>> = HashMap::with_capacity(files.len());
        for (path, content) in files {
            by_hash
                .entry(Hash::from_data_with_algorithm(content.as_bytes(), algorithm))
                .or_default()
                .push(path.as_str());
        }
        Self {
            files,
            algorithm,
            by_hash,
        }
    }

    /// Every path whose content is byte-identical to `content`, in key order.
    ///
    /// Hash hits are confirmed against the stored content.
    #[must_use]
    pub fn lookup(&self, content: &str) -> Vec<&'a str> {
        let hash = Hash::from_data_with_algorithm(content.as_bytes(), self.algorithm);
        self.by_hash
            .get(&hash)
            .map(|paths| {
                paths
                    .iter()
                    .copied()
                    .filter(|path| self.files.get(*path).is_some_and(|c| c == content))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First path in key order holding exactly `content`
    #[must_use]
    pub fn first(&self, content: &str) -> Option<&'a str> {
        self.lookup(content).into_iter().next()
    }
}
