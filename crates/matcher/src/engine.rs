//! Verification engine: resolves the root once and builds a verdict for
//! every published file

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::coherence::BundleCoherence;
use crate::file_match::FileMatcher;
use crate::root::{RootResolution, RootResolver};
use crate::sourcemap_match::{SourcemapMatch, SourcemapMatcher};
use crumbs_config::Config;
use crumbs_errors::{Error, SourcemapError, VerifyError};
use crumbs_events::{EventEmitter, EventSender, FailureContext, MatchOutcome, VerifyEvent};
use crumbs_hash::{ContentIndex, HashAlgorithm};
use crumbs_sourcemap::SourcemapValidator;
use crumbs_types::{
    Digest, DigestEntries, DigestMeta, FileSet, FileVerdict, MatchResult, PackageRef,
    PackageRoot, RepoRef, VerificationSummary,
};

/// Orchestrates root resolution, file matching and sourcemap matching.
///
/// The engine keeps no state between runs; one instance can verify any
/// number of packages, concurrently if needed.
#[derive(Debug, Clone)]
pub struct VerificationEngine {
    resolver: RootResolver,
    strict_root: bool,
    file_matcher: FileMatcher,
    sourcemap_matcher: SourcemapMatcher,
    hash_algorithm: HashAlgorithm,
    parallel: bool,
    parallel_threshold: usize,
    tx: Option<EventSender>,
}

type FileOutcome = Result<(FileVerdict, Option<SourcemapError>), VerifyError>;

impl VerificationEngine {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            resolver: RootResolver::new(
                config.matching.manifest_file.clone(),
                &config.matching.default_root,
            ),
            strict_root: config.matching.strict_root,
            file_matcher: FileMatcher::new()
                .with_all_exact_matches(config.matching.all_exact_matches),
            sourcemap_matcher: SourcemapMatcher::new(),
            hash_algorithm: config.matching.hash_algorithm,
            parallel: config.engine.parallel,
            parallel_threshold: config.engine.parallel_threshold,
            tx: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn SourcemapValidator>) -> Self {
        self.sourcemap_matcher = self.sourcemap_matcher.with_validator(validator);
        self
    }

    #[must_use]
    pub fn with_coherence(mut self, coherence: Arc<dyn BundleCoherence>) -> Self {
        self.sourcemap_matcher = self.sourcemap_matcher.with_coherence(coherence);
        self
    }

    /// Resolve the package root the way a run would.
    ///
    /// # Errors
    /// Returns `VerifyError::RootNotFound` in strict mode when no manifest
    /// declares the package.
    pub fn resolve_root(
        &self,
        sources: &FileSet,
        package_name: &str,
    ) -> Result<RootResolution, VerifyError> {
        if self.strict_root {
            self.resolver.resolve_strict(sources, package_name)
        } else {
            Ok(self.resolver.resolve(sources, package_name))
        }
    }

    /// Build a verdict for every target, keyed by target path.
    ///
    /// # Errors
    /// Fails when a published sourcemap is malformed, or in strict mode when
    /// the package root cannot be resolved. No partial result is returned.
    pub fn verify(
        &self,
        package_name: &str,
        targets: &FileSet,
        sources: &FileSet,
    ) -> Result<DigestEntries, Error> {
        let start = Instant::now();
        self.emit_verify(VerifyEvent::Started {
            package: package_name.to_string(),
            targets: targets.len(),
            sources: sources.len(),
        });

        let resolution = match self.resolve_root(sources, package_name) {
            Ok(resolution) => resolution,
            Err(err) => return Err(self.fail(package_name, err)),
        };
        self.emit_verify(VerifyEvent::RootResolved {
            package: package_name.to_string(),
            root: resolution.root.to_string(),
            manifest: resolution.manifest.clone(),
        });
        if resolution.is_fallback() {
            self.emit_warning(format!(
                "no {} declares {package_name}; matching relative to {}",
                self.resolver.manifest_file(),
                resolution.root
            ));
        }

        let index = ContentIndex::build(sources, self.hash_algorithm);
        let work: Vec<(&String, &String)> = targets.iter().collect();
        let verdict_for = |(path, content): &(&String, &String)| {
            self.verdict(path, content, targets, sources, &index, &resolution.root)
        };
        let outcomes: Vec<FileOutcome> =
            if self.parallel && work.len() >= self.parallel_threshold {
                work.par_iter().map(verdict_for).collect()
            } else {
                work.iter().map(verdict_for).collect()
            };

        let mut entries = DigestEntries::new();
        for ((path, _), outcome) in work.into_iter().zip(outcomes) {
            let (verdict, rejection) = match outcome {
                Ok(done) => done,
                Err(err) => return Err(self.fail(package_name, err)),
            };

            self.emit_verify(VerifyEvent::FileMatched {
                path: path.clone(),
                outcome: outcome_of(verdict.source.as_ref()),
            });
            if let Some(reason) = rejection {
                self.emit_verify(VerifyEvent::SourcemapRejected {
                    path: path.clone(),
                    reason: reason.to_string(),
                });
            }
            entries.insert(path.clone(), verdict);
        }

        self.emit_verify(VerifyEvent::Completed {
            package: package_name.to_string(),
            summary: VerificationSummary::from_entries(&entries),
            duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        });
        Ok(entries)
    }

    /// Verify and wrap the entries with the run metadata supplied by the
    /// collaborators that produced the inputs.
    ///
    /// # Errors
    /// See [`VerificationEngine::verify`].
    pub fn verify_digest(
        &self,
        package_ref: PackageRef,
        repo_ref: RepoRef,
        targets: &FileSet,
        sources: &FileSet,
    ) -> Result<Digest, Error> {
        let entries = self.verify(&package_ref.name, targets, sources)?;
        Ok(Digest {
            entries,
            meta: DigestMeta {
                package_ref,
                repo_ref,
            },
        })
    }

    fn verdict(
        &self,
        path: &str,
        content: &str,
        targets: &FileSet,
        sources: &FileSet,
        index: &ContentIndex<'_>,
        root: &PackageRoot,
    ) -> FileOutcome {
        let source = self
            .file_matcher
            .match_file(path, content, sources, index, root);
        let sourcemap = self
            .sourcemap_matcher
            .match_sourcemap(path, targets, sources, root)?;
        let (sourcemap, rejection) = match sourcemap {
            Some(SourcemapMatch { info, rejection }) => (Some(info), rejection),
            None => (None, None),
        };
        Ok((FileVerdict { source, sourcemap }, rejection))
    }

    fn fail(&self, package_name: &str, err: VerifyError) -> Error {
        self.emit_verify(VerifyEvent::Failed {
            package: package_name.to_string(),
            failure: FailureContext::from_error(&err),
        });
        err.into()
    }
}

impl Default for VerificationEngine {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl EventEmitter for VerificationEngine {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

fn outcome_of(result: Option<&MatchResult>) -> MatchOutcome {
    match result {
        None => MatchOutcome::Unmatched,
        Some(m) if m.coherence.is_exact() => MatchOutcome::Exact {
            paths: m.matched_paths.clone(),
        },
        Some(m) => MatchOutcome::Approximate {
            path: m.matched_paths.first().cloned().unwrap_or_default(),
            coherence: m.coherence.ratio(),
        },
    }
}

/// Verify with the default configuration.
///
/// # Errors
/// See [`VerificationEngine::verify`].
pub fn verify(
    package_name: &str,
    targets: &FileSet,
    sources: &FileSet,
) -> Result<DigestEntries, Error> {
    VerificationEngine::default().verify(package_name, targets, sources)
}
