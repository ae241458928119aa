//! End-to-end verification of a published package version

use std::sync::Arc;

use crumbs_config::Config;
use crumbs_errors::Error;
use crumbs_events::{EventEmitter, EventSender, FailureContext, ProvenanceEvent};
use crumbs_matcher::VerificationEngine;
use crumbs_types::refs::DEFAULT_REGISTRY;
use crumbs_types::{Digest, PackageRef, RepoRef};
use serde::{Deserialize, Serialize};

use crate::attestation::Attestations;
use crate::commit::{resolve_source_commit, ResolvedCommit};
use crate::fetch::{AttestationFetcher, PackageFetcher, PackumentFetcher, SourceFetcher};
use crate::registry::normalize_repo_url;

/// Everything learned while auditing one package version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub digest: Digest,
    pub attestations: Attestations,
    pub commit: ResolvedCommit,
}

/// Gathers targets, attestations and sources through its collaborators and
/// runs the verification engine over them.
pub struct Auditor {
    packuments: Arc<dyn PackumentFetcher>,
    packages: Arc<dyn PackageFetcher>,
    sources: Arc<dyn SourceFetcher>,
    attestations: Option<Arc<dyn AttestationFetcher>>,
    engine: VerificationEngine,
    registry: String,
    tx: Option<EventSender>,
}

impl Auditor {
    #[must_use]
    pub fn new(
        packuments: Arc<dyn PackumentFetcher>,
        packages: Arc<dyn PackageFetcher>,
        sources: Arc<dyn SourceFetcher>,
    ) -> Self {
        Self {
            packuments,
            packages,
            sources,
            attestations: None,
            engine: VerificationEngine::default(),
            registry: DEFAULT_REGISTRY.to_string(),
            tx: None,
        }
    }

    #[must_use]
    pub fn with_attestations(mut self, fetcher: Arc<dyn AttestationFetcher>) -> Self {
        self.attestations = Some(fetcher);
        self
    }

    /// Apply matching, engine and registry settings
    #[must_use]
    pub fn with_config(mut self, config: &Config) -> Self {
        self.engine = VerificationEngine::new(config);
        if let Some(tx) = &self.tx {
            self.engine = self.engine.with_event_sender(tx.clone());
        }
        self.registry.clone_from(&config.registry.url);
        self
    }

    #[must_use]
    pub fn with_engine(mut self, engine: VerificationEngine) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.engine = self.engine.with_event_sender(tx.clone());
        self.tx = Some(tx);
        self
    }

    /// Reference to `name@version` on the configured registry
    #[must_use]
    pub fn package_ref(&self, name: &str, version: &str) -> PackageRef {
        PackageRef::new(name, version).with_registry(self.registry.clone())
    }

    /// Verify a package version and return its digest.
    ///
    /// # Errors
    /// See [`Auditor::audit`].
    pub async fn verify_package(&self, package: &PackageRef) -> Result<Digest, Error> {
        self.audit(package).await.map(|report| report.digest)
    }

    /// Verify a package version, keeping the decoded attestations and the
    /// commit decision alongside the digest.
    ///
    /// # Errors
    /// Fails when a collaborator fails, when attestations cannot be decoded,
    /// when the package declares no usable repository, or when the engine
    /// rejects the inputs.
    pub async fn audit(&self, package: &PackageRef) -> Result<AuditReport, Error> {
        let result = self.run(package).await;
        if let Err(err) = &result {
            self.emit_provenance(ProvenanceEvent::Failed {
                package: package.to_string(),
                failure: FailureContext::from_error(err),
            });
        }
        result
    }

    async fn run(&self, package: &PackageRef) -> Result<AuditReport, Error> {
        let packument = self.packuments.fetch_packument(package).await?;
        let targets = self.packages.fetch_package(package).await?;
        self.emit_provenance(ProvenanceEvent::TargetsFetched {
            package: package.to_string(),
            files: targets.len(),
        });

        let attestations = self.fetch_attestations(package).await?;
        let commit = resolve_source_commit(Some(&attestations), &packument);
        self.emit_provenance(ProvenanceEvent::CommitResolved {
            package: package.to_string(),
            commit: commit.commit.clone(),
            origin: commit.origin.to_string(),
        });

        let mut repo_ref = packument.repo_ref()?;
        if let Some(pinned) = commit.pinned() {
            repo_ref = repo_ref.at_commit(pinned);
        }
        // The digest keeps the declared URL; the fetcher clones the normalized one.
        let checkout = RepoRef {
            url: normalize_repo_url(&repo_ref.url)?,
            ..repo_ref.clone()
        };
        let sources = self.sources.fetch_sources(&checkout).await?;
        self.emit_provenance(ProvenanceEvent::SourcesFetched {
            url: checkout.url,
            commit: repo_ref.commit().to_string(),
            files: sources.len(),
        });

        let engine = self.engine.clone();
        let package_ref = package.clone();
        let digest = tokio::task::spawn_blocking(move || {
            engine.verify_digest(package_ref, repo_ref, &targets, &sources)
        })
        .await
        .map_err(|e| Error::internal(format!("verification task failed: {e}")))??;

        Ok(AuditReport {
            digest,
            attestations,
            commit,
        })
    }

    async fn fetch_attestations(&self, package: &PackageRef) -> Result<Attestations, Error> {
        let Some(fetcher) = &self.attestations else {
            return Ok(Attestations::default());
        };
        let Some(bundles) = fetcher.fetch_attestations(package).await? else {
            self.emit_debug(format!("{package} publishes no attestations"));
            return Ok(Attestations::default());
        };

        let decoded = Attestations::decode(&bundles)?;
        self.emit_provenance(ProvenanceEvent::AttestationsDecoded {
            package: package.to_string(),
            aliases: decoded.aliases(),
        });
        Ok(decoded)
    }
}

impl EventEmitter for Auditor {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl std::fmt::Debug for Auditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auditor")
            .field("engine", &self.engine)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
