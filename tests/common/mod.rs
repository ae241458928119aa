//! Shared fixtures for the integration tests
//!
//! In-memory collaborators stand in for the registry and the repository so
//! whole verification runs execute without network or git.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::Engine as _;
use crumbs_errors::{Error, FetchError};
use crumbs_events::{AppEvent, EventReceiver};
use crumbs_provenance::{
    AttestationBundles, AttestationFetcher, Bundle, DsseEnvelope, PackageFetcher, Packument,
    PackumentFetcher, RawAttestation, SourceFetcher, IN_TOTO_PAYLOAD_TYPE,
};
use crumbs_types::{FileSet, PackageRef, RepoRef};
use serde_json::Value;

pub fn files(entries: &[(&str, &str)]) -> FileSet {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Drain everything emitted so far
pub fn collect_events(rx: &mut EventReceiver) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Ok(message) = rx.try_recv() {
        events.push(message.event);
    }
    events
}

pub fn attestation(predicate_type: &str, predicate: &Value) -> RawAttestation {
    let statement = serde_json::json!({
        "_type": "https://in-toto.io/Statement/v0.1",
        "subject": [],
        "predicateType": predicate_type,
        "predicate": predicate,
    });
    RawAttestation {
        predicate_type: predicate_type.to_string(),
        bundle: Bundle {
            media_type: Some("application/vnd.dev.sigstore.bundle+json;version=0.1".to_string()),
            verification_material: None,
            dsse_envelope: DsseEnvelope {
                payload: base64::engine::general_purpose::STANDARD.encode(statement.to_string()),
                payload_type: IN_TOTO_PAYLOAD_TYPE.to_string(),
                signatures: vec![],
            },
        },
    }
}

/// One published version held in memory
#[derive(Clone)]
pub struct PublishedVersion {
    pub packument: Packument,
    pub files: FileSet,
    pub attestations: Option<AttestationBundles>,
}

#[derive(Default)]
pub struct FakeRegistry {
    versions: HashMap<String, PublishedVersion>,
}

impl FakeRegistry {
    pub fn publish(mut self, version: PublishedVersion) -> Self {
        let key = format!("{}@{}", version.packument.name, version.packument.version);
        self.versions.insert(key, version);
        self
    }

    fn lookup(&self, package: &PackageRef) -> Result<&PublishedVersion, Error> {
        self.versions.get(&package.to_string()).ok_or_else(|| {
            FetchError::PackageNotFound {
                name: package.name.clone(),
                version: package.version.clone(),
            }
            .into()
        })
    }
}

#[async_trait]
impl PackumentFetcher for FakeRegistry {
    async fn fetch_packument(&self, package: &PackageRef) -> Result<Packument, Error> {
        Ok(self.lookup(package)?.packument.clone())
    }
}

#[async_trait]
impl PackageFetcher for FakeRegistry {
    async fn fetch_package(&self, package: &PackageRef) -> Result<FileSet, Error> {
        Ok(self.lookup(package)?.files.clone())
    }
}

#[async_trait]
impl AttestationFetcher for FakeRegistry {
    async fn fetch_attestations(
        &self,
        package: &PackageRef,
    ) -> Result<Option<AttestationBundles>, Error> {
        Ok(self.lookup(package)?.attestations.clone())
    }
}

/// Repository snapshots keyed by commit; records every checkout
#[derive(Default)]
pub struct FakeRepository {
    commits: HashMap<String, FileSet>,
    checkouts: Mutex<Vec<String>>,
    clone_urls: Mutex<Vec<String>>,
}

impl FakeRepository {
    pub fn with_commit(mut self, commit: &str, files: FileSet) -> Self {
        self.commits.insert(commit.to_string(), files);
        self
    }

    pub fn checkouts(&self) -> Vec<String> {
        self.checkouts
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn clone_urls(&self) -> Vec<String> {
        self.clone_urls
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SourceFetcher for FakeRepository {
    async fn fetch_sources(&self, repo: &RepoRef) -> Result<FileSet, Error> {
        let commit = repo.commit().to_string();
        if let Ok(mut log) = self.checkouts.lock() {
            log.push(commit.clone());
        }
        if let Ok(mut log) = self.clone_urls.lock() {
            log.push(repo.url.clone());
        }
        self.commits.get(&commit).cloned().ok_or_else(|| {
            FetchError::CheckoutFailed {
                url: repo.url.clone(),
                commit,
                message: "unknown revision".to_string(),
            }
            .into()
        })
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
