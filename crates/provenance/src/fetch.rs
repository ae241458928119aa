//! Collaborators that materialize the inputs of a verification run

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use crumbs_errors::{Error, FetchError};
use crumbs_types::{FileSet, PackageRef, RepoRef};
use walkdir::{DirEntry, WalkDir};

use crate::attestation::AttestationBundles;
use crate::packument::Packument;

/// Supplies the version document of a package
#[async_trait]
pub trait PackumentFetcher: Send + Sync {
    async fn fetch_packument(&self, package: &PackageRef) -> Result<Packument, Error>;
}

/// Supplies the published files, keyed relative to the package root
#[async_trait]
pub trait PackageFetcher: Send + Sync {
    async fn fetch_package(&self, package: &PackageRef) -> Result<FileSet, Error>;
}

/// Supplies the repository files at `repo.commit()`, keyed relative to the
/// repository root. `repo.url` is already normalized to `git@host:path`.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch_sources(&self, repo: &RepoRef) -> Result<FileSet, Error>;
}

/// Supplies raw attestation bundles; `None` when the version has none
#[async_trait]
pub trait AttestationFetcher: Send + Sync {
    async fn fetch_attestations(
        &self,
        package: &PackageRef,
    ) -> Result<Option<AttestationBundles>, Error>;
}

/// A directory already extracted or checked out on disk
#[derive(Debug, Clone)]
pub struct LocalTree {
    root: PathBuf,
}

impl LocalTree {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl PackageFetcher for LocalTree {
    async fn fetch_package(&self, _package: &PackageRef) -> Result<FileSet, Error> {
        read_tree(&self.root).await
    }
}

#[async_trait]
impl SourceFetcher for LocalTree {
    async fn fetch_sources(&self, _repo: &RepoRef) -> Result<FileSet, Error> {
        read_tree(&self.root).await
    }
}

/// Read every regular file under `root` into a file set.
///
/// Hidden entries (names starting with `.`) and symlinks are skipped.
///
/// # Errors
/// Fails on I/O errors and on files that are not UTF-8 text.
pub async fn read_tree(root: &Path) -> Result<FileSet, Error> {
    let root = root.to_path_buf();
    tokio::task::spawn_blocking(move || walk_tree(&root))
        .await
        .map_err(|e| Error::internal(format!("file tree walk failed: {e}")))?
}

fn walk_tree(root: &Path) -> Result<FileSet, Error> {
    let mut files = FileSet::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(walk_error)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let key = relative_key(root, path)?;
        let bytes =
            std::fs::read(path).map_err(|e| Error::io_with_path(&e, path.display().to_string()))?;
        let content = String::from_utf8(bytes)
            .map_err(|_| FetchError::NonUtf8Content { path: key.clone() })?;
        files.insert(key, content);
    }

    tracing::debug!(root = %root.display(), files = files.len(), "read file tree");
    Ok(files)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn walk_error(err: walkdir::Error) -> Error {
    let path = err.path().map(|p| p.display().to_string());
    let io = std::io::Error::from(err);
    match path {
        Some(path) => Error::io_with_path(&io, path),
        None => Error::from(io),
    }
}

fn relative_key(root: &Path, path: &Path) -> Result<String, Error> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| Error::internal(format!("{} escapes {}", path.display(), root.display())))?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
