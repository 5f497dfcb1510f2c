//! Filesystem document store
//!
//! Implements the `DocumentStore` port by writing each upload beneath a root
//! directory. Every blob gets its own `DocumentId` directory, so two uploads
//! with the same file name never collide.
//!
//! References have the form `fs://<document-id>/<file-name>`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, DocumentId, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
use domain_claims::DocumentStore;

const REFERENCE_SCHEME: &str = "fs://";

/// `DocumentStore` backed by a local directory
#[derive(Debug, Clone)]
pub struct FileSystemDocumentStore {
    root: PathBuf,
}

impl FileSystemDocumentStore {
    /// Creates a store rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a reference returned by [`DocumentStore::store`] to its path
    ///
    /// Returns `None` for references this store did not produce.
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let rest = reference.strip_prefix(REFERENCE_SCHEME)?;
        let (id, file_name) = rest.split_once('/')?;
        let id: DocumentId = id.parse().ok()?;
        if file_name.is_empty() || sanitize_file_name(file_name) != file_name {
            return None;
        }
        Some(self.root.join(id.as_uuid().to_string()).join(file_name))
    }

    /// Reads back the content stored under `reference`
    pub async fn read(&self, reference: &str) -> Result<Vec<u8>, PortError> {
        let path = self
            .resolve(reference)
            .ok_or_else(|| PortError::validation_field("unrecognized document reference", "reference"))?;

        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PortError::not_found("Document", reference))
            }
            Err(e) => Err(PortError::internal_with_source("failed to read document", e)),
        }
    }
}

impl DomainPort for FileSystemDocumentStore {}

#[async_trait]
impl HealthCheckable for FileSystemDocumentStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = tokio::fs::create_dir_all(&self.root).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(()) => (AdapterHealth::Healthy, None),
            Err(e) => (
                AdapterHealth::Unhealthy,
                Some(format!("Document directory {} unavailable: {}", self.root.display(), e)),
            ),
        };

        HealthCheckResult {
            adapter_id: "filesystem-document-store".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl DocumentStore for FileSystemDocumentStore {
    #[instrument(skip(self, content), fields(bytes = content.len()))]
    async fn store(&self, content: Vec<u8>, file_name: &str) -> Result<String, PortError> {
        let id = DocumentId::new_v7();
        let file_name = sanitize_file_name(file_name);
        let dir = self.root.join(id.as_uuid().to_string());

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| PortError::internal_with_source("failed to create document directory", e))?;

        // Write to a temporary name first so a reader never sees a partial file
        let path = dir.join(&file_name);
        let partial = dir.join(format!(".{}.partial", file_name));
        if let Err(e) = write_durably(&partial, &content).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(PortError::internal_with_source("failed to write document", e));
        }
        tokio::fs::rename(&partial, &path)
            .await
            .map_err(|e| PortError::internal_with_source("failed to finalize document", e))?;
        sync_dir(&dir)
            .await
            .map_err(|e| PortError::internal_with_source("failed to sync document directory", e))?;

        debug!(path = %path.display(), "Stored document");
        Ok(format!("{}{}/{}", REFERENCE_SCHEME, id.as_uuid(), file_name))
    }
}

/// Writes `content` to `path` and flushes it to disk before returning
async fn write_durably(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(content).await?;
    file.sync_all().await
}

/// Flushes directory entries so a completed rename survives a crash
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Reduces a client-supplied file name to a safe single path component
///
/// Keeps ASCII alphanumerics, `-`, `_` and `.`; everything else becomes `_`.
/// Leading dots are replaced so the result is never hidden or `..`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let mut sanitized: String = base
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.starts_with('.') {
        sanitized.replace_range(..1, "_");
    }
    if sanitized.is_empty() {
        sanitized.push_str("document");
    }
    sanitized
}
