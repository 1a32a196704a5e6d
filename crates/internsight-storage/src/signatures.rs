//! Signature file staging.
//!
//! A captured signature arrives as a base64 PNG payload (with or without a
//! `data:image/...;base64,` prefix) and is materialized to a private file
//! before it can be attached to the multipart upload. Staged files belong to
//! the reporting session and are swept when it ends.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use internsight_core::ReportError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Asset staging errors
#[derive(Debug, Error)]
pub enum AssetStoreError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid signature payload: {0}")]
    InvalidPayload(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type AssetStoreResult<T> = Result<T, AssetStoreError>;

impl From<AssetStoreError> for ReportError {
    fn from(err: AssetStoreError) -> Self {
        ReportError::Asset(err.to_string())
    }
}

/// Staging area for signature PNGs under a private app-scoped root.
#[derive(Debug, Clone)]
pub struct SignatureStore {
    staging_dir: PathBuf,
}

impl SignatureStore {
    /// Point the store at `<root>/internsight/assets/tanda_tangan/`.
    /// Nothing is created until the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let staging_dir = root
            .into()
            .join("internsight")
            .join("assets")
            .join("tanda_tangan");
        Self { staging_dir }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Create the staging directory tree, parents included. Idempotent.
    pub async fn ensure_dirs(&self) -> AssetStoreResult<()> {
        fs::create_dir_all(&self.staging_dir).await.map_err(|e| {
            AssetStoreError::WriteFailed(format!(
                "Failed to create staging directory {}: {}",
                self.staging_dir.display(),
                e
            ))
        })?;
        tracing::debug!(dir = %self.staging_dir.display(), "Signature staging directory ready");
        Ok(())
    }

    /// Decode a base64 signature payload and write it to a uniquely named
    /// file in the staging directory. Returns the file path.
    pub async fn stage(&self, base64_payload: &str) -> AssetStoreResult<PathBuf> {
        self.ensure_dirs().await?;

        let data = decode_payload(base64_payload)?;
        let path = self.next_signature_path().await;

        fs::write(&path, &data).await.map_err(|e| {
            AssetStoreError::WriteFailed(format!(
                "Failed to write signature {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = data.len(),
            "Signature staged"
        );

        Ok(path)
    }

    /// Generate `signature_<timestamp>.png`, bumping a counter suffix on the
    /// rare collision within the same millisecond.
    async fn next_signature_path(&self) -> PathBuf {
        let millis = chrono::Utc::now().timestamp_millis();
        let mut path = self.staging_dir.join(format!("signature_{}.png", millis));
        let mut bump = 0u32;
        while fs::try_exists(&path).await.unwrap_or(false) {
            bump += 1;
            path = self
                .staging_dir
                .join(format!("signature_{}_{}.png", millis, bump));
        }
        path
    }

    pub async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    /// Delete a staged file. Missing files are not an error.
    pub async fn remove(&self, path: &Path) -> AssetStoreResult<()> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(());
        }
        fs::remove_file(path).await.map_err(|e| {
            AssetStoreError::DeleteFailed(format!("Failed to delete {}: {}", path.display(), e))
        })?;
        tracing::debug!(path = %path.display(), "Staged signature deleted");
        Ok(())
    }

    /// Best-effort sweep of every file in the staging directory, run when
    /// the reporting session ends. Per-file failures are logged and
    /// swallowed. Returns the number of files removed.
    pub async fn sweep(&self) -> usize {
        let mut entries = match fs::read_dir(&self.staging_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!(
                    dir = %self.staging_dir.display(),
                    error = %e,
                    "Signature sweep skipped"
                );
                return 0;
            }
        };

        let mut removed = 0;
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Sweep failed to delete file");
                }
            }
        }

        tracing::info!(dir = %self.staging_dir.display(), removed, "Signature directory swept");
        removed
    }
}

/// Strip an optional `data:image/<fmt>;base64,` prefix and decode.
fn decode_payload(payload: &str) -> AssetStoreResult<Vec<u8>> {
    let trimmed = payload.trim();
    let encoded = if trimmed.starts_with("data:image/") {
        match trimmed.split_once(";base64,") {
            Some((_, rest)) => rest,
            None => {
                return Err(AssetStoreError::InvalidPayload(
                    "data URI is not base64-encoded".to_string(),
                ))
            }
        }
    } else {
        trimmed
    };

    if encoded.is_empty() {
        return Err(AssetStoreError::InvalidPayload(
            "signature payload is empty".to_string(),
        ));
    }

    BASE64
        .decode(encoded)
        .map_err(|e| AssetStoreError::InvalidPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // 1x1 transparent PNG
    const PNG_B64: &str =
        "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[tokio::test]
    async fn test_stage_round_trip() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());

        let path = store.stage(PNG_B64).await.unwrap();
        assert!(store.exists(&path).await);
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("signature_"));
        assert_eq!(path.extension().unwrap(), "png");

        store.remove(&path).await.unwrap();
        assert!(!store.exists(&path).await);
    }

    #[tokio::test]
    async fn test_data_uri_prefix_is_stripped() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());

        let plain = store.stage(PNG_B64).await.unwrap();
        let prefixed = store
            .stage(&format!("data:image/png;base64,{}", PNG_B64))
            .await
            .unwrap();

        let a = tokio::fs::read(&plain).await.unwrap();
        let b = tokio::fs::read(&prefixed).await.unwrap();
        assert_eq!(a, b);
        // PNG magic bytes survived the round trip
        assert_eq!(&a[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_ensure_dirs_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());

        store.ensure_dirs().await.unwrap();
        store.ensure_dirs().await.unwrap();

        assert!(store.staging_dir().is_dir());
        assert!(store
            .staging_dir()
            .ends_with("internsight/assets/tanda_tangan"));
    }

    #[tokio::test]
    async fn test_invalid_payload_rejected() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());

        assert!(matches!(
            store.stage("not-base64!!!").await,
            Err(AssetStoreError::InvalidPayload(_))
        ));
        assert!(matches!(
            store.stage("").await,
            Err(AssetStoreError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_missing_file_is_ok() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());
        let ghost = store.staging_dir().join("signature_0.png");
        assert!(store.remove(&ghost).await.is_ok());
    }

    #[tokio::test]
    async fn test_sweep_empties_directory() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());

        store.stage(PNG_B64).await.unwrap();
        store.stage(PNG_B64).await.unwrap();

        let removed = store.sweep().await;
        assert_eq!(removed, 2);

        let mut entries = tokio::fs::read_dir(store.staging_dir()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sweep_without_directory_is_noop() {
        let dir = tempdir().unwrap();
        let store = SignatureStore::new(dir.path());
        assert_eq!(store.sweep().await, 0);
    }
}
