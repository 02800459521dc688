use hex;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Integrity check for artifacts cached on local disk.
///
/// Every cached artifact has a `<file>.sha256` sidecar holding the hex SHA-256 of the
/// bytes written at download time. A cached copy is trusted only while the two agree:
///
/// - a missing sidecar means the download never completed
/// - a mismatching sidecar means the file was truncated or edited after caching
///
/// Either way the caller re-downloads instead of deserializing suspect bytes.
///
/// The registry's `ETag` for the cached bytes, when it sent one, lives in a
/// `<file>.etag` sidecar and is used to revalidate the copy on the next fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArtifact {
    pub path: PathBuf,
    /// SHA-256 of the artifact bytes (hex encoded).
    pub checksum: String,
    pub etag: Option<String>,
}

async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

impl CachedArtifact {
    /// Computes SHA-256 checksum of the data
    pub fn compute_checksum(data: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hex::encode(hasher.finalize())
    }

    fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    pub fn sidecar_path(path: &Path) -> PathBuf {
        Self::with_suffix(path, ".sha256")
    }

    pub fn etag_path(path: &Path) -> PathBuf {
        Self::with_suffix(path, ".etag")
    }

    /// Writes `data` to `path` and records its checksum and registry `ETag`.
    ///
    /// The artifact is written to a temporary sibling and renamed into place, and the
    /// checksum sidecar is written last, so a crash mid-write leaves no sidecar behind.
    pub async fn store(path: &Path, data: &[u8], etag: Option<&str>) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let sidecar = Self::sidecar_path(path);
        // Drop stale sidecars first so old metadata never vouches for new bytes.
        remove_if_exists(&sidecar).await?;
        remove_if_exists(&Self::etag_path(path)).await?;

        let tmp = Self::with_suffix(path, ".partial");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, path).await?;

        if let Some(etag) = etag {
            tokio::fs::write(Self::etag_path(path), etag.as_bytes()).await?;
        }

        let checksum = Self::compute_checksum(data);
        tokio::fs::write(&sidecar, checksum.as_bytes()).await?;

        Ok(Self {
            path: path.to_path_buf(),
            checksum,
            etag: etag.map(str::to_string),
        })
    }

    /// Deletes a cached artifact together with its sidecars.
    pub async fn remove(path: &Path) -> std::io::Result<()> {
        remove_if_exists(&Self::sidecar_path(path)).await?;
        remove_if_exists(&Self::etag_path(path)).await?;
        remove_if_exists(path).await
    }

    /// Returns the cached artifact if present and intact.
    ///
    /// Returns None when the file or sidecar is missing, or when the checksum no longer
    /// matches the file contents.
    pub async fn load_validated(path: &Path) -> Option<Self> {
        let data = tokio::fs::read(path).await.ok()?;
        let expected = tokio::fs::read_to_string(Self::sidecar_path(path))
            .await
            .ok()?;
        let expected = expected.trim();
        let computed = Self::compute_checksum(&data);

        if computed == expected {
            let etag = tokio::fs::read_to_string(Self::etag_path(path))
                .await
                .ok()
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty());
            Some(Self {
                path: path.to_path_buf(),
                checksum: computed,
                etag,
            })
        } else {
            tracing::warn!(
                "Cached artifact failed validation: checksum mismatch. Expected: {}, File: {}, Data length: {}",
                expected,
                path.display(),
                data.len()
            );
            None
        }
    }
}
