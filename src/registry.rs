use crate::artifact_cache::CachedArtifact;
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use reqwest;
use std::path::PathBuf;
use std::time::Duration;
use tracing;

/// Client for downloading artifacts from a Hugging Face style model registry.
///
/// Artifacts are addressed by repository id + filename (+ revision) and served from
/// `{base_url}/{repo_id}/resolve/{revision}/{filename}`.
#[derive(Clone)]
pub struct ModelRegistryClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    cache_dir: PathBuf,
}

impl ModelRegistryClient {
    /// Creates a new `ModelRegistryClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the registry.
    /// * `token` - Optional bearer token for private repositories.
    /// * `cache_dir` - Root of the local artifact cache.
    /// * `timeout` - Per-request timeout.
    pub fn new(
        base_url: String,
        token: Option<String>,
        cache_dir: PathBuf,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::RegistryError(format!("Failed to create registry client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            cache_dir,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.registry_url.clone(),
            config.hf_token.clone(),
            config.cache_dir.clone(),
            Duration::from_secs(config.registry_timeout_secs),
        )
    }

    pub fn resolve_url(&self, repo_id: &str, revision: &str, filename: &str) -> String {
        format!(
            "{}/{}/resolve/{}/{}",
            self.base_url, repo_id, revision, filename
        )
    }

    /// Where an artifact lives in the local cache.
    pub fn cache_path(&self, repo_id: &str, revision: &str, filename: &str) -> PathBuf {
        self.cache_dir
            .join(repo_id.replace('/', "--"))
            .join(revision)
            .join(filename)
    }

    /// Returns a local path to the artifact, revalidating any cached copy.
    ///
    /// An intact cached copy is sent to the registry as `If-None-Match` and reused on
    /// `304 Not Modified`, or when the registry cannot be reached. Any other answer
    /// replaces the cache with the served bytes.
    ///
    /// # Returns
    ///
    /// * `Result<PathBuf, AppError>` - Path to the verified local copy.
    pub async fn fetch(
        &self,
        repo_id: &str,
        revision: &str,
        filename: &str,
    ) -> Result<PathBuf, AppError> {
        let path = self.cache_path(repo_id, revision, filename);
        let cached = CachedArtifact::load_validated(&path).await;
        let etag = cached.as_ref().and_then(|c| c.etag.as_deref());

        match self.request(repo_id, revision, filename, etag).await? {
            RegistryResponse::NotModified => match cached {
                Some(cached) => {
                    tracing::info!(
                        "Cached artifact is current: {} (sha256 {})",
                        cached.path.display(),
                        cached.checksum
                    );
                    Ok(cached.path)
                }
                None => Err(AppError::RegistryError(format!(
                    "Registry answered 304 for {}/{} without a cached copy",
                    repo_id, filename
                ))),
            },
            RegistryResponse::Unavailable(reason) => match cached {
                Some(cached) => {
                    tracing::warn!(
                        "Registry unavailable ({}), using cached artifact {}",
                        reason,
                        cached.path.display()
                    );
                    Ok(cached.path)
                }
                None => Err(AppError::RegistryError(reason)),
            },
            RegistryResponse::Artifact { bytes, etag } => {
                let stored = CachedArtifact::store(&path, &bytes, etag.as_deref())
                    .await
                    .with_context(|| format!("Failed to cache artifact at {}", path.display()))?;

                tracing::info!(
                    "✓ Artifact cached: {} ({} bytes, sha256 {})",
                    stored.path.display(),
                    bytes.len(),
                    stored.checksum
                );
                Ok(stored.path)
            }
        }
    }

    /// Drops the cached copy so the next `fetch` downloads it again.
    pub async fn evict(
        &self,
        repo_id: &str,
        revision: &str,
        filename: &str,
    ) -> Result<(), AppError> {
        let path = self.cache_path(repo_id, revision, filename);
        tracing::warn!("Evicting cached artifact {}", path.display());
        CachedArtifact::remove(&path)
            .await
            .with_context(|| format!("Failed to evict cached artifact {}", path.display()))
    }

    /// Sends one GET for the artifact, conditional when `if_none_match` is set.
    async fn request(
        &self,
        repo_id: &str,
        revision: &str,
        filename: &str,
        if_none_match: Option<&str>,
    ) -> Result<RegistryResponse, AppError> {
        let url = self.resolve_url(repo_id, revision, filename);
        tracing::info!("Requesting artifact {} from {}", filename, url);

        let mut request = self.client.get(&url);
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(etag) = if_none_match {
            request = request.header(reqwest::header::IF_NONE_MATCH, etag);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return Ok(RegistryResponse::Unavailable(format!(
                    "Registry request failed: {}",
                    e
                )))
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_MODIFIED {
            return Ok(RegistryResponse::NotModified);
        }
        if status.is_server_error() {
            return Ok(RegistryResponse::Unavailable(format!(
                "Registry returned {} for {}/{}",
                status, repo_id, filename
            )));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::RegistryError(format!(
                "Registry returned {} for {}/{}: {}",
                status, repo_id, filename, error_text
            )));
        }

        let etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(|e| {
            AppError::RegistryError(format!("Failed to read artifact body: {}", e))
        })?;

        Ok(RegistryResponse::Artifact {
            bytes: bytes.to_vec(),
            etag,
        })
    }
}

/// What the registry said about one artifact request.
enum RegistryResponse {
    Artifact { bytes: Vec<u8>, etag: Option<String> },
    NotModified,
    /// Transport failure or 5xx; a cached copy may stand in.
    Unavailable(String),
}
