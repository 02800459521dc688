use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_REPO_ID: &str = "tourism_package_predictor/tourism-package-prediction";
pub const DEFAULT_FILENAME: &str = "best_tourism_package_prediction_model_v1.json";
pub const DEFAULT_REGISTRY_URL: &str = "https://huggingface.co";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Repository id of the artifact in the model registry.
    pub model_repo_id: String,
    /// Artifact filename inside the repository.
    pub model_filename: String,
    pub model_revision: String,
    pub registry_url: String,
    pub cache_dir: PathBuf,
    /// Local artifact that bypasses the registry entirely.
    pub model_path: Option<PathBuf>,
    pub hf_token: Option<String>,
    pub registry_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8501,
            model_repo_id: DEFAULT_REPO_ID.to_string(),
            model_filename: DEFAULT_FILENAME.to_string(),
            model_revision: "main".to_string(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            cache_dir: PathBuf::from(".model_cache"),
            model_path: None,
            hf_token: None,
            registry_timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Every variable is optional; unset or blank values fall back to `Config::default()`.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            port: get("PORT")
                .map(|p| p.parse::<u16>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?
                .unwrap_or(defaults.port),
            model_repo_id: get("MODEL_REPO_ID")
                .map(|id| {
                    if !id.contains('/') || id.starts_with('/') || id.ends_with('/') {
                        anyhow::bail!("MODEL_REPO_ID must look like <owner>/<name>");
                    }
                    Ok(id)
                })
                .transpose()?
                .unwrap_or(defaults.model_repo_id),
            model_filename: get("MODEL_FILENAME").unwrap_or(defaults.model_filename),
            model_revision: get("MODEL_REVISION").unwrap_or(defaults.model_revision),
            registry_url: get("MODEL_REGISTRY_URL")
                .map(|url| {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("MODEL_REGISTRY_URL must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })
                .transpose()?
                .unwrap_or(defaults.registry_url),
            cache_dir: get("MODEL_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            model_path: get("MODEL_PATH").map(PathBuf::from),
            hf_token: get("HF_TOKEN"),
            registry_timeout_secs: get("REGISTRY_TIMEOUT_SECS")
                .map(|t| t.parse::<u64>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("REGISTRY_TIMEOUT_SECS must be a whole number"))?
                .unwrap_or(defaults.registry_timeout_secs),
        };

        // Token is never logged
        tracing::debug!("Model repository: {}", config.model_repo_id);
        tracing::debug!("Model filename: {}", config.model_filename);
        tracing::debug!("Registry URL: {}", config.registry_url);
        if let Some(ref path) = config.model_path {
            tracing::info!("MODEL_PATH set, registry will be bypassed: {}", path.display());
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
