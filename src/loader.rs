//! One-shot model initialization at process start.

use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::pipeline::PipelineModel;
use crate::profile::COLUMNS;
use crate::registry::ModelRegistryClient;
use std::path::Path;
use tracing::{info, warn};

/// Fetches (or revalidates the cached) artifact named by `config` and deserializes it.
///
/// A registry artifact that fails to load is evicted from the cache and downloaded once
/// more; an artifact that still fails is evicted again, so a broken download never
/// outlives the registry fix. There is no fallback model: any error here is meant to
/// stop the process.
pub async fn initialize(config: &Config) -> Result<PipelineModel, AppError> {
    if let Some(ref local) = config.model_path {
        return load_from_path(local);
    }

    let registry = ModelRegistryClient::from_config(config)?;
    match fetch_and_load(&registry, config).await {
        Err(err) if matches!(err.root(), AppError::ArtifactError(_)) => {
            warn!(error = %err, "Artifact unusable, downloading it again");
            fetch_and_load(&registry, config).await
        }
        result => result,
    }
}

async fn fetch_and_load(
    registry: &ModelRegistryClient,
    config: &Config,
) -> Result<PipelineModel, AppError> {
    let path = registry
        .fetch(
            &config.model_repo_id,
            &config.model_revision,
            &config.model_filename,
        )
        .await
        .with_context(|| {
            format!(
                "Failed to fetch {} from {}",
                config.model_filename, config.model_repo_id
            )
        })?;

    let loaded = load_from_path(&path);
    if let Err(ref err) = loaded {
        if matches!(err.root(), AppError::ArtifactError(_)) {
            registry
                .evict(
                    &config.model_repo_id,
                    &config.model_revision,
                    &config.model_filename,
                )
                .await?;
        }
    }
    loaded
}

/// Deserializes and validates a local artifact, reporting schema drift.
pub fn load_from_path(path: &Path) -> Result<PipelineModel, AppError> {
    info!(path = %path.display(), "Loading model artifact");

    let model = PipelineModel::load_json(path)
        .with_context(|| format!("Failed to load model from {}", path.display()))?;

    let drift = model.schema_drift(&COLUMNS);
    if !drift.is_empty() {
        // Reported, not reconciled: the trained schema is the source of truth.
        warn!(
            missing = ?drift.missing,
            unused = ?drift.unused,
            "Model schema differs from the form's columns"
        );
    }

    info!(
        model_id = ?model.model_id,
        model_version = model.model_version,
        transformed_width = model.width(),
        threshold = model.threshold,
        "Model loaded successfully"
    );

    Ok(model)
}
