use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Submitted customer attributes are outside their declared domain.
    BadRequest(String),
    /// The model registry could not serve the requested artifact.
    RegistryError(String),
    /// The artifact was fetched but is not a usable pipeline.
    ArtifactError(String),
    /// The predictor failed while scoring a record.
    ScoringError(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::RegistryError(msg) => write!(f, "Model registry error: {}", msg),
            AppError::ArtifactError(msg) => write!(f, "Invalid model artifact: {}", msg),
            AppError::ScoringError(msg) => write!(f, "Scoring failed: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    /// Scoring failures are not recovered from; they surface to the caller as a 500
    /// carrying the predictor's message.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::RegistryError(msg) => {
                tracing::error!("Model registry error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Model registry unavailable".to_string(),
                )
            }
            AppError::ArtifactError(msg) => {
                tracing::error!("Artifact error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Model artifact unusable".to_string(),
                )
            }
            AppError::ScoringError(msg) => {
                tracing::error!("Scoring error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Scoring failed: {}", msg),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return source.as_ref().clone().into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::RegistryError(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ArtifactError(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

/// Extension for I/O errors raised while touching the artifact cache.
impl<T> ResultExt<T> for Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::from(e)),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(AppError::from(e)),
            context: f(),
        })
    }
}

impl AppError {
    /// Returns the innermost error, skipping any context wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_chain_display() {
        let err: Result<(), AppError> = Err(AppError::RegistryError("404".to_string()));
        let err = err.context("Downloading model").unwrap_err();

        assert_eq!(err.to_string(), "Downloading model: Model registry error: 404");
        assert!(matches!(err.root(), AppError::RegistryError(_)));
    }

    #[test]
    fn test_status_mapping() {
        let response = AppError::BadRequest("Age out of range".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::ScoringError("missing column".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let wrapped = AppError::WithContext {
            source: Box::new(AppError::RegistryError("timeout".to_string())),
            context: "initialize".to_string(),
        };
        assert_eq!(wrapped.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
