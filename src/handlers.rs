use crate::config::Config;
use crate::errors::AppError;
use crate::predictor::{score, Predictor, PredictionResult, PurchaseLabel};
use crate::profile::CustomerProfile;
use crate::render::{render_page, render_rejected_page};
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Classifier loaded at startup; read-only for the life of the process.
    pub predictor: Arc<dyn Predictor>,
}

/// JSON body returned by `POST /api/v1/predict`.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    /// 1 when the customer is predicted to purchase, else 0.
    pub label: u8,
    pub purchase: bool,
    /// Probability of the purchase class, in `[0, 1]`.
    pub probability: f64,
    /// Probability rendered as a percentage, e.g. `"87.34%"`.
    pub confidence: String,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            label: result.label.as_u8(),
            purchase: result.label == PurchaseLabel::Purchase,
            probability: result.probability,
            confidence: result.confidence(),
        }
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and the id of the loaded model.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "tourism-predictor",
            "version": env!("CARGO_PKG_VERSION"),
            "model": state.predictor.model_id(),
            "model_repo_id": state.config.model_repo_id,
        })),
    )
}

/// GET /
///
/// Renders the form with its default values and no prediction.
pub async fn index() -> Html<String> {
    Html(render_page(&CustomerProfile::default(), None))
}

/// POST /predict
///
/// Scores the submitted form and re-renders the page with the submitted values and the
/// prediction banner. A submission that fails validation gets the page back with an
/// error banner and status 400.
pub async fn predict_form(
    State(state): State<Arc<AppState>>,
    form: Result<Form<CustomerProfile>, FormRejection>,
) -> Result<Response, AppError> {
    let profile = match form {
        Ok(Form(profile)) => profile,
        Err(rejection) => {
            let message = rejection.body_text();
            tracing::warn!(error = %message, "Form submission rejected");
            let page = Html(render_rejected_page(&message));
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
    };

    let result = score(state.predictor.as_ref(), &profile)?;
    tracing::info!(
        label = result.label.as_u8(),
        confidence = %result.confidence(),
        "Form prediction served"
    );

    Ok(Html(render_page(&profile, Some(&result))).into_response())
}

/// POST /api/v1/predict
///
/// JSON counterpart of the form: a `CustomerProfile` keyed by training column names.
pub async fn predict_json(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CustomerProfile>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let Json(profile) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let result = score(state.predictor.as_ref(), &profile)?;
    tracing::info!(
        label = result.label.as_u8(),
        probability = result.probability,
        "API prediction served"
    );

    Ok(Json(result.into()))
}

/// A full form submission is well under 1KB.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

/// Page and scoring routes, without middleware.
pub fn prediction_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_form))
        .route("/api/v1/predict", post(predict_json))
}

/// Full application without rate limiting; `main` adds the limiter in front of the
/// prediction routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(prediction_routes().layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
