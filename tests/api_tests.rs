/// HTTP-level tests against the router with an injected predictor
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use std::sync::{Arc, Mutex};
use tourism_predictor::config::Config;
use tourism_predictor::errors::AppError;
use tourism_predictor::handlers::{router, AppState};
use tourism_predictor::profile::FeatureRecord;
use tourism_predictor::Predictor;
use tower::ServiceExt;

/// Returns fixed outputs and remembers every record it was asked to score.
struct RecordingPredictor {
    label: u8,
    proba: [f64; 2],
    seen: Mutex<Vec<FeatureRecord>>,
}

impl RecordingPredictor {
    fn new(label: u8, positive: f64) -> Arc<Self> {
        Arc::new(Self {
            label,
            proba: [1.0 - positive, positive],
            seen: Mutex::new(Vec::new()),
        })
    }
}

impl Predictor for RecordingPredictor {
    fn predict(&self, record: &FeatureRecord) -> Result<u8, AppError> {
        self.seen.lock().unwrap().push(*record);
        Ok(self.label)
    }

    fn predict_proba(&self, _record: &FeatureRecord) -> Result<[f64; 2], AppError> {
        Ok(self.proba)
    }

    fn model_id(&self) -> &str {
        "recording-mock"
    }
}

struct FailingPredictor;

impl Predictor for FailingPredictor {
    fn predict(&self, _record: &FeatureRecord) -> Result<u8, AppError> {
        Err(AppError::ScoringError(
            "column Income is missing from the record".to_string(),
        ))
    }

    fn predict_proba(&self, _record: &FeatureRecord) -> Result<[f64; 2], AppError> {
        unreachable!("predict fails first")
    }
}

fn app(predictor: Arc<dyn Predictor>) -> axum::Router {
    router(Arc::new(AppState {
        config: Config::default(),
        predictor,
    }))
}

/// The scenario from the product walkthrough, as the browser would submit it.
const SCENARIO_FORM: &str = "Age=35&TypeofContact=Self+Inquiry&CityTier=1&Occupation=Salaried\
&Gender=Male&NumberOfPersonVisiting=2&PreferredPropertyStar=3&MaritalStatus=Married\
&NumberOfTrips=2&Passport=Yes&OwnCar=Yes&NumberOfChildrenVisiting=0&Designation=Manager\
&MonthlyIncome=60000&PitchSatisfactionScore=4&ProductPitched=Standard&NumberOfFollowups=3\
&DurationOfPitch=20";

fn form_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_index_renders_form_with_defaults() {
    let response = app(RecordingPredictor::new(1, 0.9))
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_string(response).await;
    assert!(html.contains("Wellness Tourism Package Purchase Predictor"));
    assert!(html.contains("Predict Purchase Likelihood"));
    assert!(html.contains("id=\"Age\" name=\"Age\" min=\"18\" max=\"100\" step=\"1\" value=\"30\""));
    assert!(!html.contains("Prediction Result"));
}

#[tokio::test]
async fn test_form_submission_builds_exact_record() {
    let predictor = RecordingPredictor::new(1, 0.8734);
    let response = app(predictor.clone())
        .oneshot(form_request(SCENARIO_FORM))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let seen = predictor.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let record = serde_json::to_value(seen[0]).unwrap();
    assert_eq!(
        record,
        serde_json::json!({
            "Age": 35,
            "TypeofContact": "Self Inquiry",
            "CityTier": 1,
            "Occupation": "Salaried",
            "Gender": "Male",
            "NumberOfPersonVisiting": 2,
            "PreferredPropertyStar": 3,
            "MaritalStatus": "Married",
            "NumberOfTrips": 2,
            "Passport": 1,
            "OwnCar": 1,
            "NumberOfChildrenVisiting": 0,
            "Designation": "Manager",
            "MonthlyIncome": 60000,
            "PitchSatisfactionScore": 4,
            "ProductPitched": "Standard",
            "NumberOfFollowups": 3,
            "DurationOfPitch": 20
        })
    );
    assert_eq!(record.as_object().unwrap().len(), 18);
}

#[tokio::test]
async fn test_likely_purchase_renders_success_banner() {
    let response = app(RecordingPredictor::new(1, 0.8734))
        .oneshot(form_request(SCENARIO_FORM))
        .await
        .unwrap();

    let html = body_string(response).await;
    assert!(html.contains("Prediction Result"));
    assert!(html.contains("alert success"));
    assert!(html.contains("LIKELY to purchase"));
    assert!(html.contains("Confidence: <strong>87.34%</strong>"));
    // Submitted values stay on the page
    assert!(html.contains("<option value=\"Self Inquiry\" selected>Self Inquiry</option>"));
    assert!(html.contains("name=\"MonthlyIncome\" min=\"5000\" max=\"1000000\" step=\"1\" value=\"60000\""));
}

#[tokio::test]
async fn test_unlikely_purchase_renders_error_banner() {
    let response = app(RecordingPredictor::new(0, 0.1234))
        .oneshot(form_request(SCENARIO_FORM))
        .await
        .unwrap();

    let html = body_string(response).await;
    assert!(html.contains("alert error"));
    assert!(html.contains("NOT likely to purchase"));
    assert!(html.contains("12.34%"));
}

#[tokio::test]
async fn test_age_bounds_on_form() {
    for (age, expected) in [
        (18, StatusCode::OK),
        (100, StatusCode::OK),
        (17, StatusCode::BAD_REQUEST),
        (101, StatusCode::BAD_REQUEST),
    ] {
        let predictor = RecordingPredictor::new(0, 0.3);
        let body = SCENARIO_FORM.replace("Age=35", &format!("Age={}", age));
        let response = app(predictor.clone())
            .oneshot(form_request(&body))
            .await
            .unwrap();

        assert_eq!(response.status(), expected, "Age={}", age);
        if expected != StatusCode::OK {
            // Rejected before reaching the predictor
            assert!(predictor.seen.lock().unwrap().is_empty());
        }
    }
}

#[tokio::test]
async fn test_unknown_category_on_form_rejected() {
    let body = SCENARIO_FORM.replace("Occupation=Salaried", "Occupation=Astronaut");
    let response = app(RecordingPredictor::new(0, 0.3))
        .oneshot(form_request(&body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rejected_form_renders_page_with_error_banner() {
    let body = SCENARIO_FORM.replace("Age=35", "Age=101");
    let response = app(RecordingPredictor::new(0, 0.3))
        .oneshot(form_request(&body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let html = body_string(response).await;
    assert!(html.contains("alert error"));
    assert!(html.contains("The submitted details are invalid"));
    assert!(html.contains("Predict Purchase Likelihood"));
    assert!(!html.contains("Prediction Result"));
    assert!(serde_json::from_str::<serde_json::Value>(&html).is_err());
}

#[tokio::test]
async fn test_rejected_json_stays_json() {
    let mut profile = serde_json::to_value(tourism_predictor::CustomerProfile::default()).unwrap();
    profile["Age"] = serde_json::json!(17);

    let response = app(RecordingPredictor::new(1, 0.8))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(profile.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_json_prediction() {
    let mut profile = serde_json::to_value(tourism_predictor::CustomerProfile::default()).unwrap();
    profile["Passport"] = serde_json::json!("Yes");

    let response = app(RecordingPredictor::new(1, 0.8734))
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(profile.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["label"], 1);
    assert_eq!(body["purchase"], true);
    assert_eq!(body["probability"], 0.8734);
    assert_eq!(body["confidence"], "87.34%");
}

#[tokio::test]
async fn test_scoring_failure_surfaces_as_server_error() {
    let response = app(Arc::new(FailingPredictor))
        .oneshot(form_request(SCENARIO_FORM))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert!(body["error"].as_str().unwrap().contains("Income"));
}

#[tokio::test]
async fn test_health_reports_model() {
    let response = app(RecordingPredictor::new(0, 0.5))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "recording-mock");
}
