//! Scoring seam between the HTTP surface and whatever classifier was loaded.

use crate::errors::AppError;
use crate::profile::{CustomerProfile, FeatureRecord};
use serde::Serialize;

/// Binary classifier over a single feature record.
///
/// Implementations are loaded once and shared read-only for the process lifetime.
pub trait Predictor: Send + Sync {
    /// Class label, 1 meaning the customer is predicted to purchase.
    fn predict(&self, record: &FeatureRecord) -> Result<u8, AppError>;

    /// `[p(no purchase), p(purchase)]`.
    fn predict_proba(&self, record: &FeatureRecord) -> Result<[f64; 2], AppError>;

    /// Identifier shown on the health endpoint.
    fn model_id(&self) -> &str {
        "unnamed"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseLabel {
    NoPurchase,
    Purchase,
}

impl PurchaseLabel {
    pub fn as_u8(self) -> u8 {
        match self {
            PurchaseLabel::NoPurchase => 0,
            PurchaseLabel::Purchase => 1,
        }
    }
}

/// Outcome of one scoring call; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub label: PurchaseLabel,
    /// Probability mass of the positive class, in `[0, 1]`.
    pub probability: f64,
}

impl PredictionResult {
    pub fn is_purchase(&self) -> bool {
        self.label == PurchaseLabel::Purchase
    }

    pub fn confidence(&self) -> String {
        format_confidence(self.probability)
    }
}

/// Formats a probability as a percentage with two decimals, e.g. `0.8734` -> `"87.34%"`.
pub fn format_confidence(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

/// Scores one profile against the loaded predictor.
///
/// Predictor failures are returned as-is; nothing is retried.
pub fn score(
    predictor: &dyn Predictor,
    profile: &CustomerProfile,
) -> Result<PredictionResult, AppError> {
    let record = profile.to_record();

    let label = match predictor.predict(&record)? {
        0 => PurchaseLabel::NoPurchase,
        1 => PurchaseLabel::Purchase,
        other => {
            return Err(AppError::ScoringError(format!(
                "predictor returned label {} outside {{0, 1}}",
                other
            )))
        }
    };

    let probability = predictor.predict_proba(&record)?[1];
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(AppError::ScoringError(format!(
            "predictor returned probability {} outside [0, 1]",
            probability
        )));
    }

    tracing::debug!(
        label = label.as_u8(),
        probability = probability,
        "Scored customer profile"
    );

    Ok(PredictionResult { label, probability })
}
