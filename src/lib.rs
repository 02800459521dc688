//! Wellness Tourism Package Purchase Predictor
//!
//! Serves a form that collects customer attributes, scores them with a pre-trained
//! binary classifier fetched from a model registry at startup, and renders the
//! purchase-likelihood prediction with its confidence.
//!
//! # Modules
//!
//! - `artifact_cache`: Checksum-validated local cache for downloaded artifacts.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `loader`: One-shot model initialization.
//! - `pipeline`: JSON preprocessing + classifier artifact.
//! - `predictor`: Predictor trait and the scoring operation.
//! - `profile`: Customer attributes and the feature record.
//! - `registry`: Model registry client.
//! - `render`: HTML page rendering.

pub mod artifact_cache;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod loader;
pub mod pipeline;
pub mod predictor;
pub mod profile;
pub mod registry;
pub mod render;

pub use pipeline::PipelineModel;
pub use predictor::{score, PredictionResult, Predictor};
pub use profile::CustomerProfile;
