//! JSON export of a trained preprocessing + classifier pipeline.
//!
//! The layout mirrors an sklearn `Pipeline(ColumnTransformer, classifier)`: numeric
//! columns are standard-scaled, categorical columns are one-hot encoded (unknown
//! categories produce an all-zero block), and the transformed vector is fed to either
//! a logistic regression or a gradient-boosted tree ensemble with a sigmoid link.

use crate::errors::AppError;
use crate::predictor::Predictor;
use crate::profile::{FeatureRecord, FeatureValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericFeature {
    pub name: String,
    pub mean: f64,
    pub scale: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalFeature {
    pub name: String,
    pub categories: Vec<String>,
}

/// One node of a regression tree, addressed by its index in the tree's node array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `x[feature] < threshold`, otherwise to `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Leaf value reached by `x`.
    pub fn predict(&self, x: &[f64]) -> Result<f64, AppError> {
        let mut idx = 0;
        // A well-formed tree reaches a leaf in at most `nodes.len()` steps.
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(idx).ok_or_else(|| {
                AppError::ScoringError(format!("tree node {} does not exist", idx))
            })?;
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = x.get(*feature).ok_or_else(|| {
                        AppError::ScoringError(format!(
                            "tree splits on feature {} but only {} were produced",
                            feature,
                            x.len()
                        ))
                    })?;
                    idx = if value < threshold { *left } else { *right };
                }
            }
        }
        Err(AppError::ScoringError(
            "tree traversal did not reach a leaf".to_string(),
        ))
    }

    fn validate(&self, width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {} has a non-finite value", idx));
                    }
                }
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= width {
                        return Err(format!(
                            "node {} splits on feature {} but the pipeline produces {}",
                            idx, feature, width
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", idx));
                    }
                    // Children after parents keeps traversal acyclic.
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(format!(
                                "node {} points to invalid child {}",
                                idx, child
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LogisticRegression {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    GradientBoostedTrees {
        base_score: f64,
        trees: Vec<Tree>,
    },
}

/// Fitted preprocessing + classifier, as exported by the training pipeline.
///
/// Deserializing runs [`PipelineModel::validate`], so a model read from JSON is always
/// structurally sound.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PipelineArtifact")]
pub struct PipelineModel {
    pub model_id: Option<String>,
    pub model_version: i64,
    pub numeric_features: Vec<NumericFeature>,
    pub categorical_features: Vec<CategoricalFeature>,
    pub classifier: Classifier,
    /// Positive-class probability at or above which `predict` returns 1.
    pub threshold: f64,
}

/// Artifact as written on disk, before validation.
#[derive(Deserialize)]
struct PipelineArtifact {
    #[serde(default)]
    model_id: Option<String>,
    model_version: i64,
    numeric_features: Vec<NumericFeature>,
    categorical_features: Vec<CategoricalFeature>,
    classifier: Classifier,
    #[serde(default = "default_threshold")]
    threshold: f64,
}

impl TryFrom<PipelineArtifact> for PipelineModel {
    type Error = String;

    fn try_from(artifact: PipelineArtifact) -> Result<Self, Self::Error> {
        let model = PipelineModel {
            model_id: artifact.model_id,
            model_version: artifact.model_version,
            numeric_features: artifact.numeric_features,
            categorical_features: artifact.categorical_features,
            classifier: artifact.classifier,
            threshold: artifact.threshold,
        };
        model.validate()?;
        Ok(model)
    }
}

/// Columns the pipeline and a record disagree on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDrift {
    /// Required by the pipeline, absent from the record.
    pub missing: Vec<String>,
    /// Supplied by the record, ignored by the pipeline.
    pub unused: Vec<String>,
}

impl SchemaDrift {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unused.is_empty()
    }
}

impl PipelineModel {
    pub fn from_json(bytes: &[u8]) -> Result<Self, AppError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn load_json(path: &Path) -> Result<Self, AppError> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::ArtifactError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&bytes)
    }

    /// Length of the transformed feature vector.
    pub fn width(&self) -> usize {
        self.numeric_features.len()
            + self
                .categorical_features
                .iter()
                .map(|c| c.categories.len())
                .sum::<usize>()
    }

    /// Validate structural invariants of the model.
    pub fn validate(&self) -> Result<(), String> {
        if self.numeric_features.is_empty() && self.categorical_features.is_empty() {
            return Err("pipeline declares no input columns".to_string());
        }

        let mut seen = BTreeSet::new();
        for name in self.input_columns() {
            if !seen.insert(name) {
                return Err(format!("column {} is declared twice", name));
            }
        }

        for feature in &self.numeric_features {
            if !feature.mean.is_finite() {
                return Err(format!("column {} has a non-finite mean", feature.name));
            }
            if !feature.scale.is_finite() || feature.scale == 0.0 {
                return Err(format!("column {} has an unusable scale", feature.name));
            }
        }

        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(format!("threshold {} must lie in (0, 1)", self.threshold));
        }

        let width = self.width();
        match &self.classifier {
            Classifier::LogisticRegression {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != width {
                    return Err(format!(
                        "{} coefficients for {} transformed features",
                        coefficients.len(),
                        width
                    ));
                }
                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err("logistic regression has non-finite weights".to_string());
                }
            }
            Classifier::GradientBoostedTrees { base_score, trees } => {
                if !base_score.is_finite() {
                    return Err("base_score must be finite".to_string());
                }
                if trees.is_empty() {
                    return Err("tree ensemble is empty".to_string());
                }
                for (idx, tree) in trees.iter().enumerate() {
                    tree.validate(width)
                        .map_err(|e| format!("tree {}: {}", idx, e))?;
                }
            }
        }

        Ok(())
    }

    /// Raw column names the pipeline reads, numeric columns first.
    pub fn input_columns(&self) -> impl Iterator<Item = &str> {
        self.numeric_features
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.categorical_features.iter().map(|f| f.name.as_str()))
    }

    /// Compares the pipeline's inputs against the columns a record will carry.
    pub fn schema_drift(&self, record_columns: &[&str]) -> SchemaDrift {
        let expected: BTreeSet<&str> = self.input_columns().collect();
        let supplied: BTreeSet<&str> = record_columns.iter().copied().collect();

        SchemaDrift {
            missing: expected
                .difference(&supplied)
                .map(|c| c.to_string())
                .collect(),
            unused: supplied
                .difference(&expected)
                .map(|c| c.to_string())
                .collect(),
        }
    }

    /// Applies scaling and one-hot encoding to a record.
    pub fn transform(&self, record: &FeatureRecord) -> Result<Vec<f64>, AppError> {
        let mut x = Vec::with_capacity(self.width());

        for feature in &self.numeric_features {
            let raw = match record.get(&feature.name) {
                Some(FeatureValue::Int(v)) => v as f64,
                Some(FeatureValue::Text(v)) => {
                    return Err(AppError::ScoringError(format!(
                        "column {} is numeric but received {:?}",
                        feature.name, v
                    )))
                }
                None => {
                    return Err(AppError::ScoringError(format!(
                        "column {} is missing from the record",
                        feature.name
                    )))
                }
            };
            x.push((raw - feature.mean) / feature.scale);
        }

        for feature in &self.categorical_features {
            let value = record.get(&feature.name).ok_or_else(|| {
                AppError::ScoringError(format!(
                    "column {} is missing from the record",
                    feature.name
                ))
            })?;
            let value = value.to_string();
            x.extend(
                feature
                    .categories
                    .iter()
                    .map(|c| if *c == value { 1.0 } else { 0.0 }),
            );
        }

        Ok(x)
    }

    /// Raw margin before the sigmoid link.
    pub fn decision_function(&self, x: &[f64]) -> Result<f64, AppError> {
        match &self.classifier {
            Classifier::LogisticRegression {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != x.len() {
                    return Err(AppError::ScoringError(format!(
                        "{} coefficients for {} features",
                        coefficients.len(),
                        x.len()
                    )));
                }
                Ok(intercept
                    + coefficients
                        .iter()
                        .zip(x)
                        .map(|(w, v)| w * v)
                        .sum::<f64>())
            }
            Classifier::GradientBoostedTrees { base_score, trees } => {
                let mut margin = *base_score;
                for tree in trees {
                    margin += tree.predict(x)?;
                }
                Ok(margin)
            }
        }
    }

    fn positive_probability(&self, record: &FeatureRecord) -> Result<f64, AppError> {
        let x = self.transform(record)?;
        Ok(sigmoid(self.decision_function(&x)?))
    }
}

impl Predictor for PipelineModel {
    fn predict(&self, record: &FeatureRecord) -> Result<u8, AppError> {
        let p = self.positive_probability(record)?;
        Ok(u8::from(p >= self.threshold))
    }

    fn predict_proba(&self, record: &FeatureRecord) -> Result<[f64; 2], AppError> {
        let p = self.positive_probability(record)?;
        Ok([1.0 - p, p])
    }

    fn model_id(&self) -> &str {
        self.model_id.as_deref().unwrap_or("pipeline")
    }
}

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
