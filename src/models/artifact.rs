use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::errors::{ArtifactError, ForecastError};
use crate::features::{is_known_feature, FeatureRecord};

/// Standardizes inputs as `(x - mean) / scale`, fitted once at training time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Returns a scaled copy of the input vector
    ///
    /// # Arguments
    ///
    /// * 'x' - raw feature values, same length as the fitted mean
    pub fn transform(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }
}

/// One node of a regression tree stored in pre-order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split { feature: usize, threshold: f64, left: usize, right: usize },
    Leaf { value: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Walks from the root, going left when `x[feature] <= threshold`
    fn predict(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split { feature, threshold, left, right } => {
                    idx = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    /// Children must come after their parent, which also rules out cycles
    fn validate(&self, n_features: usize) -> Result<(), ArtifactError> {
        if self.nodes.is_empty() {
            return Err("empty regression tree".into());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split { feature, threshold, left, right } = node {
                if *feature >= n_features {
                    return Err(format!("node {} splits on feature {} of {}", i, feature, n_features).into());
                }
                if !threshold.is_finite() {
                    return Err(format!("node {} has a non finite threshold", i).into());
                }
                for child in [*left, *right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!("node {} has invalid child index {}", i, child).into());
                    }
                }
            }
        }

        Ok(())
    }
}

/// The fitted regression function of an artifact
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Regressor {
    /// Mean of all tree outputs
    RandomForest { trees: Vec<RegressionTree> },
    /// `init + learning_rate * sum(tree outputs)`
    GradientBoosting { init: f64, learning_rate: f64, trees: Vec<RegressionTree> },
    /// Ridge or lasso, `intercept + coef . x`
    Linear { coef: Vec<f64>, intercept: f64 },
}

impl Regressor {
    fn predict(&self, x: &[f64]) -> f64 {
        match self {
            Regressor::RandomForest { trees } => {
                trees.iter().map(|t| t.predict(x)).sum::<f64>() / trees.len() as f64
            }
            Regressor::GradientBoosting { init, learning_rate, trees } => {
                init + learning_rate * trees.iter().map(|t| t.predict(x)).sum::<f64>()
            }
            Regressor::Linear { coef, intercept } => {
                intercept + coef.iter().zip(x.iter()).map(|(c, v)| c * v).sum::<f64>()
            }
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), ArtifactError> {
        match self {
            Regressor::RandomForest { trees } | Regressor::GradientBoosting { trees, .. } => {
                if trees.is_empty() {
                    return Err("tree ensemble without trees".into());
                }
                trees.iter().try_for_each(|t| t.validate(n_features))
            }
            Regressor::Linear { coef, .. } => {
                if coef.len() != n_features {
                    Err(format!("linear model has {} coefficients for {} features", coef.len(), n_features).into())
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// A trained model for one weather variable: regressor, scaler and input layout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawArtifact")]
pub struct ModelArtifact {
    feature_names: Vec<String>,
    scaler: StandardScaler,
    model: Regressor,
}

#[derive(Deserialize)]
struct RawArtifact {
    feature_names: Vec<String>,
    scaler: StandardScaler,
    model: Regressor,
}

impl TryFrom<RawArtifact> for ModelArtifact {
    type Error = ArtifactError;

    fn try_from(raw: RawArtifact) -> Result<Self, Self::Error> {
        ModelArtifact::new(raw.feature_names, raw.scaler, raw.model)
    }
}

impl ModelArtifact {
    /// Returns a validated artifact
    ///
    /// # Arguments
    ///
    /// * 'feature_names' - ordered input layout, every name must be a synthesizer feature
    /// * 'scaler' - fitted scaler with one mean and scale per feature
    /// * 'model' - fitted regressor
    pub fn new(feature_names: Vec<String>, scaler: StandardScaler, model: Regressor) -> Result<ModelArtifact, ArtifactError> {
        let n = feature_names.len();
        if n == 0 {
            return Err("artifact without features".into());
        }
        if let Some(unknown) = feature_names.iter().find(|f| !is_known_feature(f)) {
            return Err(format!("unknown feature '{}'", unknown).into());
        }
        if scaler.mean.len() != n || scaler.scale.len() != n {
            return Err(format!("scaler fitted for {}/{} features, expected {}", scaler.mean.len(), scaler.scale.len(), n).into());
        }
        if scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) || scaler.mean.iter().any(|m| !m.is_finite()) {
            return Err("scaler has zero or non finite values".into());
        }
        model.validate(n)?;

        Ok(ModelArtifact { feature_names, scaler, model })
    }

    /// Loads and validates an artifact from a JSON file
    ///
    /// # Arguments
    ///
    /// * 'path' - path to the artifact file
    pub fn load(path: &Path) -> Result<ModelArtifact, ArtifactError> {
        let json = fs::read_to_string(path)?;

        Ok(serde_json::from_str(&json)?)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Scales raw inputs and runs the regressor. Fails if the input length does not match
    /// the artifact's features.
    ///
    /// # Arguments
    ///
    /// * 'x' - raw feature values in the artifact's feature order
    pub fn predict(&self, x: &[f64]) -> Result<f64, ForecastError> {
        if x.len() != self.feature_names.len() {
            return Err(ForecastError::FeatureCount(self.feature_names.len(), x.len()));
        }
        let scaled = self.scaler.transform(x);

        Ok(self.model.predict(&scaled))
    }

    /// Selects this model's features from a record, then predicts
    ///
    /// # Arguments
    ///
    /// * 'record' - synthesized (or observed) features for a date
    pub fn predict_record(&self, record: &FeatureRecord) -> Result<f64, ForecastError> {
        let x = record.vector(&self.feature_names)?;

        self.predict(&x)
    }
}
