//! Binary logistic regression over sparse features.

use super::{SparseVector, read_artifact};
use crate::{Result, SentimentError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized form of a fitted classifier.
///
/// `coef` is the single coefficient row of the positive class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    /// Feature weights
    pub coef: Vec<f64>,
    /// Bias term
    pub intercept: f64,
}

/// Logistic regression giving the probability of the positive class.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coef: Array1<f64>,
    intercept: f64,
}

impl LogisticRegression {
    /// Build a classifier from weights and bias.
    pub fn new(coef: Vec<f64>, intercept: f64) -> Result<Self> {
        if coef.iter().any(|w| !w.is_finite()) || !intercept.is_finite() {
            return Err(SentimentError::Config(
                "classifier weights must be finite".to_string(),
            ));
        }
        Ok(Self {
            coef: Array1::from(coef),
            intercept,
        })
    }

    /// Build a classifier from its serialized form.
    pub fn from_artifact(artifact: ClassifierArtifact) -> Result<Self> {
        Self::new(artifact.coef, artifact.intercept)
    }

    /// Load a JSON classifier export.
    pub fn load(path: &Path) -> Result<Self> {
        let artifact: ClassifierArtifact = read_artifact(path)?;
        Self::from_artifact(artifact).map_err(|e| SentimentError::ModelUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Number of weights.
    pub fn dimension(&self) -> usize {
        self.coef.len()
    }

    /// Linear score `x · coef + intercept`, accumulated in column order.
    pub fn decision(&self, features: &SparseVector) -> f64 {
        let dot = features
            .iter()
            .fold(0.0, |acc, &(column, value)| acc + value * self.coef[column]);
        dot + self.intercept
    }

    /// Probability that `features` belong to the positive class.
    pub fn positive_probability(&self, features: &SparseVector) -> f64 {
        sigmoid(self.decision(features))
    }
}

/// Logistic function.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
