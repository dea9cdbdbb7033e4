//! Sentiment inference.
//!
//! The production model is a TF-IDF vectorizer feeding a binary logistic
//! regression, both exported as JSON from the training environment and loaded
//! once per process. Any other [`SentimentModel`] can stand in for it.
//!
//! Per-ticker scores are the mean of the per-comment positive probabilities.
//! The mean uses the same pairwise summation as numpy's float64 reduction so
//! that scores match the historical series bit for bit.

pub mod classifier;
pub mod vectorizer;

pub use classifier::{ClassifierArtifact, LogisticRegression, sigmoid};
pub use vectorizer::{TfidfVectorizer, VectorizerArtifact};

use crate::{Result, SentimentError, traits::SentimentModel};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Sparse feature row: `(column, value)` pairs in ascending column order.
pub type SparseVector = Vec<(usize, f64)>;

/// Block size below which pairwise summation unrolls into 8 accumulators.
const PAIRWISE_BLOCK: usize = 128;

/// TF-IDF features scored by logistic regression.
#[derive(Debug, Clone)]
pub struct TfidfLogisticModel {
    vectorizer: TfidfVectorizer,
    classifier: LogisticRegression,
}

impl TfidfLogisticModel {
    /// Pair a vectorizer with a classifier of the same width.
    pub fn new(vectorizer: TfidfVectorizer, classifier: LogisticRegression) -> Result<Self> {
        if vectorizer.dimension() != classifier.dimension() {
            return Err(SentimentError::Config(format!(
                "classifier has {} weights but the vectorizer produces {} features",
                classifier.dimension(),
                vectorizer.dimension()
            )));
        }
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Load both artifacts. Any failure is [`SentimentError::ModelUnavailable`].
    pub fn load(vectorizer_path: &Path, classifier_path: &Path) -> Result<Self> {
        let vectorizer = TfidfVectorizer::load(vectorizer_path)?;
        let classifier = LogisticRegression::load(classifier_path)?;
        let model = Self::new(vectorizer, classifier).map_err(|e| {
            SentimentError::ModelUnavailable {
                path: classifier_path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        tracing::info!(
            features = model.vectorizer.dimension(),
            terms = model.vectorizer.vocabulary_len(),
            "loaded sentiment model"
        );
        Ok(model)
    }

    /// The vectorizer half.
    pub const fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// The classifier half.
    pub const fn classifier(&self) -> &LogisticRegression {
        &self.classifier
    }

    /// Positive probability of one cleaned comment.
    pub fn score(&self, cleaned: &str) -> f64 {
        self.classifier
            .positive_probability(&self.vectorizer.transform(cleaned))
    }
}

impl SentimentModel for TfidfLogisticModel {
    fn name(&self) -> &str {
        "tfidf_logistic"
    }

    fn positive_probabilities(&self, cleaned: &[String]) -> Result<Vec<f64>> {
        Ok(cleaned.iter().map(|text| self.score(text)).collect())
    }
}

/// Read a JSON artifact, mapping every failure to `ModelUnavailable`.
pub(crate) fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let unavailable = |reason: String| SentimentError::ModelUnavailable {
        path: path.to_path_buf(),
        reason,
    };
    let content = std::fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| unavailable(e.to_string()))
}

/// Sum with numpy's pairwise algorithm.
pub fn pairwise_sum(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 8 {
        values.iter().fold(0.0, |acc, v| acc + v)
    } else if n <= PAIRWISE_BLOCK {
        let mut r = [0.0f64; 8];
        r.copy_from_slice(&values[..8]);
        let blocked = n - n % 8;
        for chunk in values[8..blocked].chunks_exact(8) {
            for (acc, v) in r.iter_mut().zip(chunk) {
                *acc += v;
            }
        }
        let mut res = ((r[0] + r[1]) + (r[2] + r[3])) + ((r[4] + r[5]) + (r[6] + r[7]));
        for v in &values[blocked..] {
            res += v;
        }
        res
    } else {
        let mut half = n / 2;
        half -= half % 8;
        pairwise_sum(&values[..half]) + pairwise_sum(&values[half..])
    }
}

/// Arithmetic mean of per-comment probabilities, `None` when there are none.
pub fn mean_probability(probabilities: &[f64]) -> Option<f64> {
    if probabilities.is_empty() {
        return None;
    }
    Some(pairwise_sum(probabilities) / probabilities.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn model() -> TfidfLogisticModel {
        let vectorizer = TfidfVectorizer::new(
            HashMap::from([("moon".to_string(), 0), ("crash".to_string(), 1)]),
            vec![1.0, 1.0],
        )
        .unwrap();
        let classifier = LogisticRegression::new(vec![3.0, -3.0], 0.0).unwrap();
        TfidfLogisticModel::new(vectorizer, classifier).unwrap()
    }

    #[test]
    fn test_scores_follow_polarity() {
        let m = model();
        let probs = m
            .positive_probabilities(&["moon".to_string(), "crash".to_string(), String::new()])
            .unwrap();

        assert_relative_eq!(probs[0], sigmoid(3.0));
        assert_relative_eq!(probs[1], sigmoid(-3.0));
        assert_relative_eq!(probs[2], 0.5);
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let vectorizer =
            TfidfVectorizer::new(HashMap::from([("moon".to_string(), 0)]), vec![1.0]).unwrap();
        let classifier = LogisticRegression::new(vec![1.0, 2.0], 0.0).unwrap();
        assert!(TfidfLogisticModel::new(vectorizer, classifier).is_err());
    }

    #[test]
    fn test_load_reports_model_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let vec_path = dir.path().join("vectorizer.json");
        let clf_path = dir.path().join("classifier.json");
        std::fs::write(&vec_path, r#"{"vocabulary": {"moon": 0}, "idf": [1.0]}"#).unwrap();

        let missing = TfidfLogisticModel::load(&vec_path, &clf_path).unwrap_err();
        assert!(matches!(missing, SentimentError::ModelUnavailable { ref path, .. } if path == &clf_path));

        std::fs::write(&clf_path, r#"{"coef": [1.0, 2.0], "intercept": 0.0}"#).unwrap();
        let mismatch = TfidfLogisticModel::load(&vec_path, &clf_path).unwrap_err();
        assert!(matches!(mismatch, SentimentError::ModelUnavailable { .. }));

        std::fs::write(&clf_path, r#"{"coef": [1.0], "intercept": 0.0}"#).unwrap();
        assert!(TfidfLogisticModel::load(&vec_path, &clf_path).is_ok());
    }

    #[test]
    fn test_mean_probability() {
        assert_eq!(mean_probability(&[]), None);
        assert_eq!(mean_probability(&[0.9, 0.9]), Some(0.9));
        assert_eq!(mean_probability(&[0.55, 0.55]), Some(0.55));
        assert_relative_eq!(mean_probability(&[0.2, 0.4, 0.9]).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_pairwise_sum_small_is_sequential() {
        let values = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        let sequential = values.iter().fold(0.0, |acc, v| acc + v);
        assert_eq!(pairwise_sum(&values).to_bits(), sequential.to_bits());
    }

    #[test]
    fn test_pairwise_sum_unrolled_order() {
        let values: Vec<f64> = (0..19).map(|i| 0.1 * i as f64 + 0.013).collect();
        let mut r = [0.0; 8];
        for (i, v) in values[..16].iter().enumerate() {
            r[i % 8] += v;
        }
        let mut expected = ((r[0] + r[1]) + (r[2] + r[3])) + ((r[4] + r[5]) + (r[6] + r[7]));
        for v in &values[16..] {
            expected += v;
        }
        assert_eq!(pairwise_sum(&values).to_bits(), expected.to_bits());
    }

    #[test]
    fn test_pairwise_sum_large() {
        let values: Vec<f64> = (0..1000).map(|i| (i % 7) as f64 * 0.125).collect();
        let exact: f64 = (0..1000).map(|i| (i % 7) as f64 * 0.125).sum();
        assert_eq!(pairwise_sum(&values), exact);
    }
}
