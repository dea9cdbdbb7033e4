//! TF-IDF vectorizer with a vocabulary fixed at training time.

use super::{SparseVector, read_artifact};
use crate::{Result, SentimentError};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Serialized form of a fitted vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    /// Term → column index
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per column
    pub idf: Vec<f64>,
}

/// Maps a document onto L2-normalized TF-IDF weights.
///
/// Tokens are runs of at least two word characters (alphanumeric or `_`)
/// after lowercasing. Terms outside the training vocabulary are ignored.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Array1<f64>,
}

impl TfidfVectorizer {
    /// Build a vectorizer from a vocabulary and its idf weights.
    pub fn new(vocabulary: HashMap<String, usize>, idf: Vec<f64>) -> Result<Self> {
        if let Some((term, index)) = vocabulary.iter().find(|(_, index)| **index >= idf.len()) {
            return Err(SentimentError::Config(format!(
                "term '{}' maps to column {} but only {} idf weights exist",
                term,
                index,
                idf.len()
            )));
        }
        if idf.iter().any(|w| !w.is_finite()) {
            return Err(SentimentError::Config(
                "idf weights must be finite".to_string(),
            ));
        }

        Ok(Self {
            vocabulary,
            idf: Array1::from(idf),
        })
    }

    /// Build a vectorizer from its serialized form.
    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self> {
        Self::new(artifact.vocabulary, artifact.idf)
    }

    /// Load a JSON vectorizer export.
    pub fn load(path: &Path) -> Result<Self> {
        let artifact: VectorizerArtifact = read_artifact(path)?;
        Self::from_artifact(artifact).map_err(|e| SentimentError::ModelUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Number of feature columns.
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    /// Number of vocabulary terms.
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Column of `term`, if it was seen during training.
    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Feature vector of `document`, ordered by column.
    ///
    /// A document without known terms maps to the empty vector.
    pub fn transform(&self, document: &str) -> SparseVector {
        let lowered = document.to_lowercase();
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokenize(&lowered) {
            if let Some(&column) = self.vocabulary.get(token) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut row: SparseVector = counts
            .into_iter()
            .map(|(column, count)| (column, count * self.idf[column]))
            .collect();

        let sum_of_squares = row.iter().fold(0.0, |acc, (_, v)| acc + v * v);
        if sum_of_squares != 0.0 {
            let norm = sum_of_squares.sqrt();
            for (_, v) in &mut row {
                *v /= norm;
            }
        }
        row
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Runs of two or more word characters.
fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_word_char(c))
        .filter(|token| token.chars().nth(1).is_some())
}
