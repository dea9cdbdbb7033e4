//! Pipeline configuration.
//!
//! Every section and field has a default, so an empty TOML document is a
//! valid configuration. Paths are used as given; relative paths resolve
//! against the working directory of the process.

use crate::{
    NormalizationPolicy, Result, SentimentError,
    matcher::DEFAULT_MAX_COMMENT_CHARS,
    vocabulary::{DEFAULT_EXCLUSIONS, DEFAULT_EXTRA_TICKERS},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Subreddits scanned when none are configured.
pub const DEFAULT_SUBREDDITS: &[&str] = &[
    "stocks",
    "stockmarket",
    "investing",
    "wallstreetbets",
    "cryptocurrency",
    "ethereum",
];

/// Top-level configuration for a sentiment run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Ticker vocabulary and exclusion words
    pub vocabulary: VocabularyConfig,
    /// Ticker matching limits
    pub matcher: MatcherConfig,
    /// Where comments come from
    pub source: SourceConfig,
    /// Trained model artifacts
    pub model: ModelConfig,
    /// Score normalization
    pub scoring: ScoringConfig,
    /// Snapshot persistence
    pub store: StoreConfig,
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            SentimentError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SentimentError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could work with.
    pub fn validate(&self) -> Result<()> {
        if self.vocabulary.symbol_column.is_empty() {
            return Err(SentimentError::Config(
                "vocabulary.symbol_column must not be empty".to_string(),
            ));
        }
        if self.matcher.max_comment_chars == 0 {
            return Err(SentimentError::Config(
                "matcher.max_comment_chars must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ticker vocabulary settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// CSV file holding the base ticker list
    pub ticker_file: PathBuf,
    /// Directory tried when `ticker_file` does not exist as given
    pub fallback_dir: PathBuf,
    /// Column holding the symbols
    pub symbol_column: String,
    /// Symbols added on top of the base list
    pub extra_tickers: Vec<String>,
    /// Words never reported as tickers
    pub exclusions: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            ticker_file: PathBuf::from("sp500_companies.csv"),
            fallback_dir: PathBuf::from("backend"),
            symbol_column: "Symbol".to_string(),
            extra_tickers: DEFAULT_EXTRA_TICKERS.iter().map(|s| s.to_string()).collect(),
            exclusions: DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Ticker matching settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Comments longer than this many characters are skipped
    pub max_comment_chars: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_comment_chars: DEFAULT_MAX_COMMENT_CHARS,
        }
    }
}

/// Comment source settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Root directory of a [`crate::JsonDirectorySource`]
    pub root: PathBuf,
    /// Subreddits scanned in order
    pub subreddits: Vec<String>,
    /// Posts fetched per subreddit
    pub post_limit: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("comments"),
            subreddits: DEFAULT_SUBREDDITS.iter().map(|s| s.to_string()).collect(),
            post_limit: 50,
        }
    }
}

/// Trained model artifact locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// TF-IDF vectorizer export
    pub vectorizer_path: PathBuf,
    /// Logistic regression export
    pub classifier_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vectorizer_path: PathBuf::from("tfidf_vectorizer.json"),
            classifier_path: PathBuf::from("sentiment_model.json"),
        }
    }
}

/// Score normalization settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Policy applied to every ticker of a run
    pub policy: NormalizationPolicy,
}

/// Snapshot store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("sentiment_history.db"),
        }
    }
}
