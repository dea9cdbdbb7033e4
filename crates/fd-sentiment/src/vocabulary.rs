//! Ticker vocabulary and exclusion words.
//!
//! The vocabulary is the set of symbols eligible for matching in a run: the
//! base list read from a CSV file unioned with a handful of manually tracked
//! symbols (mostly crypto). The exclusion set holds symbols that are also
//! common English words or forum noise; the matcher never reports them, even
//! when they are in the vocabulary.

use crate::{Result, SentimentError, config::VocabularyConfig};
use polars::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Symbols tracked on top of the CSV base list.
pub const DEFAULT_EXTRA_TICKERS: &[&str] =
    &["GME", "AMC", "BTC", "ETH", "SOL", "DOGE", "CRCL", "XRP", "SUI"];

/// Words that look like tickers but are almost always plain English.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "A", "I", "IT", "AND", "THE", "TO", "OF", "IN", "ON", "FOR", "IS", "AT", "BY", "AN", "OR",
    "AS", "BE", "ARE", "WITH", "FROM", "THIS", "THAT", "BUT", "NOT", "SO", "DO", "IF", "NO",
    "YES", "ALL", "ANY", "CAN", "WAS", "HAS", "HAVE", "WILL", "JUST", "ABOUT", "OUT", "UP",
    "DOWN", "OVER", "UNDER", "MORE", "LESS", "THAN", "THEN", "NOW", "ONE", "TWO", "THREE",
    "FOUR", "FIVE", "SIX", "SEVEN", "EIGHT", "NINE", "TEN", "WELL", "DAY", "CEO",
];

/// Set of symbols recognized as tickers during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    symbols: HashSet<String>,
}

impl Vocabulary {
    /// Build a vocabulary from symbols, kept verbatim.
    pub fn new<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }

    /// Load the base list described by `config` and add its extra tickers.
    ///
    /// A missing or malformed ticker file does not stop the run: the error is
    /// logged and the vocabulary falls back to the extras alone.
    pub fn load(config: &VocabularyConfig) -> Self {
        let mut symbols = match load_symbols(
            &config.ticker_file,
            &config.fallback_dir,
            &config.symbol_column,
        ) {
            Ok(symbols) => {
                tracing::info!(count = symbols.len(), "loaded base ticker list");
                symbols
            }
            Err(e) => {
                tracing::warn!(error = %e, "ticker list unavailable, continuing with extras only");
                HashSet::new()
            }
        };
        symbols.extend(config.extra_tickers.iter().cloned());
        Self { symbols }
    }

    /// Whether `token` is a known symbol.
    pub fn contains(&self, token: &str) -> bool {
        self.symbols.contains(token)
    }

    /// The stored symbol equal to `token`, if any.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.symbols.get(token).map(String::as_str)
    }

    /// Iterate over the symbols in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the vocabulary has no symbols.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Symbols suppressed as common-word noise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    words: HashSet<String>,
}

impl ExclusionSet {
    /// Build an exclusion set from words, kept verbatim.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `token` is excluded.
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    /// Number of excluded words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether nothing is excluded.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Read the unique values of `column` from a CSV ticker file.
///
/// `path` is tried as given, then inside `fallback_dir`. Symbols are kept
/// exactly as written; entries containing lowercase letters can never match
/// the uppercased comment tokens and are reported with a warning.
pub fn load_symbols(path: &Path, fallback_dir: &Path, column: &str) -> Result<HashSet<String>> {
    let resolved = resolve_source(path, fallback_dir)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(resolved.clone()))?
        .finish()?;

    let values = df
        .column(column)
        .map_err(|_| SentimentError::SchemaError {
            path: resolved.clone(),
            column: column.to_string(),
        })?
        .cast(&DataType::String)?;

    let symbols: HashSet<String> = values
        .as_materialized_series()
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

    let mixed_case = symbols
        .iter()
        .filter(|s| s.chars().any(char::is_lowercase))
        .count();
    if mixed_case > 0 {
        tracing::warn!(
            path = %resolved.display(),
            count = mixed_case,
            "ticker list has symbols with lowercase letters, they will never match"
        );
    }

    Ok(symbols)
}

/// First existing candidate among `path` and `fallback_dir/path`.
fn resolve_source(path: &Path, fallback_dir: &Path) -> Result<PathBuf> {
    let mut tried = vec![path.to_path_buf()];
    let fallback = fallback_dir.join(path);
    if fallback != path {
        tried.push(fallback);
    }

    match tried.iter().find(|candidate| candidate.is_file()) {
        Some(found) => Ok(found.clone()),
        None => Err(SentimentError::SourceNotFound { tried }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_symbols_unique() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "tickers.csv",
            "Symbol,Name\nAAPL,Apple\nMSFT,Microsoft\nAAPL,Apple again\n",
        );

        let symbols = load_symbols(&path, dir.path(), "Symbol").unwrap();
        assert_eq!(symbols.len(), 2);
        assert!(symbols.contains("AAPL"));
        assert!(symbols.contains("MSFT"));
    }

    #[test]
    fn test_load_symbols_fallback_dir() {
        let dir = tempfile::tempdir().unwrap();
        let backend = dir.path().join("backend");
        fs::create_dir(&backend).unwrap();
        write_csv(&backend, "fallback_only_tickers.csv", "Symbol\nNVDA\n");

        let symbols =
            load_symbols(Path::new("fallback_only_tickers.csv"), &backend, "Symbol").unwrap();
        assert!(symbols.contains("NVDA"));
    }

    #[test]
    fn test_load_symbols_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_symbols(Path::new("nowhere_tickers.csv"), dir.path(), "Symbol").unwrap_err();

        match err {
            SentimentError::SourceNotFound { tried } => assert_eq!(tried.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_symbols_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "tickers.csv", "Ticker,Name\nAAPL,Apple\n");

        let err = load_symbols(&path, dir.path(), "Symbol").unwrap_err();
        assert!(matches!(err, SentimentError::SchemaError { ref column, .. } if column == "Symbol"));
    }

    #[test]
    fn test_mixed_case_symbols_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "tickers.csv", "Symbol\nAAPL\nmsft\n");

        let symbols = load_symbols(&path, dir.path(), "Symbol").unwrap();
        assert!(symbols.contains("msft"));
        assert!(!symbols.contains("MSFT"));
    }

    #[test]
    fn test_vocabulary_load_degrades_to_extras() {
        let dir = tempfile::tempdir().unwrap();
        let config = VocabularyConfig {
            ticker_file: dir.path().join("absent.csv"),
            fallback_dir: dir.path().to_path_buf(),
            ..VocabularyConfig::default()
        };

        let vocabulary = Vocabulary::load(&config);
        assert_eq!(vocabulary.len(), DEFAULT_EXTRA_TICKERS.len());
        assert!(vocabulary.contains("GME"));
        assert!(!vocabulary.contains("AAPL"));
    }

    #[test]
    fn test_vocabulary_load_degrades_on_bad_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "tickers.csv", "Ticker\nAAPL\n");
        let config = VocabularyConfig {
            ticker_file: path,
            fallback_dir: dir.path().to_path_buf(),
            extra_tickers: vec!["BTC".to_string()],
            ..VocabularyConfig::default()
        };

        let vocabulary = Vocabulary::load(&config);
        assert_eq!(vocabulary.len(), 1);
        assert!(vocabulary.contains("BTC"));
    }

    #[test]
    fn test_vocabulary_load_unions_extras() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "tickers.csv", "Symbol\nAAPL\nGME\n");
        let config = VocabularyConfig {
            ticker_file: path,
            fallback_dir: dir.path().to_path_buf(),
            ..VocabularyConfig::default()
        };

        let vocabulary = Vocabulary::load(&config);
        assert!(vocabulary.contains("AAPL"));
        assert!(vocabulary.contains("ETH"));
        assert_eq!(vocabulary.len(), 1 + DEFAULT_EXTRA_TICKERS.len());
    }

    #[test]
    fn test_default_exclusions() {
        let exclusions = ExclusionSet::new(DEFAULT_EXCLUSIONS.iter().copied());
        assert!(exclusions.contains("CEO"));
        assert!(exclusions.contains("ALL"));
        assert!(!exclusions.contains("AAPL"));
    }
}
