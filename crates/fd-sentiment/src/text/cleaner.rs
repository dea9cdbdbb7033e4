//! Canonical text form fed to the vectorizer.

use super::{porter, stopwords::is_stopword};
use crate::matcher::is_separator;

/// Normalize a raw comment for vectorization.
///
/// Steps, in order: keep only ASCII letters and whitespace, lowercase, split
/// on whitespace, drop stopwords, stem, join with single spaces. An empty
/// result is valid and means the comment carries no usable words.
pub fn clean_text(raw: &str) -> String {
    let letters: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || is_separator(*c))
        .map(|c| c.to_ascii_lowercase())
        .collect();

    letters
        .split(is_separator)
        .filter(|token| !token.is_empty() && !is_stopword(token))
        .map(porter::stem)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean every comment in order.
pub fn clean_all<S: AsRef<str>>(comments: &[S]) -> Vec<String> {
    comments.iter().map(|c| clean_text(c.as_ref())).collect()
}
