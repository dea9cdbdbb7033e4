//! Text normalization ahead of vectorization.
//!
//! Comments are reduced to lowercase stemmed words with punctuation, digits
//! and stopwords removed, matching the preprocessing the classifier was
//! trained with.

pub mod cleaner;
pub mod porter;
pub mod stopwords;

pub use cleaner::{clean_all, clean_text};
pub use porter::stem;
pub use stopwords::{ENGLISH_STOPWORDS, is_stopword};
