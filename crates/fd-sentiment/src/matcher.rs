//! Ticker recognition in raw comment text.
//!
//! Matching is plain token lookup: uppercase the comment, split on
//! whitespace, trim a few punctuation characters from both ends of each token
//! and look the result up in the vocabulary. Tokens in the exclusion set are
//! never hits, even when they are valid symbols, so `ALL` or `CEO` typed as
//! words do not count as mentions.

use crate::vocabulary::{ExclusionSet, Vocabulary};

/// Characters trimmed from both ends of every token.
pub const TRIM_CHARS: &[char] = &['.', ',', '?', '!', '-', '$'];

/// Default upper bound on comment length, in characters.
pub const DEFAULT_MAX_COMMENT_CHARS: usize = 10_000;

/// Token separator: Unicode whitespace plus the ASCII information separators
/// (U+001C..=U+001F), which forum dumps occasionally carry.
pub(crate) fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Trim [`TRIM_CHARS`] from both ends of `token`.
pub fn strip_punctuation(token: &str) -> &str {
    token.trim_matches(TRIM_CHARS)
}

/// Finds ticker mentions in comments.
#[derive(Debug, Clone)]
pub struct TickerMatcher {
    vocabulary: Vocabulary,
    exclusions: ExclusionSet,
    max_comment_chars: usize,
}

impl TickerMatcher {
    /// Create a matcher with the default comment length limit.
    pub const fn new(vocabulary: Vocabulary, exclusions: ExclusionSet) -> Self {
        Self {
            vocabulary,
            exclusions,
            max_comment_chars: DEFAULT_MAX_COMMENT_CHARS,
        }
    }

    /// Skip comments longer than `max` characters.
    pub const fn with_max_comment_chars(mut self, max: usize) -> Self {
        self.max_comment_chars = max;
        self
    }

    /// Whether an already uppercased and trimmed token counts as a mention.
    pub fn is_ticker(&self, token: &str) -> bool {
        self.vocabulary.contains(token) && !self.exclusions.contains(token)
    }

    /// Every ticker mention in `comment`, in order of appearance.
    ///
    /// A ticker repeated in the comment is returned once per occurrence.
    /// Comments over the length limit yield nothing.
    pub fn extract(&self, comment: &str) -> Vec<&str> {
        if comment.len() > self.max_comment_chars
            && comment.chars().count() > self.max_comment_chars
        {
            tracing::trace!(
                chars = comment.chars().count(),
                limit = self.max_comment_chars,
                "skipping oversized comment"
            );
            return Vec::new();
        }

        let upper = comment.to_uppercase();
        upper
            .split(is_separator)
            .filter(|raw| !raw.is_empty())
            .map(strip_punctuation)
            .filter(|token| !self.exclusions.contains(token))
            .filter_map(|token| self.vocabulary.get(token))
            .collect()
    }

    /// The symbols this matcher recognizes.
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// The words this matcher suppresses.
    pub const fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Comment length limit in characters.
    pub const fn max_comment_chars(&self) -> usize {
        self.max_comment_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::DEFAULT_EXCLUSIONS;
    use rstest::rstest;

    fn matcher(symbols: &[&str], excluded: &[&str]) -> TickerMatcher {
        TickerMatcher::new(
            Vocabulary::new(symbols.iter().copied()),
            ExclusionSet::new(excluded.iter().copied()),
        )
    }

    #[rstest]
    #[case("$AAPL", "AAPL")]
    #[case("TSLA!!", "TSLA")]
    #[case("-GME-", "GME")]
    #[case("BTC?.,", "BTC")]
    #[case("$$$", "")]
    #[case("(NVDA)", "(NVDA)")]
    #[case("AMC'S", "AMC'S")]
    fn test_strip_punctuation(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(strip_punctuation(raw), expected);
    }

    #[test]
    fn test_repeated_ticker_counts_twice() {
        let m = matcher(&["AAPL"], &[]);
        let hits = m.extract("AAPL to the moon!! $AAPL is king");
        assert_eq!(hits, vec!["AAPL", "AAPL"]);
    }

    #[test]
    fn test_excluded_word_not_reported() {
        let m = matcher(&["CEO"], &["CEO"]);
        assert!(m.extract("I think the CEO is doing well").is_empty());
    }

    #[test]
    fn test_exclusion_wins_for_every_default_word() {
        let m = matcher(DEFAULT_EXCLUSIONS, DEFAULT_EXCLUSIONS);
        let comment = DEFAULT_EXCLUSIONS.join(" ");
        assert!(m.extract(&comment).is_empty());
        for word in DEFAULT_EXCLUSIONS {
            assert!(!m.is_ticker(word));
        }
    }

    #[test]
    fn test_comment_is_uppercased() {
        let m = matcher(&["TSLA", "GME"], &[]);
        assert_eq!(m.extract("tsla and gme, tsla."), vec!["TSLA", "GME", "TSLA"]);
    }

    #[test]
    fn test_multiple_tickers_in_order() {
        let m = matcher(&["BTC", "ETH", "SOL"], &[]);
        assert_eq!(m.extract("sold ETH for BTC\nthen $SOL"), vec!["ETH", "BTC", "SOL"]);
    }

    #[test]
    fn test_information_separator_splits_tokens() {
        let m = matcher(&["AMD", "INTC"], &[]);
        assert_eq!(m.extract("AMD\u{1f}INTC"), vec!["AMD", "INTC"]);
    }

    #[test]
    fn test_partial_words_do_not_match() {
        let m = matcher(&["AMD"], &[]);
        assert_eq!(m.extract("AMDs are AMD-like? not AMDX but AMD."), vec!["AMD"]);
    }

    #[test]
    fn test_oversized_comment_skipped() {
        let m = matcher(&["GME"], &[]).with_max_comment_chars(10);
        assert!(m.extract("GME GME GME GME").is_empty());
        assert_eq!(m.extract("GME GME").len(), 2);
    }

    #[test]
    fn test_length_limit_counts_characters() {
        let m = matcher(&["GME"], &[]).with_max_comment_chars(6);
        // 6 characters, 8 bytes
        assert_eq!(m.extract("GME éé").len(), 1);
    }

    #[test]
    fn test_empty_vocabulary_matches_nothing() {
        let m = matcher(&[], &[]);
        assert!(m.extract("AAPL MSFT GOOG").is_empty());
    }
}
