//! Per-ticker mention aggregation.
//!
//! Each hit of a ticker in a comment appends that comment to the ticker's
//! record once, so a comment naming `GME` three times weighs three times as
//! much in the mean score later on. Comment text is shared between records
//! rather than copied.

use crate::matcher::TickerMatcher;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Mentions of one ticker during a run.
///
/// The mention count is the length of the comment list, so the two can never
/// disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionRecord {
    comments: Vec<Arc<str>>,
}

impl MentionRecord {
    /// Number of mentions.
    pub fn mention_count(&self) -> usize {
        self.comments.len()
    }

    /// Comments that produced the mentions, in processing order.
    pub fn comments(&self) -> &[Arc<str>] {
        &self.comments
    }

    /// Consume the record, yielding its comments.
    pub fn into_comments(self) -> Vec<Arc<str>> {
        self.comments
    }

    fn push(&mut self, comment: Arc<str>) {
        self.comments.push(comment);
    }
}

/// Builds ticker → [`MentionRecord`] for a single run.
#[derive(Debug, Default)]
pub struct MentionAggregator {
    records: BTreeMap<String, MentionRecord>,
    comments_seen: usize,
}

impl MentionAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every hit found in `comment`.
    pub fn observe(&mut self, comment: &str, hits: &[&str]) {
        self.comments_seen += 1;
        if hits.is_empty() {
            return;
        }

        let shared: Arc<str> = Arc::from(comment);
        for ticker in hits {
            match self.records.get_mut(*ticker) {
                Some(record) => record.push(Arc::clone(&shared)),
                None => {
                    let mut record = MentionRecord::default();
                    record.push(Arc::clone(&shared));
                    self.records.insert((*ticker).to_string(), record);
                }
            }
        }
    }

    /// Extract hits from `comment` with `matcher` and record them.
    ///
    /// Returns the number of hits.
    pub fn ingest(&mut self, comment: &str, matcher: &TickerMatcher) -> usize {
        let hits = matcher.extract(comment);
        self.observe(comment, &hits);
        hits.len()
    }

    /// Record for `ticker`, if it has been mentioned.
    pub fn get(&self, ticker: &str) -> Option<&MentionRecord> {
        self.records.get(ticker)
    }

    /// Number of distinct tickers mentioned.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no ticker has been mentioned.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of comments observed, with or without hits.
    pub const fn comments_seen(&self) -> usize {
        self.comments_seen
    }

    /// Total mentions across all tickers.
    pub fn total_mentions(&self) -> usize {
        self.records.values().map(MentionRecord::mention_count).sum()
    }

    /// Consume the aggregator, yielding records in ticker order.
    pub fn into_records(self) -> impl Iterator<Item = (String, MentionRecord)> {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::{ExclusionSet, Vocabulary};

    fn assert_invariant(aggregator: &MentionAggregator) {
        for (_, record) in aggregator.records.iter() {
            assert_eq!(record.mention_count(), record.comments().len());
        }
    }

    #[test]
    fn test_first_hit_initializes_record() {
        let mut agg = MentionAggregator::new();
        assert!(agg.get("TSLA").is_none());

        agg.observe("TSLA calls", &["TSLA"]);
        let record = agg.get("TSLA").unwrap();
        assert_eq!(record.mention_count(), 1);
        assert_eq!(&*record.comments()[0], "TSLA calls");
        assert_invariant(&agg);
    }

    #[test]
    fn test_repeated_ticker_appends_comment_per_hit() {
        let mut agg = MentionAggregator::new();
        agg.observe("GME GME GME", &["GME", "GME", "GME"]);

        let record = agg.get("GME").unwrap();
        assert_eq!(record.mention_count(), 3);
        assert!(record.comments().iter().all(|c| &**c == "GME GME GME"));
        assert_invariant(&agg);
    }

    #[test]
    fn test_comment_shared_across_tickers() {
        let mut agg = MentionAggregator::new();
        agg.observe("BTC over ETH", &["BTC", "ETH"]);
        agg.observe("ETH flipping", &["ETH"]);

        assert_eq!(agg.get("BTC").unwrap().mention_count(), 1);
        let eth = agg.get("ETH").unwrap();
        assert_eq!(eth.mention_count(), 2);
        assert_eq!(&*eth.comments()[0], "BTC over ETH");
        assert_eq!(&*eth.comments()[1], "ETH flipping");
        assert!(Arc::ptr_eq(
            &agg.get("BTC").unwrap().comments()[0],
            &eth.comments()[0]
        ));
        assert_eq!(agg.total_mentions(), 3);
        assert_invariant(&agg);
    }

    #[test]
    fn test_comments_without_hits_leave_no_record() {
        let mut agg = MentionAggregator::new();
        agg.observe("nothing to see", &[]);
        assert!(agg.is_empty());
        assert_eq!(agg.comments_seen(), 1);
    }

    #[test]
    fn test_ingest_uses_matcher() {
        let matcher = TickerMatcher::new(
            Vocabulary::new(["AAPL", "ALL"]),
            ExclusionSet::new(["ALL"]),
        );
        let mut agg = MentionAggregator::new();

        assert_eq!(agg.ingest("AAPL to the moon!! $AAPL is king", &matcher), 2);
        assert_eq!(agg.ingest("ALL in on nothing", &matcher), 0);

        assert_eq!(agg.len(), 1);
        assert_eq!(agg.get("AAPL").unwrap().mention_count(), 2);
        assert!(agg.get("ALL").is_none());
        assert_invariant(&agg);
    }

    #[test]
    fn test_into_records_sorted_by_ticker() {
        let mut agg = MentionAggregator::new();
        agg.observe("x", &["TSLA"]);
        agg.observe("y", &["AMD"]);
        agg.observe("z", &["NVDA"]);

        let tickers: Vec<String> = agg.into_records().map(|(t, _)| t).collect();
        assert_eq!(tickers, vec!["AMD", "NVDA", "TSLA"]);
    }
}
