//! Batch runs.
//!
//! A [`SentimentContext`] holds everything that is loaded once per process:
//! the ticker matcher with its vocabulary, the sentiment model, and the
//! normalization policy. It is immutable after construction and is shared by
//! reference across runs. Each [`SentimentContext::run`] builds its own
//! aggregation state, so runs never observe each other.

use crate::{
    MentionAggregator, MentionRecord, NormalizationPolicy, Result, ScoredSnapshot,
    SentimentError, TfidfLogisticModel,
    config::{PipelineConfig, SourceConfig},
    matcher::TickerMatcher,
    model::mean_probability,
    snapshot::run_timestamp,
    text::clean_all,
    traits::{CommentSource, SentimentModel, SnapshotSink},
    vocabulary::{ExclusionSet, Vocabulary},
};
use chrono::{DateTime, Utc};

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Snapshots handed to the sink, in ticker order
    pub snapshots: Vec<ScoredSnapshot>,
    /// Posts whose comments were read
    pub posts_read: usize,
    /// Comments passed through the matcher
    pub comments_seen: usize,
    /// Subreddit listings or posts that could not be fetched
    pub fetch_failures: usize,
    /// Run timestamp shared by every snapshot
    pub timestamp: DateTime<Utc>,
}

/// Process-scoped state for sentiment runs.
#[derive(Debug)]
pub struct SentimentContext {
    matcher: TickerMatcher,
    model: Box<dyn SentimentModel>,
    policy: NormalizationPolicy,
}

impl SentimentContext {
    /// Assemble a context from already built parts.
    pub fn new(
        matcher: TickerMatcher,
        model: Box<dyn SentimentModel>,
        policy: NormalizationPolicy,
    ) -> Self {
        Self {
            matcher,
            model,
            policy,
        }
    }

    /// Load the vocabulary and model described by `config`.
    ///
    /// A missing ticker file only degrades the vocabulary; a missing or
    /// malformed model is fatal.
    pub fn initialize(config: &PipelineConfig) -> Result<Self> {
        let vocabulary = Vocabulary::load(&config.vocabulary);
        let exclusions = ExclusionSet::new(config.vocabulary.exclusions.iter().cloned());
        let matcher = TickerMatcher::new(vocabulary, exclusions)
            .with_max_comment_chars(config.matcher.max_comment_chars);

        let model = TfidfLogisticModel::load(
            &config.model.vectorizer_path,
            &config.model.classifier_path,
        )?;

        tracing::info!(
            tickers = matcher.vocabulary().len(),
            exclusions = matcher.exclusions().len(),
            policy = %config.scoring.policy,
            "sentiment context ready"
        );
        Ok(Self::new(matcher, Box::new(model), config.scoring.policy))
    }

    /// The ticker matcher.
    pub const fn matcher(&self) -> &TickerMatcher {
        &self.matcher
    }

    /// The sentiment model.
    pub fn model(&self) -> &dyn SentimentModel {
        self.model.as_ref()
    }

    /// Normalization policy applied to every ticker.
    pub const fn policy(&self) -> NormalizationPolicy {
        self.policy
    }

    /// Scan `config.subreddits`, score every mentioned ticker, and append the
    /// snapshots to `sink` in a single call.
    ///
    /// Fetch failures are logged and skipped. Any other error aborts the run
    /// before the sink is touched.
    pub fn run<C, S>(&self, source: &mut C, config: &SourceConfig, sink: &mut S) -> Result<RunSummary>
    where
        C: CommentSource + ?Sized,
        S: SnapshotSink + ?Sized,
    {
        let timestamp = run_timestamp();
        let mut aggregator = MentionAggregator::new();
        let (posts_read, fetch_failures) = self.collect(source, config, &mut aggregator);
        let comments_seen = aggregator.comments_seen();

        tracing::info!(
            posts = posts_read,
            comments = comments_seen,
            tickers = aggregator.len(),
            mentions = aggregator.total_mentions(),
            "collected mentions"
        );

        let snapshots = self.score_records(aggregator.into_records(), timestamp)?;
        sink.append(&snapshots)?;
        tracing::info!(
            snapshots = snapshots.len(),
            backend = sink.backend_type(),
            "run complete"
        );

        Ok(RunSummary {
            snapshots,
            posts_read,
            comments_seen,
            fetch_failures,
            timestamp,
        })
    }

    /// Feed every reachable comment through the matcher.
    ///
    /// Returns `(posts_read, fetch_failures)`.
    fn collect<C>(
        &self,
        source: &mut C,
        config: &SourceConfig,
        aggregator: &mut MentionAggregator,
    ) -> (usize, usize)
    where
        C: CommentSource + ?Sized,
    {
        let mut posts_read = 0;
        let mut failures = 0;

        for subreddit in &config.subreddits {
            let posts = match source.posts(subreddit, config.post_limit) {
                Ok(posts) => posts,
                Err(e) => {
                    tracing::warn!(%subreddit, error = %e, "skipping subreddit");
                    failures += 1;
                    continue;
                }
            };
            tracing::debug!(%subreddit, posts = posts.len(), "processing subreddit");

            for post in &posts {
                match source.comments(post) {
                    Ok(comments) => {
                        posts_read += 1;
                        for comment in &comments {
                            aggregator.ingest(comment, &self.matcher);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(%subreddit, post = %post.id, error = %e, "skipping post");
                        failures += 1;
                    }
                }
            }
        }

        (posts_read, failures)
    }

    /// Score aggregated records, skipping tickers without comments.
    pub fn score_records<I>(
        &self,
        records: I,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<ScoredSnapshot>>
    where
        I: IntoIterator<Item = (String, MentionRecord)>,
    {
        let mut snapshots = Vec::new();
        for (ticker, record) in records {
            if record.mention_count() == 0 {
                continue;
            }
            let Some(raw) = self.raw_score(&ticker, &record)? else {
                continue;
            };
            let normalized = self.policy.normalize(raw);
            tracing::debug!(
                %ticker,
                mentions = record.mention_count(),
                raw,
                score = normalized.score,
                label = %normalized.label,
                "scored ticker"
            );

            snapshots.push(ScoredSnapshot {
                ticker,
                mention_count: record.mention_count(),
                sentiment_score: normalized.score,
                sentiment_label: normalized.label,
                timestamp,
            });
        }
        Ok(snapshots)
    }

    /// Mean positive probability of a record's cleaned comments.
    fn raw_score(&self, ticker: &str, record: &MentionRecord) -> Result<Option<f64>> {
        let cleaned = clean_all(record.comments());
        let probabilities = self.model.positive_probabilities(&cleaned)?;
        if probabilities.len() != cleaned.len() {
            return Err(SentimentError::Config(format!(
                "model '{}' returned {} probabilities for {} comments of {}",
                self.model.name(),
                probabilities.len(),
                cleaned.len(),
                ticker
            )));
        }
        Ok(mean_probability(&probabilities))
    }
}
