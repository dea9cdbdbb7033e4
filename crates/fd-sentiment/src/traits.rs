//! Collaborator seams of the pipeline.
//!
//! A run reads comments through a [`CommentSource`], scores them with a
//! [`SentimentModel`] and hands the results to a [`SnapshotSink`]. The bundled
//! implementations are file- and SQLite-backed; anything else (a live API
//! client, another store) plugs in by implementing these traits.

use crate::{Result, ScoredSnapshot};

/// A post whose comments can be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRef {
    /// Subreddit the post belongs to
    pub subreddit: String,
    /// Source-specific identifier
    pub id: String,
    /// Post title
    pub title: String,
}

/// Supplies posts and their comment bodies.
pub trait CommentSource {
    /// Up to `limit` posts of `subreddit`, in source order.
    fn posts(&mut self, subreddit: &str, limit: usize) -> Result<Vec<PostRef>>;

    /// Every comment body of `post`.
    fn comments(&mut self, post: &PostRef) -> Result<Vec<String>>;
}

/// Maps cleaned comments to positive-class probabilities.
///
/// Must be deterministic for a fixed set of weights: the same cleaned text
/// always yields the same probability.
pub trait SentimentModel: Send + Sync + std::fmt::Debug {
    /// Stable identifier, used in logs.
    fn name(&self) -> &str;

    /// One probability in `[0, 1]` per input, in input order.
    fn positive_probabilities(&self, cleaned: &[String]) -> Result<Vec<f64>>;
}

/// Destination of scored snapshots.
///
/// Appends are at-least-once; sinks do not deduplicate.
pub trait SnapshotSink {
    /// Persist one run's snapshots. Either all are written or none.
    fn append(&mut self, snapshots: &[ScoredSnapshot]) -> Result<()>;

    /// Short backend name, used in logs.
    fn backend_type(&self) -> &'static str;
}
