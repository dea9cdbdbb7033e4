//! Scored snapshot values and the in-memory sink.

use crate::{Result, SentimentLabel, traits::SnapshotSink};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Sentiment of one ticker at the end of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSnapshot {
    /// Uppercase ticker symbol
    pub ticker: String,
    /// Comments that mentioned the ticker during the run
    pub mention_count: usize,
    /// Normalized score in `[0, 1]`
    pub sentiment_score: f64,
    /// Label derived from `sentiment_score`
    pub sentiment_label: SentimentLabel,
    /// Run timestamp, shared by every snapshot of the run
    pub timestamp: DateTime<Utc>,
}

/// Current time truncated to whole seconds.
pub fn run_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Keeps every appended snapshot in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    snapshots: Vec<ScoredSnapshot>,
    batches: usize,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything appended so far, in append order.
    pub fn snapshots(&self) -> &[ScoredSnapshot] {
        &self.snapshots
    }

    /// Number of `append` calls.
    pub const fn batches(&self) -> usize {
        self.batches
    }
}

impl SnapshotSink for MemorySink {
    fn append(&mut self, snapshots: &[ScoredSnapshot]) -> Result<()> {
        self.snapshots.extend_from_slice(snapshots);
        self.batches += 1;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
