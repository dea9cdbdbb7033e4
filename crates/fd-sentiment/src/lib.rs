#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/sentiment/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod config;
pub mod error;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod text;
pub mod traits;
pub mod vocabulary;

// Re-export core types
pub use aggregate::{MentionAggregator, MentionRecord};
pub use config::PipelineConfig;
pub use error::{Result, SentimentError};
pub use matcher::TickerMatcher;
pub use model::TfidfLogisticModel;
pub use normalize::{NormalizationPolicy, NormalizedScore, SentimentLabel};
pub use pipeline::{RunSummary, SentimentContext};
pub use snapshot::{MemorySink, ScoredSnapshot};
pub use source::JsonDirectorySource;
pub use store::{HistoryPoint, SqliteSnapshotStore};
pub use text::clean_text;
pub use traits::{CommentSource, PostRef, SentimentModel, SnapshotSink};
pub use vocabulary::{ExclusionSet, Vocabulary};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
