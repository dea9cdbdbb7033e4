//! File-backed comment source.
//!
//! Layout: `<root>/<subreddit>/<post>.json`, each file holding
//! `{"title": "...", "comments": ["...", ...]}`. Posts are ordered by file
//! name, which lets a scraper that names files by rank or time control order.

use crate::{
    Result, SentimentError,
    traits::{CommentSource, PostRef},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct PostFile {
    #[serde(default)]
    title: String,
    comments: Vec<String>,
}

/// Reads posts and comments from a directory tree of JSON files.
///
/// Each post file is parsed once, when it is listed; `comments` hands out
/// the parsed bodies. A file that cannot be read or parsed is still listed,
/// and its `comments` call returns the [`SentimentError::Fetch`].
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    root: PathBuf,
    loaded: HashMap<PathBuf, std::result::Result<Vec<String>, String>>,
}

impl JsonDirectorySource {
    /// Source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            loaded: HashMap::new(),
        }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn post_path(&self, subreddit: &str, id: &str) -> PathBuf {
        self.root.join(subreddit).join(format!("{}.json", id))
    }

    fn read_post(path: &Path) -> std::result::Result<PostFile, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        serde_json::from_str(&content).map_err(|e| format!("{}: {}", path.display(), e))
    }
}

impl CommentSource for JsonDirectorySource {
    fn posts(&mut self, subreddit: &str, limit: usize) -> Result<Vec<PostRef>> {
        if subreddit.is_empty() || subreddit.contains(['/', '\\']) || subreddit == ".." {
            return Err(SentimentError::Fetch(format!(
                "invalid subreddit name '{}'",
                subreddit
            )));
        }

        let dir = self.root.join(subreddit);
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| SentimentError::Fetch(format!("{}: {}", dir.display(), e)))?;

        let mut ids: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        ids.sort();
        ids.truncate(limit);

        let mut posts = Vec::with_capacity(ids.len());
        for id in ids {
            let path = self.post_path(subreddit, &id);
            let title = match Self::read_post(&path) {
                Ok(post) => {
                    self.loaded.insert(path, Ok(post.comments));
                    post.title
                }
                Err(reason) => {
                    tracing::debug!(%reason, "post unreadable");
                    self.loaded.insert(path, Err(reason));
                    String::new()
                }
            };
            posts.push(PostRef {
                subreddit: subreddit.to_string(),
                id,
                title,
            });
        }
        Ok(posts)
    }

    fn comments(&mut self, post: &PostRef) -> Result<Vec<String>> {
        let path = self.post_path(&post.subreddit, &post.id);
        let loaded = match self.loaded.remove(&path) {
            Some(loaded) => loaded,
            None => Self::read_post(&path).map(|post| post.comments),
        };
        loaded.map_err(SentimentError::Fetch)
    }
}
