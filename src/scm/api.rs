//! Source-control API trait and wire-independent types

use super::reference::RepoRef;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

/// Kind of a repository entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry in a tree or directory listing
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// Path relative to the repository root
    pub path: String,
    pub kind: EntryKind,
}

/// Source-control call failures
#[derive(Debug, Error)]
pub enum ScmError {
    /// Transport-level failure or non-success status
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response parsed but did not have the expected shape
    #[error("unexpected payload: {0}")]
    Payload(String),

    /// File content could not be decoded
    #[error("content decode failed: {0}")]
    Decode(String),
}

/// Read-only view of a hosted repository
///
/// Implementations own transport concerns (client reuse, auth headers,
/// base64 decoding); callers only see decoded values.
#[async_trait]
pub trait SourceControlApi: Send + Sync {
    /// Recursive listing of the default branch
    async fn default_branch_tree(&self, repo: &RepoRef) -> Result<Vec<TreeEntry>, ScmError>;

    /// Immediate children of `path` ("" for the repository root)
    async fn list_dir(&self, repo: &RepoRef, path: &str) -> Result<Vec<TreeEntry>, ScmError>;

    /// Decoded content of the file at `path`
    async fn file_content(&self, repo: &RepoRef, path: &str) -> Result<String, ScmError>;

    /// Decoded README content
    async fn readme(&self, repo: &RepoRef) -> Result<String, ScmError>;

    /// Language name → byte count
    async fn languages(&self, repo: &RepoRef) -> Result<BTreeMap<String, u64>, ScmError>;

    /// Messages of the most recent commits, newest first
    async fn recent_commit_messages(&self, repo: &RepoRef) -> Result<Vec<String>, ScmError>;

    /// File names of CI/CD workflow definitions
    async fn workflow_files(&self, repo: &RepoRef) -> Result<Vec<String>, ScmError>;

    /// When the repository was last updated
    async fn last_updated(&self, repo: &RepoRef) -> Result<DateTime<Utc>, ScmError>;
}
