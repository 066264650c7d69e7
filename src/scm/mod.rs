//! Source-control integration
//!
//! Everything the pipeline knows about a repository comes through the
//! [`SourceControlApi`] trait: tree listings, file contents, language byte
//! counts, commits, workflows, and the last-updated timestamp. The
//! [`RepoCrawler`] fans six sub-analyses out over that interface and degrades
//! each one independently; the [`AnalyzerRegistry`] provides the shallow
//! per-language signature extraction the code-structure analysis relies on.

mod analyzer;
mod api;
mod crawler;
mod github;
mod mock;
mod reference;

pub use analyzer::AnalyzerRegistry;
pub use api::{EntryKind, ScmError, SourceControlApi, TreeEntry};
pub use crawler::{RepoCrawler, RepoSnapshot};
pub use github::GitHubApi;
pub use mock::MockSourceControl;
pub use reference::RepoRef;
