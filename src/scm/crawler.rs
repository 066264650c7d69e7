//! Repository crawler
//!
//! Resolves a repository URL and fans out six independent sub-analyses:
//! directory tree, language breakdown, code structure, README summary, recent
//! commits, and CI/CD workflows. The six run concurrently and join as a
//! barrier; every branch produces a result, substituting a fixed placeholder
//! when its calls fail. Fan-out isolation is the point: one broken endpoint
//! never costs the crawl.

use super::analyzer::AnalyzerRegistry;
use super::api::{EntryKind, SourceControlApi, TreeEntry};
use super::reference::RepoRef;
use crate::error::ServiceError;
use crate::llm::{GenerationRequest, PromptTemplate, TextGenClient};
use chrono::{DateTime, Utc};
use futures_util::future::{join_all, BoxFuture, FutureExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

const TREE_FALLBACK: &str = "directory tree unavailable";
const LANGUAGES_FALLBACK: &str = "language breakdown unavailable";
const README_FALLBACK: &str = "no README available or summary failed";
const COMMITS_FALLBACK: &str = "no recent commits";
const CICD_FALLBACK: &str = "no CI/CD workflows found";

/// The six joined sub-analysis results for one repository
#[derive(Debug, Clone)]
pub struct RepoSnapshot {
    pub directory_tree: String,
    pub languages: String,
    pub code_structure: String,
    pub readme_summary: String,
    pub commit_summary: String,
    pub ci_cd: String,
}

impl RepoSnapshot {
    /// Renders the snapshot as labeled sections for the summarization prompt
    pub fn into_sections(self) -> Vec<String> {
        vec![
            format!("[directory tree] {}", self.directory_tree),
            format!("[languages] {}", self.languages),
            format!("[code structure] {}", self.code_structure),
            format!("[README summary] {}", self.readme_summary),
            format!("[recent commits] {}", self.commit_summary),
            format!("[CI/CD] {}", self.ci_cd),
        ]
    }
}

/// Crawls a repository through the source-control API
pub struct RepoCrawler {
    scm: Arc<dyn SourceControlApi>,
    llm: Arc<dyn TextGenClient>,
    analyzers: AnalyzerRegistry,
}

impl RepoCrawler {
    pub fn new(scm: Arc<dyn SourceControlApi>, llm: Arc<dyn TextGenClient>) -> Self {
        Self {
            scm,
            llm,
            analyzers: AnalyzerRegistry::with_defaults(),
        }
    }

    /// Crawls the repository behind `url`
    ///
    /// # Errors
    ///
    /// Only URL parsing can fail here; every sub-analysis degrades to its
    /// placeholder instead of propagating.
    pub async fn crawl(&self, url: &str) -> Result<RepoSnapshot, ServiceError> {
        let repo = RepoRef::parse(url)?;
        info!(repo = %repo, "starting repository crawl");

        let (directory_tree, languages, code_structure, readme_summary, commit_summary, ci_cd) = tokio::join!(
            self.directory_tree(&repo),
            self.languages(&repo),
            self.code_structure(&repo),
            self.readme_summary(&repo),
            self.commit_summary(&repo),
            self.ci_cd(&repo),
        );

        Ok(RepoSnapshot {
            directory_tree,
            languages,
            code_structure,
            readme_summary,
            commit_summary,
            ci_cd,
        })
    }

    /// Whether the repository changed after the given instant
    pub async fn updated_since(
        &self,
        url: &str,
        instant: DateTime<Utc>,
    ) -> Result<bool, ServiceError> {
        let repo = RepoRef::parse(url)?;
        let updated_at = self
            .scm
            .last_updated(&repo)
            .await
            .map_err(|e| ServiceError::ExternalCallFailure(e.to_string()))?;
        Ok(updated_at > instant)
    }

    async fn directory_tree(&self, repo: &RepoRef) -> String {
        match self.scm.default_branch_tree(repo).await {
            Ok(entries) => {
                let mut out = String::new();
                for entry in entries {
                    match entry.kind {
                        EntryKind::Dir => out.push_str("[dir]  "),
                        EntryKind::File => out.push_str("[file] "),
                    }
                    out.push_str(&entry.path);
                    out.push('\n');
                }
                out
            }
            Err(e) => {
                warn!(repo = %repo, error = %e, "directory tree analysis failed");
                TREE_FALLBACK.to_string()
            }
        }
    }

    async fn languages(&self, repo: &RepoRef) -> String {
        match self.scm.languages(repo).await {
            Ok(languages) => {
                serde_json::to_string_pretty(&languages).unwrap_or_else(|_| String::new())
            }
            Err(e) => {
                warn!(repo = %repo, error = %e, "language analysis failed");
                LANGUAGES_FALLBACK.to_string()
            }
        }
    }

    async fn code_structure(&self, repo: &RepoRef) -> String {
        self.analyze_dir(repo, "").await
    }

    /// Recursive descent over one directory; siblings fan out concurrently
    fn analyze_dir<'a>(&'a self, repo: &'a RepoRef, path: &'a str) -> BoxFuture<'a, String> {
        async move {
            let entries = match self.scm.list_dir(repo, path).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(repo = %repo, path, error = %e, "code analysis failed");
                    return format!("code analysis failed: {}\n", path);
                }
            };

            let parts = join_all(
                entries
                    .into_iter()
                    .map(|entry| self.analyze_entry(repo, entry)),
            )
            .await;
            parts.concat()
        }
        .boxed()
    }

    async fn analyze_entry(&self, repo: &RepoRef, entry: TreeEntry) -> String {
        match entry.kind {
            EntryKind::File => match self.scm.file_content(repo, &entry.path).await {
                Ok(content) => {
                    let analysis = self.analyzers.analyze_file(&entry.path, &content);
                    format!("file: {}\n{}\n", entry.path, analysis)
                }
                Err(e) => {
                    debug!(path = entry.path, error = %e, "file content unavailable");
                    format!("file: {} (content unavailable)\n\n", entry.path)
                }
            },
            EntryKind::Dir => {
                let sub = self.analyze_dir(repo, &entry.path).await;
                format!("directory: {}\n{}", entry.path, sub)
            }
        }
    }

    async fn readme_summary(&self, repo: &RepoRef) -> String {
        let readme = match self.scm.readme(repo).await {
            Ok(readme) => readme,
            Err(e) => {
                warn!(repo = %repo, error = %e, "README fetch failed");
                return README_FALLBACK.to_string();
            }
        };

        match self
            .llm
            .generate(GenerationRequest::user(readme, PromptTemplate::ReadmeSummary))
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                warn!(repo = %repo, error = %e, "README summarization failed");
                README_FALLBACK.to_string()
            }
        }
    }

    async fn commit_summary(&self, repo: &RepoRef) -> String {
        match self.scm.recent_commit_messages(repo).await {
            Ok(messages) if !messages.is_empty() => messages
                .iter()
                .map(|m| format!("- {}\n", m.lines().next().unwrap_or_default()))
                .collect(),
            Ok(_) => COMMITS_FALLBACK.to_string(),
            Err(e) => {
                warn!(repo = %repo, error = %e, "commit analysis failed");
                COMMITS_FALLBACK.to_string()
            }
        }
    }

    async fn ci_cd(&self, repo: &RepoRef) -> String {
        match self.scm.workflow_files(repo).await {
            Ok(files) if !files.is_empty() => {
                format!("CI/CD workflow files: {}", files.join(", "))
            }
            Ok(_) => CICD_FALLBACK.to_string(),
            Err(e) => {
                warn!(repo = %repo, error = %e, "CI/CD analysis failed");
                CICD_FALLBACK.to_string()
            }
        }
    }
}
