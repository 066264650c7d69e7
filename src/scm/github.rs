//! GitHub implementation of the source-control API
//!
//! One `reqwest::Client` is created per `GitHubApi` and reused for every call;
//! connection pooling stays an implementation detail behind the trait.

use super::api::{EntryKind, ScmError, SourceControlApi, TreeEntry};
use super::reference::RepoRef;
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// GitHub REST v3 client
pub struct GitHubApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GitHubApi {
    /// Creates a client against the public GitHub API
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom endpoint (GitHub Enterprise, tests)
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    async fn get_json(&self, path: &str) -> Result<Value, ScmError> {
        debug!(path, "GitHub API request");
        let mut request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header(reqwest::header::USER_AGENT, "folioscope");
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    fn str_field<'a>(value: &'a Value, field: &str) -> Result<&'a str, ScmError> {
        value
            .get(field)
            .and_then(Value::as_str)
            .ok_or_else(|| ScmError::Payload(format!("missing field `{}`", field)))
    }

    /// Decodes GitHub's newline-wrapped base64 content field
    fn decode_content(value: &Value) -> Result<String, ScmError> {
        let raw = Self::str_field(value, "content")?;
        let compact: String = raw.split_whitespace().collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| ScmError::Decode(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| ScmError::Decode(e.to_string()))
    }

    async fn default_branch_sha(&self, repo: &RepoRef) -> Result<String, ScmError> {
        let info = self
            .get_json(&format!("/repos/{}/{}", repo.owner, repo.name))
            .await?;
        let branch = Self::str_field(&info, "default_branch")?;

        let branch_info = self
            .get_json(&format!(
                "/repos/{}/{}/branches/{}",
                repo.owner, repo.name, branch
            ))
            .await?;
        branch_info
            .pointer("/commit/sha")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ScmError::Payload("missing field `commit.sha`".to_string()))
    }
}

#[async_trait]
impl SourceControlApi for GitHubApi {
    async fn default_branch_tree(&self, repo: &RepoRef) -> Result<Vec<TreeEntry>, ScmError> {
        let sha = self.default_branch_sha(repo).await?;
        let tree = self
            .get_json(&format!(
                "/repos/{}/{}/git/trees/{}?recursive=true",
                repo.owner, repo.name, sha
            ))
            .await?;

        let items = tree
            .get("tree")
            .and_then(Value::as_array)
            .ok_or_else(|| ScmError::Payload("missing field `tree`".to_string()))?;

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let path = Self::str_field(item, "path")?;
            let kind = match Self::str_field(item, "type")? {
                "tree" => EntryKind::Dir,
                _ => EntryKind::File,
            };
            entries.push(TreeEntry {
                path: path.to_string(),
                kind,
            });
        }
        Ok(entries)
    }

    async fn list_dir(&self, repo: &RepoRef, path: &str) -> Result<Vec<TreeEntry>, ScmError> {
        let listing = self
            .get_json(&format!(
                "/repos/{}/{}/contents/{}",
                repo.owner, repo.name, path
            ))
            .await?;

        let items = listing
            .as_array()
            .ok_or_else(|| ScmError::Payload("expected a directory listing".to_string()))?;

        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            let path = Self::str_field(item, "path")?;
            let kind = match Self::str_field(item, "type")? {
                "dir" => EntryKind::Dir,
                _ => EntryKind::File,
            };
            entries.push(TreeEntry {
                path: path.to_string(),
                kind,
            });
        }
        Ok(entries)
    }

    async fn file_content(&self, repo: &RepoRef, path: &str) -> Result<String, ScmError> {
        let value = self
            .get_json(&format!(
                "/repos/{}/{}/contents/{}",
                repo.owner, repo.name, path
            ))
            .await?;
        Self::decode_content(&value)
    }

    async fn readme(&self, repo: &RepoRef) -> Result<String, ScmError> {
        let value = self
            .get_json(&format!("/repos/{}/{}/readme", repo.owner, repo.name))
            .await?;
        Self::decode_content(&value)
    }

    async fn languages(&self, repo: &RepoRef) -> Result<BTreeMap<String, u64>, ScmError> {
        let value = self
            .get_json(&format!("/repos/{}/{}/languages", repo.owner, repo.name))
            .await?;
        let object = value
            .as_object()
            .ok_or_else(|| ScmError::Payload("expected a language map".to_string()))?;

        Ok(object
            .iter()
            .map(|(name, bytes)| (name.clone(), bytes.as_u64().unwrap_or(0)))
            .collect())
    }

    async fn recent_commit_messages(&self, repo: &RepoRef) -> Result<Vec<String>, ScmError> {
        let value = self
            .get_json(&format!("/repos/{}/{}/commits", repo.owner, repo.name))
            .await?;
        let commits = value
            .as_array()
            .ok_or_else(|| ScmError::Payload("expected a commit list".to_string()))?;

        Ok(commits
            .iter()
            .filter_map(|c| c.pointer("/commit/message").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    async fn workflow_files(&self, repo: &RepoRef) -> Result<Vec<String>, ScmError> {
        let value = self
            .get_json(&format!(
                "/repos/{}/{}/contents/.github/workflows",
                repo.owner, repo.name
            ))
            .await?;
        let items = value
            .as_array()
            .ok_or_else(|| ScmError::Payload("expected a workflow listing".to_string()))?;

        Ok(items
            .iter()
            .filter_map(|item| item.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }

    async fn last_updated(&self, repo: &RepoRef) -> Result<DateTime<Utc>, ScmError> {
        let value = self
            .get_json(&format!("/repos/{}/{}", repo.owner, repo.name))
            .await?;
        let updated_at = Self::str_field(&value, "updated_at")?;
        DateTime::parse_from_rfc3339(updated_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ScmError::Payload(format!("bad `updated_at` timestamp: {}", e)))
    }
}

impl std::fmt::Debug for GitHubApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApi")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_content_handles_wrapped_base64() {
        // GitHub wraps base64 at 60 columns with embedded newlines
        let value = json!({ "content": "aGVsbG8g\nd29ybGQ=\n" });
        assert_eq!(GitHubApi::decode_content(&value).unwrap(), "hello world");
    }

    #[test]
    fn test_decode_content_rejects_garbage() {
        let value = json!({ "content": "!!!" });
        assert!(matches!(
            GitHubApi::decode_content(&value),
            Err(ScmError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_field() {
        let value = json!({});
        assert!(matches!(
            GitHubApi::decode_content(&value),
            Err(ScmError::Payload(_))
        ));
    }
}
