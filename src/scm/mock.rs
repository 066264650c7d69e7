use super::api::{EntryKind, ScmError, SourceControlApi, TreeEntry};
use super::reference::RepoRef;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// In-memory source-control fixture for tests
///
/// Holds a flat path → content map and derives tree and directory listings
/// from it. Individual operations or files can be forced to fail to exercise
/// the crawler's fallback paths.
pub struct MockSourceControl {
    files: Mutex<BTreeMap<String, String>>,
    readme: Mutex<Option<String>>,
    languages: Mutex<BTreeMap<String, u64>>,
    commits: Mutex<Vec<String>>,
    workflows: Mutex<Vec<String>>,
    last_updated: Mutex<DateTime<Utc>>,
    failing_ops: Mutex<HashSet<&'static str>>,
    failing_files: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl MockSourceControl {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
            readme: Mutex::new(None),
            languages: Mutex::new(BTreeMap::new()),
            commits: Mutex::new(Vec::new()),
            workflows: Mutex::new(Vec::new()),
            last_updated: Mutex::new(Utc::now()),
            failing_ops: Mutex::new(HashSet::new()),
            failing_files: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn add_file(&self, path: impl Into<String>, content: impl Into<String>) {
        self.files.lock().unwrap().insert(path.into(), content.into());
    }

    pub fn set_readme(&self, content: impl Into<String>) {
        *self.readme.lock().unwrap() = Some(content.into());
    }

    pub fn set_languages(&self, languages: impl IntoIterator<Item = (String, u64)>) {
        *self.languages.lock().unwrap() = languages.into_iter().collect();
    }

    pub fn set_commits(&self, messages: impl IntoIterator<Item = impl Into<String>>) {
        *self.commits.lock().unwrap() = messages.into_iter().map(Into::into).collect();
    }

    pub fn set_workflows(&self, names: impl IntoIterator<Item = impl Into<String>>) {
        *self.workflows.lock().unwrap() = names.into_iter().map(Into::into).collect();
    }

    pub fn set_last_updated(&self, when: DateTime<Utc>) {
        *self.last_updated.lock().unwrap() = when;
    }

    /// Forces one operation to fail: "tree", "list_dir", "languages",
    /// "readme", "commits", "workflows", or "updated"
    pub fn fail_op(&self, op: &'static str) {
        self.failing_ops.lock().unwrap().insert(op);
    }

    /// Forces content fetches for one path to fail
    pub fn fail_file(&self, path: impl Into<String>) {
        self.failing_files.lock().unwrap().insert(path.into());
    }

    /// Total number of API calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, op: &'static str) -> Result<(), ScmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_ops.lock().unwrap().contains(op) {
            return Err(ScmError::Payload(format!("forced failure: {}", op)));
        }
        Ok(())
    }
}

impl Default for MockSourceControl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceControlApi for MockSourceControl {
    async fn default_branch_tree(&self, _repo: &RepoRef) -> Result<Vec<TreeEntry>, ScmError> {
        self.check("tree")?;
        let files = self.files.lock().unwrap();

        let mut dirs = BTreeSet::new();
        for path in files.keys() {
            let mut prefix = String::new();
            for segment in path.split('/').rev().skip(1).collect::<Vec<_>>().iter().rev() {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(segment);
                dirs.insert(prefix.clone());
            }
        }

        let mut entries: Vec<TreeEntry> = dirs
            .into_iter()
            .map(|path| TreeEntry {
                path,
                kind: EntryKind::Dir,
            })
            .collect();
        entries.extend(files.keys().map(|path| TreeEntry {
            path: path.clone(),
            kind: EntryKind::File,
        }));
        Ok(entries)
    }

    async fn list_dir(&self, _repo: &RepoRef, path: &str) -> Result<Vec<TreeEntry>, ScmError> {
        self.check("list_dir")?;
        let files = self.files.lock().unwrap();
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };

        let mut dirs = BTreeSet::new();
        let mut file_entries = Vec::new();
        for full_path in files.keys() {
            let Some(rest) = full_path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    dirs.insert(format!("{}{}", prefix, dir));
                }
                None => file_entries.push(TreeEntry {
                    path: full_path.clone(),
                    kind: EntryKind::File,
                }),
            }
        }

        let mut entries: Vec<TreeEntry> = dirs
            .into_iter()
            .map(|path| TreeEntry {
                path,
                kind: EntryKind::Dir,
            })
            .collect();
        entries.extend(file_entries);
        Ok(entries)
    }

    async fn file_content(&self, _repo: &RepoRef, path: &str) -> Result<String, ScmError> {
        self.check("content")?;
        if self.failing_files.lock().unwrap().contains(path) {
            return Err(ScmError::Decode(format!("forced failure: {}", path)));
        }
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ScmError::Payload(format!("no such file: {}", path)))
    }

    async fn readme(&self, _repo: &RepoRef) -> Result<String, ScmError> {
        self.check("readme")?;
        self.readme
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ScmError::Payload("no readme".to_string()))
    }

    async fn languages(&self, _repo: &RepoRef) -> Result<BTreeMap<String, u64>, ScmError> {
        self.check("languages")?;
        Ok(self.languages.lock().unwrap().clone())
    }

    async fn recent_commit_messages(&self, _repo: &RepoRef) -> Result<Vec<String>, ScmError> {
        self.check("commits")?;
        Ok(self.commits.lock().unwrap().clone())
    }

    async fn workflow_files(&self, _repo: &RepoRef) -> Result<Vec<String>, ScmError> {
        self.check("workflows")?;
        Ok(self.workflows.lock().unwrap().clone())
    }

    async fn last_updated(&self, _repo: &RepoRef) -> Result<DateTime<Utc>, ScmError> {
        self.check("updated")?;
        Ok(*self.last_updated.lock().unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoRef {
        RepoRef {
            owner: "o".to_string(),
            name: "n".to_string(),
        }
    }

    #[tokio::test]
    async fn test_list_dir_derives_structure() {
        let scm = MockSourceControl::new();
        scm.add_file("src/a/deep.py", "x");
        scm.add_file("src/main.py", "x");
        scm.add_file("README.md", "x");

        let root = scm.list_dir(&repo(), "").await.unwrap();
        let names: Vec<&str> = root.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(names, vec!["src", "README.md"]);

        let src = scm.list_dir(&repo(), "src").await.unwrap();
        let names: Vec<&str> = src.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(names, vec!["src/a", "src/main.py"]);
    }

    #[tokio::test]
    async fn test_tree_contains_dirs_and_files() {
        let scm = MockSourceControl::new();
        scm.add_file("src/a/deep.py", "x");

        let tree = scm.default_branch_tree(&repo()).await.unwrap();
        let dirs: Vec<&str> = tree
            .iter()
            .filter(|e| e.kind == EntryKind::Dir)
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(dirs, vec!["src", "src/a"]);
    }

    #[tokio::test]
    async fn test_forced_failures() {
        let scm = MockSourceControl::new();
        scm.fail_op("readme");
        assert!(scm.readme(&repo()).await.is_err());

        scm.add_file("a.py", "x");
        scm.fail_file("a.py");
        assert!(scm.file_content(&repo(), "a.py").await.is_err());
        // readme() and file_content() each bump the counter once
        assert_eq!(scm.call_count(), 2);
    }
}
