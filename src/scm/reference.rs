//! Repository reference parsing

use crate::error::ServiceError;

/// An owner/name pair resolved from a repository URL
///
/// Immutable once parsed; every source-control call is keyed by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parses a repository URL into `(owner, name)`
    ///
    /// The first two path segments after the host become owner and name;
    /// anything beyond them (branches, subpaths, query strings) is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidRepositoryReference`] when the URL has
    /// fewer than two path segments.
    pub fn parse(url: &str) -> Result<Self, ServiceError> {
        let invalid = || ServiceError::InvalidRepositoryReference(url.to_string());

        let rest = url.split_once("://").map(|(_, r)| r).unwrap_or(url);
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);

        let mut segments = rest.split('/').filter(|s| !s.is_empty());
        let _host = segments.next().ok_or_else(invalid)?;
        let owner = segments.next().ok_or_else(invalid)?;
        let name = segments.next().ok_or_else(invalid)?;

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
