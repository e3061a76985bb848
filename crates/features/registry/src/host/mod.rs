//! Repository host capability.
//!
//! The sync workflow only needs five operations from the version-control service.
//! [`GitHubHost`] speaks the GitHub REST API; [`MemoryHost`] keeps everything in
//! process for tests and local runs.

mod error;
mod github;
mod memory;

pub use error::{UpstreamError, UpstreamErrorExt};
pub use github::GitHubHost;
pub use memory::{HostCall, MemoryHost};

use crate::model::RepoId;
use async_trait::async_trait;
use std::fmt;

/// Opaque identifier of the exact prior content of a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchCreation {
    Created,
    AlreadyExists,
}

/// File content as stored by the host.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    /// Base64 transport encoding of the file bytes.
    pub content: String,
    pub version: VersionToken,
}

/// A single-file commit.
#[derive(Debug, Clone)]
pub struct FileWrite {
    pub path: String,
    pub branch: String,
    pub message: String,
    /// Base64 transport encoding of the new file bytes.
    pub content: String,
    /// `None` creates the file; `Some` updates it only if the version still matches.
    pub version: Option<VersionToken>,
}

#[derive(Debug, Clone)]
pub struct CommitReceipt {
    /// Link to the committed file.
    pub file_url: String,
}

#[derive(Debug, Clone)]
pub struct PullRequestDraft {
    pub head: String,
    pub base: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct PullRequest {
    pub url: String,
}

#[async_trait]
pub trait RepositoryHost: fmt::Debug + Send + Sync {
    /// Returns the head commit of `branch`.
    ///
    /// Fails with [`UpstreamError::NotFound`] when the branch does not exist.
    async fn resolve_branch(&self, repo: &RepoId, branch: &str) -> Result<String, UpstreamError>;

    /// Creates `branch` at `from_sha`. An existing branch is reported, not an error.
    async fn create_branch(
        &self,
        repo: &RepoId,
        branch: &str,
        from_sha: &str,
    ) -> Result<BranchCreation, UpstreamError>;

    /// Reads `path` on `branch`; `None` when the file does not exist.
    async fn read_file(
        &self,
        repo: &RepoId,
        path: &str,
        branch: &str,
    ) -> Result<Option<RemoteFile>, UpstreamError>;

    /// Creates or conditionally updates a file.
    ///
    /// Fails with [`UpstreamError::WriteRejected`] when the version check fails.
    async fn write_file(
        &self,
        repo: &RepoId,
        write: FileWrite,
    ) -> Result<CommitReceipt, UpstreamError>;

    async fn open_pull_request(
        &self,
        repo: &RepoId,
        draft: PullRequestDraft,
    ) -> Result<PullRequest, UpstreamError>;
}
