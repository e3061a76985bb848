use super::{
    BranchCreation, CommitReceipt, FileWrite, PullRequest, PullRequestDraft, RemoteFile,
    RepositoryHost, UpstreamError, VersionToken,
};
use crate::model::RepoId;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Host operation as observed by [`MemoryHost`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    ResolveBranch { branch: String },
    CreateBranch { branch: String, from: String },
    ReadFile { path: String, branch: String },
    WriteFile { path: String, branch: String, message: String, version: Option<VersionToken> },
    OpenPullRequest { head: String, base: String, title: String },
}

#[derive(Debug, Clone)]
struct StoredFile {
    text: String,
    version: VersionToken,
}

#[derive(Debug, Default)]
struct Store {
    /// Branch name to head commit.
    branches: HashMap<String, String>,
    /// Keyed by (branch, path).
    files: HashMap<(String, String), StoredFile>,
    calls: Vec<HostCall>,
    sequence: u64,
    pulls: u64,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> String {
        self.sequence += 1;
        format!("{prefix}{:08x}", self.sequence)
    }

    fn commit(&mut self, branch: &str, path: &str, text: String) -> VersionToken {
        let version = VersionToken::new(self.next_id("blob-"));
        let head = self.next_id("commit-");
        self.files
            .insert((branch.to_owned(), path.to_owned()), StoredFile { text, version: version.clone() });
        self.branches.insert(branch.to_owned(), head);
        version
    }
}

/// In-process repository host modelling a single repository.
///
/// Versions and commit ids come from a counter, so every write produces a new
/// version token. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    store: Arc<Mutex<Store>>,
    auto_branches: bool,
    fail_pull_requests: bool,
}

impl MemoryHost {
    /// Empty repository without branches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository that creates any branch on first lookup. Used for local runs.
    #[must_use]
    pub fn scratch() -> Self {
        Self { auto_branches: true, ..Self::default() }
    }

    #[must_use]
    pub fn with_branch(self, branch: &str) -> Self {
        {
            let mut store = self.store.lock();
            if !store.branches.contains_key(branch) {
                let head = store.next_id("commit-");
                store.branches.insert(branch.to_owned(), head);
            }
        }
        self
    }

    /// Makes every pull request creation fail.
    #[must_use]
    pub const fn failing_pull_requests(mut self) -> Self {
        self.fail_pull_requests = true;
        self
    }

    /// Commits `text` directly, creating the branch if needed.
    pub fn put_file(&self, branch: &str, path: &str, text: &str) -> VersionToken {
        self.store.lock().commit(branch, path, text.to_owned())
    }

    #[must_use]
    pub fn file_text(&self, branch: &str, path: &str) -> Option<String> {
        let store = self.store.lock();
        store.files.get(&(branch.to_owned(), path.to_owned())).map(|file| file.text.clone())
    }

    #[must_use]
    pub fn has_branch(&self, branch: &str) -> bool {
        self.store.lock().branches.contains_key(branch)
    }

    /// Every operation received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<HostCall> {
        self.store.lock().calls.clone()
    }
}

#[async_trait]
impl RepositoryHost for MemoryHost {
    async fn resolve_branch(&self, repo: &RepoId, branch: &str) -> Result<String, UpstreamError> {
        let mut store = self.store.lock();
        store.calls.push(HostCall::ResolveBranch { branch: branch.to_owned() });

        if self.auto_branches && !store.branches.contains_key(branch) {
            let head = store.next_id("commit-");
            store.branches.insert(branch.to_owned(), head);
        }

        store.branches.get(branch).cloned().ok_or_else(|| UpstreamError::NotFound {
            message: format!("branch `{branch}` not found in {repo}").into(),
            context: None,
        })
    }

    async fn create_branch(
        &self,
        _repo: &RepoId,
        branch: &str,
        from_sha: &str,
    ) -> Result<BranchCreation, UpstreamError> {
        let mut store = self.store.lock();
        store
            .calls
            .push(HostCall::CreateBranch { branch: branch.to_owned(), from: from_sha.to_owned() });

        if store.branches.contains_key(branch) {
            return Ok(BranchCreation::AlreadyExists);
        }

        // A new branch starts with the tree of the branch it was cut from.
        let source = store
            .branches
            .iter()
            .find(|(_, head)| head.as_str() == from_sha)
            .map(|(name, _)| name.clone());
        if let Some(source) = source {
            let copied: Vec<_> = store
                .files
                .iter()
                .filter(|((owner, _), _)| *owner == source)
                .map(|((_, path), file)| ((branch.to_owned(), path.clone()), file.clone()))
                .collect();
            store.files.extend(copied);
        }
        store.branches.insert(branch.to_owned(), from_sha.to_owned());

        Ok(BranchCreation::Created)
    }

    async fn read_file(
        &self,
        _repo: &RepoId,
        path: &str,
        branch: &str,
    ) -> Result<Option<RemoteFile>, UpstreamError> {
        let mut store = self.store.lock();
        store.calls.push(HostCall::ReadFile { path: path.to_owned(), branch: branch.to_owned() });

        Ok(store.files.get(&(branch.to_owned(), path.to_owned())).map(|file| RemoteFile {
            content: STANDARD.encode(&file.text),
            version: file.version.clone(),
        }))
    }

    async fn write_file(
        &self,
        repo: &RepoId,
        write: FileWrite,
    ) -> Result<CommitReceipt, UpstreamError> {
        let text = STANDARD
            .decode(&write.content)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or("content is not base64-encoded UTF-8")?;

        let mut store = self.store.lock();
        store.calls.push(HostCall::WriteFile {
            path: write.path.clone(),
            branch: write.branch.clone(),
            message: write.message.clone(),
            version: write.version.clone(),
        });

        if !store.branches.contains_key(&write.branch) {
            return Err(UpstreamError::NotFound {
                message: format!("branch `{}` not found in {repo}", write.branch).into(),
                context: None,
            });
        }

        let current = store
            .files
            .get(&(write.branch.clone(), write.path.clone()))
            .map(|file| file.version.clone());
        if current != write.version {
            let message = match current {
                Some(_) => "version token does not match the current file",
                None => "file does not exist",
            };
            return Err(UpstreamError::WriteRejected { message: message.into(), context: None });
        }

        store.commit(&write.branch, &write.path, text);
        Ok(CommitReceipt { file_url: format!("memory://{repo}/blob/{}/{}", write.branch, write.path) })
    }

    async fn open_pull_request(
        &self,
        repo: &RepoId,
        draft: PullRequestDraft,
    ) -> Result<PullRequest, UpstreamError> {
        let mut store = self.store.lock();
        store.calls.push(HostCall::OpenPullRequest {
            head: draft.head.clone(),
            base: draft.base.clone(),
            title: draft.title.clone(),
        });

        if self.fail_pull_requests {
            return Err(UpstreamError::Status {
                status: 422,
                message: "pull request creation is disabled".into(),
                context: None,
            });
        }
        if !store.branches.contains_key(&draft.head) || !store.branches.contains_key(&draft.base) {
            return Err(UpstreamError::Status {
                status: 422,
                message: format!("cannot open {} -> {}", draft.head, draft.base).into(),
                context: None,
            });
        }

        store.pulls += 1;
        Ok(PullRequest { url: format!("memory://{repo}/pull/{}", store.pulls) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoId {
        "org/repo".parse().unwrap()
    }

    #[tokio::test]
    async fn new_branches_inherit_files_of_their_source() {
        let host = MemoryHost::new();
        host.put_file("main", "characters.yaml", "characters: []\n");
        let head = host.resolve_branch(&repo(), "main").await.unwrap();

        let created = host.create_branch(&repo(), "feature", &head).await.unwrap();
        assert_eq!(created, BranchCreation::Created);
        assert_eq!(host.file_text("feature", "characters.yaml").as_deref(), Some("characters: []\n"));

        let again = host.create_branch(&repo(), "feature", &head).await.unwrap();
        assert_eq!(again, BranchCreation::AlreadyExists);
    }

    #[tokio::test]
    async fn writes_require_the_current_version() {
        let host = MemoryHost::new();
        let first = host.put_file("main", "c.yaml", "a");
        host.put_file("main", "c.yaml", "b");

        let write = FileWrite {
            path: "c.yaml".to_owned(),
            branch: "main".to_owned(),
            message: "m".to_owned(),
            content: STANDARD.encode("c"),
            version: Some(first),
        };
        let err = host.write_file(&repo(), write).await.unwrap_err();
        assert!(matches!(err, UpstreamError::WriteRejected { .. }));
        assert_eq!(host.file_text("main", "c.yaml").as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn missing_branch_is_not_found_unless_scratch() {
        let err = MemoryHost::new().resolve_branch(&repo(), "main").await.unwrap_err();
        assert!(matches!(err, UpstreamError::NotFound { .. }));

        let scratch = MemoryHost::scratch();
        assert!(scratch.resolve_branch(&repo(), "main").await.is_ok());
        assert!(scratch.has_branch("main"));
    }
}
