use crate::document::RegistryDocument;
use crate::error::{RegistryError, RegistryErrorExt};
use crate::host::{BranchCreation, FileWrite, PullRequestDraft, RepositoryHost};
use crate::merge::merge_character;
use crate::model::{SyncPlan, SyncRequest, SyncResult};
use bsync_kernel::prelude::{BearerGuard, bearer_token};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Registry sync service: authenticates callers and runs the merge/commit workflow.
#[derive(Debug, Clone)]
pub struct RegistrySync {
    host: Arc<dyn RepositoryHost>,
    guard: BearerGuard,
}

impl RegistrySync {
    #[must_use]
    pub fn new(host: Arc<dyn RepositoryHost>, guard: BearerGuard) -> Self {
        Self { host, guard }
    }

    /// Checks an `Authorization` header value against the configured secret.
    ///
    /// # Errors
    /// [`RegistryError::Unauthorized`] unless the header carries the exact secret.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<(), RegistryError> {
        self.guard.verify(authorization.and_then(bearer_token)).map_err(|err| {
            warn!(error = %err, "Rejected registry caller");
            RegistryError::from(err)
        })
    }

    /// Validates `request` and applies it to the repository.
    ///
    /// Host calls run strictly in sequence: base branch lookup, optional branch
    /// creation, file read, commit, optional pull request. Nothing is written
    /// unless validation and the merge succeed.
    ///
    /// # Errors
    /// Any [`RegistryError`]. A [`RegistryError::PullRequest`] means the commit has
    /// already landed.
    pub async fn sync(&self, request: SyncRequest) -> Result<SyncResult, RegistryError> {
        let plan = request.validate().inspect_err(|err| warn!(error = %err, "Rejected sync"))?;
        self.apply(plan).await
    }

    #[instrument(
        name = "registry_sync",
        skip_all,
        fields(
            repo = %plan.repo,
            branch = %plan.base_branch,
            path = %plan.path,
            character = %plan.character.name,
        )
    )]
    async fn apply(&self, plan: SyncPlan) -> Result<SyncResult, RegistryError> {
        let repo = &plan.repo;
        let target = plan.target_branch();

        let base_head = self
            .host
            .resolve_branch(repo, &plan.base_branch)
            .await
            .map_err(RegistryError::upstream)
            .context("Resolving base branch")?;
        info!(head = %base_head, "Resolved base branch");

        if let Some(feature) = &plan.feature_branch {
            let created = self
                .host
                .create_branch(repo, feature, &base_head)
                .await
                .map_err(RegistryError::upstream)
                .context("Creating feature branch")?;
            match created {
                BranchCreation::Created => info!(feature, "Created feature branch"),
                BranchCreation::AlreadyExists => info!(feature, "Reusing existing feature branch"),
            }
        }

        let existing = self
            .host
            .read_file(repo, &plan.path, target)
            .await
            .map_err(RegistryError::upstream)
            .context("Reading registry")?;
        let (mut document, version) = match existing {
            Some(file) => {
                info!(version = %file.version, target, "Loaded registry");
                (RegistryDocument::decode(&file.content)?, Some(file.version))
            }
            None => {
                info!(target, "Registry file not found, starting empty");
                (RegistryDocument::default(), None)
            }
        };

        let outcome = merge_character(&mut document, &plan.character, plan.policy)
            .inspect_err(|err| warn!(error = %err, "Merge refused"))?;
        let message = plan
            .commit_message
            .clone()
            .unwrap_or_else(|| outcome.default_commit_message(&plan.character.name));

        let receipt = self
            .host
            .write_file(
                repo,
                FileWrite {
                    path: plan.path.clone(),
                    branch: target.to_owned(),
                    message: message.clone(),
                    content: document.encode()?,
                    version,
                },
            )
            .await
            .map_err(RegistryError::upstream)
            .context("Committing registry")?;
        info!(?outcome, url = %receipt.file_url, "Committed registry");

        let Some(feature) = &plan.feature_branch else {
            return Ok(SyncResult::ok(receipt.file_url, None));
        };

        let draft = PullRequestDraft {
            head: feature.clone(),
            base: plan.base_branch.clone(),
            title: message,
        };
        match self.host.open_pull_request(repo, draft).await {
            Ok(pull) => {
                info!(url = %pull.url, "Opened pull request");
                Ok(SyncResult::ok(receipt.file_url, Some(pull.url)))
            }
            Err(err) => {
                warn!(error = %err, commit = %receipt.file_url, "Pull request failed after commit");
                Err(RegistryError::PullRequest {
                    commit_url: receipt.file_url,
                    message: err.to_string().into(),
                    context: None,
                })
            }
        }
    }
}
