use crate::error::RegistryError;
use crate::merge::MergePolicy;
use bsync_derive::api_model;
use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;
use std::fmt;
use std::str::FromStr;

const DEFAULT_BRANCH_PREFIX: &str = "auto/character-";

/// A named visual-identity record stored in the registry.
#[api_model(rename_all = "snake_case", deny_unknown_fields = false)]
#[derive(Clone, Default, PartialEq)]
pub struct Character {
    /// Unique key within a registry document. Must already be uppercase.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Free-form visual traits, kept in insertion order.
    #[serde(default)]
    #[cfg_attr(feature = "server", schema(value_type = Object))]
    pub face_blueprint: Mapping,
    /// Tags applied whenever the character is referenced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_add: Option<Vec<String>>,
    /// Any other fields sent by the caller; stored alongside the known ones.
    #[serde(flatten)]
    #[cfg_attr(feature = "server", schema(ignore))]
    pub extra: Mapping,
}

/// Requested operation; only consulted when no explicit strategy is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SyncOp {
    AppendCharacter,
    UpsertCharacter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Reject the request if the name already exists.
    Append,
    /// Replace an existing entry in place, or append.
    Upsert,
    /// Recognized for compatibility, never executed.
    PerFile,
}

/// Incoming sync call.
///
/// Every field is optional at the wire level so that missing values surface as
/// validation errors rather than decoding errors.
#[api_model(rename_all = "snake_case", deny_unknown_fields = false)]
#[derive(Clone, Default)]
#[serde(default)]
pub struct SyncRequest {
    pub op: Option<SyncOp>,
    /// Target repository as `owner/repo`.
    pub repo: Option<String>,
    /// Base branch.
    pub branch: Option<String>,
    /// Path of the registry file inside the repository.
    pub path: Option<String>,
    pub character: Option<Character>,
    pub merge_strategy: Option<MergeStrategy>,
    pub create_pr: Option<bool>,
    /// Feature branch for the pull request; defaults to `auto/character-<NAME>`.
    pub pr_branch: Option<String>,
    pub commit_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Ok,
}

/// Outcome of a successful sync.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub status: SyncStatus,
    /// Link to the committed file.
    pub commit_url: String,
    /// Link to the pull request, when one was opened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,
}

impl SyncResult {
    #[must_use]
    pub const fn ok(commit_url: String, pr_url: Option<String>) -> Self {
        Self { status: SyncStatus::Ok, commit_url, pr_url }
    }
}

/// Repository coordinates parsed from `owner/repo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    owner: String,
    name: String,
}

impl RepoId {
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl FromStr for RepoId {
    type Err = RegistryError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (owner, name) = raw
            .trim()
            .split_once('/')
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'))
            .ok_or_else(|| RegistryError::invalid("repo must look like owner/repo"))?;

        Ok(Self { owner: owner.to_owned(), name: name.to_owned() })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A validated request, ready to run against the host.
#[derive(Debug, Clone)]
pub struct SyncPlan {
    pub repo: RepoId,
    pub base_branch: String,
    pub path: String,
    pub character: Character,
    pub policy: MergePolicy,
    /// Branch to commit to and open the pull request from, when requested.
    pub feature_branch: Option<String>,
    pub commit_message: Option<String>,
}

impl SyncPlan {
    /// Branch receiving the commit.
    #[must_use]
    pub fn target_branch(&self) -> &str {
        self.feature_branch.as_deref().unwrap_or(&self.base_branch)
    }
}

impl SyncRequest {
    /// Explicit strategy first, otherwise derived from `op`.
    #[must_use]
    pub fn effective_strategy(&self) -> MergeStrategy {
        self.merge_strategy.unwrap_or(match self.op {
            Some(SyncOp::UpsertCharacter) => MergeStrategy::Upsert,
            _ => MergeStrategy::Append,
        })
    }

    /// Checks the request without touching the host.
    ///
    /// # Errors
    /// * [`RegistryError::InvalidPayload`] for missing fields, a malformed `repo`
    ///   or a name that is not uppercase.
    /// * [`RegistryError::NotImplemented`] for the `per-file` strategy.
    pub fn validate(self) -> Result<SyncPlan, RegistryError> {
        let policy = MergePolicy::try_from(self.effective_strategy());
        let Self { repo, branch, path, character, create_pr, pr_branch, commit_message, .. } = self;

        let (Some(repo), Some(base_branch), Some(path), Some(character)) =
            (non_blank(repo), non_blank(branch), non_blank(path), character)
        else {
            return Err(RegistryError::invalid("Invalid payload"));
        };
        if character.name.trim().is_empty() {
            return Err(RegistryError::invalid("Invalid payload"));
        }
        if character.name != character.name.to_uppercase() {
            return Err(RegistryError::invalid("name must be UPPERCASE & unique"));
        }

        let repo = repo.parse::<RepoId>()?;
        let policy = policy?;

        let feature_branch = create_pr.unwrap_or(false).then(|| {
            non_blank(pr_branch)
                .unwrap_or_else(|| format!("{DEFAULT_BRANCH_PREFIX}{}", character.name))
        });

        Ok(SyncPlan {
            repo,
            base_branch,
            path,
            character,
            policy,
            feature_branch,
            commit_message: non_blank(commit_message),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> SyncRequest {
        SyncRequest {
            repo: Some("org/repo".to_owned()),
            branch: Some("main".to_owned()),
            path: Some("characters.yaml".to_owned()),
            character: Some(Character { name: name.to_owned(), ..Character::default() }),
            ..SyncRequest::default()
        }
    }

    #[test]
    fn strategy_defaults_follow_op() {
        let mut req = request("LUNA");
        assert_eq!(req.effective_strategy(), MergeStrategy::Append);

        req.op = Some(SyncOp::UpsertCharacter);
        assert_eq!(req.effective_strategy(), MergeStrategy::Upsert);

        req.merge_strategy = Some(MergeStrategy::Append);
        assert_eq!(req.effective_strategy(), MergeStrategy::Append);
    }

    #[test]
    fn default_feature_branch_uses_name() {
        let mut req = request("LUNA");
        req.create_pr = Some(true);
        let plan = req.validate().unwrap();
        assert_eq!(plan.target_branch(), "auto/character-LUNA");
        assert_eq!(plan.base_branch, "main");
    }

    #[test]
    fn blank_pr_branch_and_message_count_as_absent() {
        let mut req = request("LUNA");
        req.create_pr = Some(true);
        req.pr_branch = Some("  ".to_owned());
        req.commit_message = Some(String::new());
        let plan = req.validate().unwrap();
        assert_eq!(plan.feature_branch.as_deref(), Some("auto/character-LUNA"));
        assert!(plan.commit_message.is_none());
    }

    #[test]
    fn lowercase_names_are_rejected() {
        let err = request("Luna").validate().unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPayload { .. }));
    }

    #[test]
    fn per_file_is_not_implemented() {
        let mut req = request("LUNA");
        req.merge_strategy = Some(MergeStrategy::PerFile);
        assert!(matches!(req.validate(), Err(RegistryError::NotImplemented { .. })));
    }

    #[test]
    fn repo_must_have_owner_and_name() {
        for raw in ["org", "org/", "/repo", "a/b/c"] {
            assert!(raw.parse::<RepoId>().is_err(), "{raw} should be rejected");
        }
        let repo: RepoId = "org/repo".parse().unwrap();
        assert_eq!((repo.owner(), repo.name()), ("org", "repo"));
        assert_eq!(repo.to_string(), "org/repo");
    }

    #[test]
    fn unknown_character_fields_are_kept() {
        let luna: Character =
            serde_json::from_value(serde_json::json!({ "name": "LUNA", "mood": "calm" })).unwrap();
        assert_eq!(luna.extra.get("mood"), Some(&serde_yaml::Value::from("calm")));

        let yaml = serde_yaml::to_string(&luna).unwrap();
        assert!(yaml.contains("mood: calm"), "{yaml}");
    }
}
