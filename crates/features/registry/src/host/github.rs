use super::{
    BranchCreation, CommitReceipt, FileWrite, PullRequest, PullRequestDraft, RemoteFile,
    RepositoryHost, UpstreamError, UpstreamErrorExt, VersionToken,
};
use crate::model::RepoId;
use async_trait::async_trait;
use bsync_domain::config::UpstreamConfig;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";

/// GitHub REST v3 client.
#[derive(Clone)]
pub struct GitHubHost {
    client: Client,
    api_url: Url,
    token: Option<Arc<str>>,
}

impl GitHubHost {
    /// Builds the client from the upstream settings.
    ///
    /// # Errors
    /// [`UpstreamError::Internal`] for an unusable `api_url`, [`UpstreamError::Http`]
    /// if the HTTP client cannot be constructed.
    pub fn new(cfg: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let api_url = Url::parse(&cfg.api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| UpstreamError::Internal {
                message: format!("invalid api_url `{}`", cfg.api_url).into(),
                context: None,
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(
            HeaderName::from_static(API_VERSION_HEADER),
            HeaderValue::from_static(API_VERSION),
        );

        let client = Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(cfg.timeout_seconds.max(1)))
            .build()
            .context("Building GitHub client")?;

        Ok(Self {
            client,
            api_url,
            token: cfg.token.as_deref().filter(|t| !t.is_empty()).map(Arc::from),
        })
    }

    /// Joins `segments` onto the API root. Segments may contain `/` (branch names,
    /// nested paths); each part is percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| UpstreamError::Internal {
                message: "api_url cannot be a base URL".into(),
                context: None,
            })?
            .pop_if_empty()
            .extend(segments.iter().flat_map(|s| s.split('/')).filter(|s| !s.is_empty()));
        Ok(url)
    }

    fn repo_endpoint(&self, repo: &RepoId, rest: &[&str]) -> Result<Url, UpstreamError> {
        let mut segments = vec!["repos", repo.owner(), repo.name()];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "GitHub request");
        let request = self.client.request(method, url);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl fmt::Debug for GitHubHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubHost")
            .field("api_url", &self.api_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl RepositoryHost for GitHubHost {
    async fn resolve_branch(&self, repo: &RepoId, branch: &str) -> Result<String, UpstreamError> {
        let url = self.repo_endpoint(repo, &["git", "ref", "heads", branch])?;
        let response = self.request(Method::GET, url).send().await.context("Resolving branch")?;

        match response.status() {
            status if status.is_success() => {
                let reference: GitRef = response.json().await.context("Decoding branch ref")?;
                Ok(reference.object.sha)
            }
            StatusCode::NOT_FOUND => Err(UpstreamError::NotFound {
                message: format!("branch `{branch}` not found in {repo}").into(),
                context: None,
            }),
            _ => Err(unexpected(response).await),
        }
    }

    async fn create_branch(
        &self,
        repo: &RepoId,
        branch: &str,
        from_sha: &str,
    ) -> Result<BranchCreation, UpstreamError> {
        let url = self.repo_endpoint(repo, &["git", "refs"])?;
        let body = NewRef { reference: format!("refs/heads/{branch}"), sha: from_sha };
        let response =
            self.request(Method::POST, url).json(&body).send().await.context("Creating branch")?;

        match response.status() {
            status if status.is_success() => Ok(BranchCreation::Created),
            StatusCode::UNPROCESSABLE_ENTITY => Ok(BranchCreation::AlreadyExists),
            _ => Err(unexpected(response).await),
        }
    }

    async fn read_file(
        &self,
        repo: &RepoId,
        path: &str,
        branch: &str,
    ) -> Result<Option<RemoteFile>, UpstreamError> {
        let mut url = self.repo_endpoint(repo, &["contents", path])?;
        url.query_pairs_mut().append_pair("ref", branch);
        let response = self.request(Method::GET, url).send().await.context("Reading file")?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => return Err(unexpected(response).await),
            _ => {}
        }

        let body: serde_json::Value = response.json().await.context("Decoding file metadata")?;
        if body.is_array() {
            return Err(UpstreamError::Internal {
                message: format!("`{path}` is a directory").into(),
                context: None,
            });
        }
        let entry: ContentEntry = serde_json::from_value(body).map_err(|e| {
            UpstreamError::Internal { message: e.to_string().into(), context: None }
        })?;

        match (entry.kind.as_str(), entry.encoding.as_deref(), entry.content) {
            ("file", Some("base64"), Some(content)) => {
                Ok(Some(RemoteFile { content, version: VersionToken::new(entry.sha) }))
            }
            ("file", ..) => Err(UpstreamError::Internal {
                message: format!("`{path}` is too large for the contents API").into(),
                context: None,
            }),
            (kind, ..) => Err(UpstreamError::Internal {
                message: format!("`{path}` is a {kind}, not a file").into(),
                context: None,
            }),
        }
    }

    async fn write_file(
        &self,
        repo: &RepoId,
        write: FileWrite,
    ) -> Result<CommitReceipt, UpstreamError> {
        let url = self.repo_endpoint(repo, &["contents", &write.path])?;
        let body = PutContent {
            message: &write.message,
            content: &write.content,
            branch: &write.branch,
            sha: write.version.as_ref().map(VersionToken::as_str),
        };
        let response =
            self.request(Method::PUT, url).json(&body).send().await.context("Writing file")?;

        match response.status() {
            status if status.is_success() => {
                let written: PutContentResponse =
                    response.json().await.context("Decoding commit")?;
                let file_url = written
                    .content
                    .and_then(|c| c.html_url)
                    .or(written.commit.html_url)
                    .unwrap_or_default();
                Ok(CommitReceipt { file_url })
            }
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(UpstreamError::WriteRejected {
                    message: error_message(response).await.into(),
                    context: None,
                })
            }
            StatusCode::NOT_FOUND => Err(UpstreamError::NotFound {
                message: error_message(response).await.into(),
                context: None,
            }),
            _ => Err(unexpected(response).await),
        }
    }

    async fn open_pull_request(
        &self,
        repo: &RepoId,
        draft: PullRequestDraft,
    ) -> Result<PullRequest, UpstreamError> {
        let url = self.repo_endpoint(repo, &["pulls"])?;
        let body = NewPull { title: &draft.title, head: &draft.head, base: &draft.base };
        let response = self
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await
            .context("Opening pull request")?;

        if !response.status().is_success() {
            return Err(unexpected(response).await);
        }
        let pull: PullResponse = response.json().await.context("Decoding pull request")?;
        Ok(PullRequest { url: pull.html_url })
    }
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    match response.json::<ApiMessage>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("unexpected response").to_owned(),
    }
}

async fn unexpected(response: Response) -> UpstreamError {
    let status = response.status().as_u16();
    UpstreamError::Status { status, message: error_message(response).await.into(), context: None }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

#[derive(Debug, Serialize)]
struct NewRef<'a> {
    #[serde(rename = "ref")]
    reference: String,
    sha: &'a str,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    #[serde(rename = "type")]
    kind: String,
    sha: String,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutContent<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentResponse {
    content: Option<HtmlLink>,
    commit: HtmlLink,
}

#[derive(Debug, Deserialize)]
struct HtmlLink {
    html_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewPull<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(api_url: &str) -> GitHubHost {
        let cfg = UpstreamConfig { api_url: api_url.to_owned(), ..UpstreamConfig::default() };
        GitHubHost::new(&cfg).unwrap()
    }

    fn repo() -> RepoId {
        "org/repo".parse().unwrap()
    }

    #[test]
    fn branch_names_with_slashes_become_path_segments() {
        let url = host("https://api.github.com")
            .repo_endpoint(&repo(), &["git", "ref", "heads", "auto/character-LUNA"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/org/repo/git/ref/heads/auto/character-LUNA"
        );
    }

    #[test]
    fn enterprise_prefix_is_kept_and_segments_are_encoded() {
        let url = host("https://ghe.example.com/api/v3/")
            .repo_endpoint(&repo(), &["contents", "data/my chars.yaml"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/org/repo/contents/data/my%20chars.yaml"
        );
    }

    #[test]
    fn unusable_api_url_is_rejected() {
        for api_url in ["not a url", "mailto:octocat@example.com"] {
            let cfg = UpstreamConfig { api_url: api_url.to_owned(), ..UpstreamConfig::default() };
            assert!(matches!(GitHubHost::new(&cfg), Err(UpstreamError::Internal { .. })));
        }
    }

    #[test]
    fn debug_output_redacts_token() {
        let cfg = UpstreamConfig { token: Some("ghp_secret".to_owned()), ..UpstreamConfig::default() };
        let rendered = format!("{:?}", GitHubHost::new(&cfg).unwrap());
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn create_body_omits_missing_version() {
        let body = PutContent { message: "m", content: "Yw==", branch: "main", sha: None };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
    }
}
