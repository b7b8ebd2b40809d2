//! GitHub platform service implementation

use crate::auth::Credentials;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::platform::RegistryService;
use crate::platform::pagination::PageFetcher;
use crate::platform::retry::RetryPolicy;
use crate::types::{
    CommentEntry, LabelEntry, MergeCommit, MergeResponse, Paged, PrLinks, PullRequest,
    StatusEntry,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, warn};

/// Sent as `User-Agent` on every request
pub const USER_AGENT: &str = "registry-automerge";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// REST payload shapes. Only the fields the gates read are declared.

#[derive(Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Deserialize)]
struct ApiHref {
    href: String,
}

#[derive(Deserialize)]
struct ApiLinks {
    statuses: ApiHref,
    comments: ApiHref,
    issue: ApiHref,
}

#[derive(Deserialize)]
struct ApiRepo {
    full_name: String,
}

#[derive(Deserialize)]
struct ApiBase {
    repo: ApiRepo,
}

#[derive(Deserialize)]
struct ApiPullRequest {
    number: u64,
    title: String,
    body: Option<String>,
    user: ApiUser,
    created_at: DateTime<Utc>,
    base: ApiBase,
    #[serde(rename = "_links")]
    links: ApiLinks,
}

impl From<ApiPullRequest> for PullRequest {
    fn from(pr: ApiPullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title,
            body: pr.body,
            author: pr.user.login,
            created_at: pr.created_at,
            base_repo: pr.base.repo.full_name,
            links: PrLinks {
                statuses: pr.links.statuses.href,
                comments: pr.links.comments.href,
                issue: pr.links.issue.href,
            },
        }
    }
}

#[derive(Deserialize)]
struct ApiComment {
    id: u64,
    user: ApiUser,
    #[serde(default)]
    body: Option<String>,
}

impl From<ApiComment> for CommentEntry {
    fn from(comment: ApiComment) -> Self {
        Self {
            id: comment.id,
            author: comment.user.login,
            body: comment.body.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Default)]
struct ApiMergeBody {
    sha: Option<String>,
    message: Option<String>,
}

/// GitHub service using reqwest
pub struct GitHubService {
    client: Client,
    fetcher: PageFetcher,
    retry: RetryPolicy,
    api_base: String,
    repository: String,
}

impl GitHubService {
    /// Create a service for `config.repository` authenticated as `credentials`
    pub fn new(config: &Config, credentials: &Credentials) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", credentials.token))
            .map_err(|e| Error::Auth(format!("token is not a valid header value: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Internal(format!("failed to create HTTP client: {e}")))?;

        let retry = config.retry_policy();
        debug!(
            repository = %config.repository,
            username = %credentials.username,
            "created GitHub service"
        );

        Ok(Self {
            fetcher: PageFetcher::new(client.clone(), retry),
            client,
            retry,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            repository: config.repository.clone(),
        })
    }

    fn repo_url(&self, repository: &str, path: &str) -> String {
        format!("{}/repos/{repository}{path}", self.api_base)
    }
}

#[async_trait]
impl RegistryService for GitHubService {
    async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        let url = self.repo_url(&self.repository, "/pulls");
        debug!(%url, "listing open PRs");

        let paged: Paged<ApiPullRequest> =
            self.fetcher.fetch_all(&url, &[("state", "open")]).await?;

        // A partial PR list would silently drop candidates, so fail the run
        if let Some(failure) = paged.failure {
            return Err(Error::FetchAborted {
                url: failure.url,
                reason: failure.reason,
            });
        }

        let prs: Vec<PullRequest> = paged.entries.into_iter().map(Into::into).collect();
        debug!(count = prs.len(), "listed open PRs");
        Ok(prs)
    }

    async fn get_pr(&self, pr_number: u64) -> Result<PullRequest> {
        let url = self.repo_url(&self.repository, &format!("/pulls/{pr_number}"));
        debug!(pr_number, "getting PR");

        let response = self.retry.send(|| self.client.get(&url)).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchAborted {
                url,
                reason: format!("HTTP {status}"),
            });
        }

        let pr: ApiPullRequest = response.json().await?;
        Ok(pr.into())
    }

    async fn statuses(&self, pr: &PullRequest) -> Result<Paged<StatusEntry>> {
        debug!(pr_number = pr.number, "fetching statuses");
        self.fetcher.fetch_all(&pr.links.statuses, &[]).await
    }

    async fn comments(&self, pr: &PullRequest) -> Result<Paged<CommentEntry>> {
        debug!(pr_number = pr.number, "fetching comments");
        let paged: Paged<ApiComment> = self.fetcher.fetch_all(&pr.links.comments, &[]).await?;
        Ok(paged.map(Into::into))
    }

    async fn labels(&self, pr: &PullRequest) -> Result<Paged<LabelEntry>> {
        debug!(pr_number = pr.number, "fetching labels");
        let url = format!("{}/labels", pr.links.issue.trim_end_matches('/'));
        self.fetcher.fetch_all(&url, &[]).await
    }

    // A transport failure after GitHub already merged makes the retry answer
    // 405, which is reported as a rejected merge. See `RetryPolicy::send`.
    async fn merge_pr(&self, pr: &PullRequest, commit: &MergeCommit) -> Result<MergeResponse> {
        let url = self.repo_url(&pr.base_repo, &format!("/pulls/{}/merge", pr.number));
        debug!(pr_number = pr.number, title = %commit.commit_title, "merging PR");

        let response = self
            .retry
            .send(|| self.client.put(&url).json(commit))
            .await?;

        let status = response.status().as_u16();
        let body: ApiMergeBody = response.json().await.unwrap_or_else(|e| {
            warn!(pr_number = pr.number, error = %e, "merge response body unreadable");
            ApiMergeBody::default()
        });

        debug!(pr_number = pr.number, status, sha = ?body.sha, "merge request answered");
        Ok(MergeResponse {
            status,
            message: body.message,
            sha: body.sha,
        })
    }
}
