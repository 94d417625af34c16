use async_trait::async_trait;
use octocrab::Octocrab;
use serde::{de::DeserializeOwned, Serialize};
use shared::{ActivityKind, Commit, Issue, PullRequest};
use tracing::{debug, instrument};

use super::{ActivitySource, FetchError};

#[derive(Debug, Clone)]
pub struct RepoInfo {
    pub owner: String,
    pub repo: String,
}

#[derive(Serialize)]
struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    state: Option<&'static str>,
    per_page: u8,
}

#[derive(Clone)]
pub struct GithubClient {
    octocrab: Octocrab,
    repo_info: RepoInfo,
    per_page: u8,
}

impl GithubClient {
    /// Anonymous access when `github_token` is `None`, which GitHub rate limits
    /// far more aggressively.
    pub fn new(
        github_token: Option<String>,
        api_url: Option<String>,
        repo_info: RepoInfo,
        per_page: u8,
    ) -> anyhow::Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(api_url) = api_url {
            builder = builder.base_uri(api_url)?;
        }
        if let Some(github_token) = github_token {
            builder = builder.personal_token(github_token);
        }

        Ok(Self {
            octocrab: builder.build()?,
            repo_info,
            per_page,
        })
    }

    async fn list<R: DeserializeOwned>(
        &self,
        kind: ActivityKind,
        endpoint: &str,
        state: Option<&'static str>,
    ) -> Result<Vec<R>, FetchError> {
        let route = format!(
            "/repos/{}/{}/{}",
            self.repo_info.owner, self.repo_info.repo, endpoint
        );
        let params = ListParams {
            state,
            per_page: self.per_page,
        };

        let records: Vec<R> = self
            .octocrab
            .get(&route, Some(&params))
            .await
            .map_err(|e| FetchError::new(kind, e))?;
        debug!("Fetched {} {kind} from {route}", records.len());
        Ok(records)
    }
}

#[async_trait]
impl ActivitySource for GithubClient {
    #[instrument(skip(self))]
    async fn fetch_pull_requests(&self) -> Result<Vec<PullRequest>, FetchError> {
        self.list(ActivityKind::PullRequest, "pulls", Some("all"))
            .await
    }

    #[instrument(skip(self))]
    async fn fetch_issues(&self) -> Result<Vec<Issue>, FetchError> {
        self.list(ActivityKind::Issue, "issues", Some("all")).await
    }

    #[instrument(skip(self))]
    async fn fetch_commits(&self) -> Result<Vec<Commit>, FetchError> {
        self.list(ActivityKind::Commit, "commits", None).await
    }
}
