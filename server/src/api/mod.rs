use async_trait::async_trait;
use shared::{ActivityKind, Commit, Issue, PullRequest};

pub mod github;
pub mod prometheus;

pub use github::GithubClient;

#[derive(Debug, thiserror::Error)]
#[error("Failed to fetch {kind}: {source}")]
pub struct FetchError {
    pub kind: ActivityKind,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl FetchError {
    pub fn new(
        kind: ActivityKind,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }
}

/// Read side of the hosting API: the three activity lists of one repository.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    async fn fetch_pull_requests(&self) -> Result<Vec<PullRequest>, FetchError>;

    async fn fetch_issues(&self) -> Result<Vec<Issue>, FetchError>;

    async fn fetch_commits(&self) -> Result<Vec<Commit>, FetchError>;
}
