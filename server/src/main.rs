#[macro_use]
extern crate rocket;

mod entrypoints;

use std::sync::Arc;

use serde::Deserialize;
use shared::Period;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

use lockedin_server::{
    api::{github::RepoInfo, prometheus::PrometheusClient, GithubClient},
    board::{self, Board},
};

#[derive(Debug, Deserialize)]
struct Env {
    github_token: Option<String>,
    github_api_url: Option<String>,
    #[serde(default = "default_repo_owner")]
    repo_owner: String,
    #[serde(default = "default_repo_name")]
    repo_name: String,
    #[serde(default = "default_per_page")]
    per_page: u8,
    #[serde(default)]
    default_period: Period,
}

fn default_repo_owner() -> String {
    "calcom".to_string()
}

fn default_repo_name() -> String {
    "cal.com".to_string()
}

fn default_per_page() -> u8 {
    10
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;

    let env = envy::from_env::<Env>()?;
    let repo_info = RepoInfo {
        owner: env.repo_owner,
        repo: env.repo_name,
    };
    tracing::info!(
        "Serving {} leaderboard for {}/{}",
        env.default_period,
        repo_info.owner,
        repo_info.repo
    );

    let github = GithubClient::new(
        env.github_token,
        env.github_api_url,
        repo_info,
        env.per_page,
    )?;
    let prometheus: Arc<PrometheusClient> = Default::default();
    let board = Arc::new(Board::new(
        Arc::new(github),
        prometheus.clone(),
        env.default_period,
    ));

    let _rocket = rocket::build()
        .manage(prometheus)
        .attach(board::stage(board))
        .attach(entrypoints::stage())
        .launch()
        .await?;

    tracing::warn!("Exiting leaderboard server...");
    Ok(())
}
