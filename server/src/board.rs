use std::sync::Arc;

use rocket::fairing::AdHoc;
use shared::{compute_leaderboard, LeaderboardView, Period};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

use crate::api::{
    prometheus::{PassOutcome, PrometheusClient},
    ActivitySource, FetchError,
};

pub const FETCH_ERROR_MESSAGE: &str = "Failed to load contributor activity";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Loading,
    Ready(LeaderboardView),
    Errored(String),
}

/// Identifies one pass. Only the most recently issued token may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassToken {
    pub generation: u64,
    pub period: Period,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub generation: u64,
    pub period: Period,
    pub status: Status,
}

/// Selected period plus whatever the latest pass produced for it.
pub struct Board {
    source: Arc<dyn ActivitySource>,
    prometheus: Arc<PrometheusClient>,
    state: RwLock<Snapshot>,
}

impl Board {
    pub fn new(
        source: Arc<dyn ActivitySource>,
        prometheus: Arc<PrometheusClient>,
        period: Period,
    ) -> Self {
        Self {
            source,
            prometheus,
            state: RwLock::new(Snapshot {
                generation: 0,
                period,
                status: Status::Loading,
            }),
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.state.read().await.clone()
    }

    /// Supersedes any pass in flight and shows the loading state.
    pub async fn begin_pass(&self, period: Period) -> PassToken {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.period = period;
        state.status = Status::Loading;
        PassToken {
            generation: state.generation,
            period,
        }
    }

    #[instrument(skip(self))]
    pub async fn run_pass(&self, token: PassToken) -> PassOutcome {
        let started = chrono::Utc::now();
        info!("Starting {} pass", token.period);

        let result = tokio::try_join!(
            self.source.fetch_pull_requests(),
            self.source.fetch_issues(),
            self.source.fetch_commits(),
        )
        .map(|(pull_requests, issues, commits)| {
            compute_leaderboard(
                &pull_requests,
                &issues,
                &commits,
                token.period,
                &chrono::Local::now(),
            )
        });

        let outcome = self.apply(token, result).await;
        self.prometheus
            .record_pass(outcome, token.period, started);
        outcome
    }

    async fn apply(
        &self,
        token: PassToken,
        result: Result<LeaderboardView, FetchError>,
    ) -> PassOutcome {
        let mut state = self.state.write().await;
        if state.generation != token.generation {
            debug!(
                "Discarding pass {} superseded by pass {}",
                token.generation, state.generation
            );
            return PassOutcome::Stale;
        }

        match result {
            Ok(view) => {
                info!(
                    "Pass {} ready with {} contributors",
                    token.generation,
                    view.entries.len()
                );
                self.prometheus.set_entries(view.entries.len());
                state.status = Status::Ready(view);
                PassOutcome::Applied
            }
            Err(e) => {
                error!("Pass {} failed: {e}", token.generation);
                state.status = Status::Errored(FETCH_ERROR_MESSAGE.to_string());
                PassOutcome::Failed
            }
        }
    }

    /// Switches to `period` and recomputes it in the background.
    pub async fn select_period(self: &Arc<Self>, period: Period) -> PassToken {
        let token = self.begin_pass(period).await;
        let board = self.clone();
        tokio::spawn(async move { board.run_pass(token).await });
        token
    }

    pub async fn refresh(self: &Arc<Self>) -> PassToken {
        let period = self.state.read().await.period;
        self.select_period(period).await
    }
}

pub fn stage(board: Arc<Board>) -> AdHoc {
    AdHoc::on_ignite("Contributor leaderboard", move |rocket| async move {
        rocket
            .manage(board)
            .attach(AdHoc::on_liftoff("Initial leaderboard pass", |rocket| {
                Box::pin(async move {
                    if let Some(board) = rocket.state::<Arc<Board>>() {
                        board.refresh().await;
                    }
                })
            }))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use shared::{ActivityKind, Commit, Issue, PullRequest};
    use tokio::sync::{oneshot, watch};

    use super::*;

    type Gate = oneshot::Receiver<Result<Vec<PullRequest>, FetchError>>;

    /// Pull request calls block on gates handed out in call order; issues and
    /// commits answer straight away.
    struct ScriptedSource {
        gates: Mutex<VecDeque<Gate>>,
        calls: watch::Sender<usize>,
        commits: Vec<Commit>,
    }

    impl ScriptedSource {
        fn new(commits: Vec<Commit>) -> Self {
            Self {
                gates: Mutex::new(VecDeque::new()),
                calls: watch::channel(0).0,
                commits,
            }
        }

        fn gate(&self) -> oneshot::Sender<Result<Vec<PullRequest>, FetchError>> {
            let (sender, receiver) = oneshot::channel();
            self.gates.lock().unwrap().push_back(receiver);
            sender
        }

        async fn wait_for_calls(&self, count: usize) {
            let mut calls = self.calls.subscribe();
            calls.wait_for(|calls| *calls >= count).await.unwrap();
        }
    }

    #[async_trait]
    impl ActivitySource for ScriptedSource {
        async fn fetch_pull_requests(&self) -> Result<Vec<PullRequest>, FetchError> {
            let gate = self.gates.lock().unwrap().pop_front();
            self.calls.send_modify(|calls| *calls += 1);
            match gate {
                Some(gate) => gate.await.unwrap(),
                None => Ok(vec![]),
            }
        }

        async fn fetch_issues(&self) -> Result<Vec<Issue>, FetchError> {
            Ok(vec![])
        }

        async fn fetch_commits(&self) -> Result<Vec<Commit>, FetchError> {
            Ok(self.commits.clone())
        }
    }

    fn pull_request(login: &str) -> PullRequest {
        serde_json::from_value(serde_json::json!({
            "user": { "login": login },
            "created_at": chrono::Utc::now().to_rfc3339(),
        }))
        .unwrap()
    }

    fn board(source: &Arc<ScriptedSource>) -> Arc<Board> {
        Arc::new(Board::new(
            source.clone(),
            Arc::new(PrometheusClient::default()),
            Period::Daily,
        ))
    }

    fn usernames(snapshot: &Snapshot) -> Vec<String> {
        match &snapshot.status {
            Status::Ready(view) => view.entries.iter().map(|t| t.username.clone()).collect(),
            status => panic!("expected ready board, got {status:?}"),
        }
    }

    #[tokio::test]
    async fn starts_loading() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let snapshot = board(&source).snapshot().await;

        assert_eq!(snapshot.status, Status::Loading);
        assert_eq!(snapshot.period, Period::Daily);
    }

    #[tokio::test]
    async fn pass_applies_view() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let board = board(&source);
        let gate = source.gate();

        let token = board.begin_pass(Period::Weekly).await;
        gate.send(Ok(vec![pull_request("alice"), pull_request("alice")]))
            .unwrap();

        assert_eq!(board.run_pass(token).await, PassOutcome::Applied);
        let snapshot = board.snapshot().await;
        assert_eq!(snapshot.period, Period::Weekly);
        assert_eq!(usernames(&snapshot), vec!["alice"]);
        match snapshot.status {
            Status::Ready(view) => assert_eq!(view.entries[0].pr_count, 2),
            status => panic!("unexpected {status:?}"),
        }
    }

    #[tokio::test]
    async fn empty_result_is_ready_not_errored() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let board = board(&source);

        let token = board.begin_pass(Period::Daily).await;
        assert_eq!(board.run_pass(token).await, PassOutcome::Applied);
        assert!(usernames(&board.snapshot().await).is_empty());
    }

    #[tokio::test]
    async fn any_fetch_failure_fails_the_pass() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let board = board(&source);
        let gate = source.gate();

        let token = board.begin_pass(Period::Daily).await;
        gate.send(Err(FetchError::new(
            ActivityKind::PullRequest,
            "403 rate limit exceeded",
        )))
        .unwrap();

        assert_eq!(board.run_pass(token).await, PassOutcome::Failed);
        assert_eq!(
            board.snapshot().await.status,
            Status::Errored(FETCH_ERROR_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn superseded_pass_never_overwrites_newer_one() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let board = board(&source);
        let daily_gate = source.gate();
        let weekly_gate = source.gate();

        let daily = board.begin_pass(Period::Daily).await;
        let daily_pass = tokio::spawn({
            let board = board.clone();
            async move { board.run_pass(daily).await }
        });
        source.wait_for_calls(1).await;

        let weekly = board.begin_pass(Period::Weekly).await;
        let weekly_pass = tokio::spawn({
            let board = board.clone();
            async move { board.run_pass(weekly).await }
        });
        source.wait_for_calls(2).await;

        weekly_gate.send(Ok(vec![pull_request("wendy")])).unwrap();
        assert_eq!(weekly_pass.await.unwrap(), PassOutcome::Applied);

        daily_gate.send(Ok(vec![pull_request("dan")])).unwrap();
        assert_eq!(daily_pass.await.unwrap(), PassOutcome::Stale);

        let snapshot = board.snapshot().await;
        assert_eq!(snapshot.period, Period::Weekly);
        assert_eq!(snapshot.generation, weekly.generation);
        assert_eq!(usernames(&snapshot), vec!["wendy"]);
    }

    #[tokio::test]
    async fn stale_failure_does_not_clobber_loading_state() {
        let source = Arc::new(ScriptedSource::new(vec![]));
        let board = board(&source);
        let gate = source.gate();

        let first = board.begin_pass(Period::Daily).await;
        board.begin_pass(Period::Weekly).await;
        gate.send(Err(FetchError::new(ActivityKind::PullRequest, "boom")))
            .unwrap();

        assert_eq!(board.run_pass(first).await, PassOutcome::Stale);
        assert_eq!(board.snapshot().await.status, Status::Loading);
    }

    #[tokio::test]
    async fn select_period_runs_in_background() {
        let commit: Commit = serde_json::from_value(serde_json::json!({
            "author": null,
            "commit": { "author": { "name": "bob", "date": chrono::Utc::now().to_rfc3339() } }
        }))
        .unwrap();
        let source = Arc::new(ScriptedSource::new(vec![commit]));
        let board = board(&source);

        let token = board.select_period(Period::Weekly).await;
        assert_eq!(token.period, Period::Weekly);

        let mut ready = false;
        for _ in 0..100 {
            if let Status::Ready(view) = board.snapshot().await.status {
                assert_eq!(view.entries[0].username, "bob");
                ready = true;
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(ready);

        let token = board.refresh().await;
        assert_eq!(token.period, Period::Weekly);
        assert_eq!(token.generation, 2);
    }

    #[tokio::test]
    async fn stage_runs_initial_pass_on_liftoff() {
        let commit: Commit = serde_json::from_value(serde_json::json!({
            "author": { "login": "carol" },
            "commit": { "author": { "date": chrono::Utc::now().to_rfc3339() } }
        }))
        .unwrap();
        let source = Arc::new(ScriptedSource::new(vec![commit]));
        let board = board(&source);

        let client =
            rocket::local::asynchronous::Client::tracked(rocket::build().attach(stage(board.clone())))
                .await
                .unwrap();
        let managed = client.rocket().state::<Arc<Board>>().unwrap();
        assert!(Arc::ptr_eq(managed, &board));

        let mut snapshot = board.snapshot().await;
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.period, Period::Daily);
        for _ in 0..100 {
            if matches!(snapshot.status, Status::Ready(_)) {
                break;
            }
            tokio::task::yield_now().await;
            snapshot = board.snapshot().await;
        }
        assert_eq!(usernames(&snapshot), vec!["carol"]);
    }
}
