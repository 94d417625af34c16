use lockedin_server::board::{PassToken, Snapshot, Status};
use serde::Serialize;
use shared::{Period, TimeWindow, UserTally};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusResponse {
    Loading,
    Ready,
    Errored,
}

#[derive(Clone, Debug, Serialize)]
pub struct EntryResponse {
    pub position: usize,
    pub username: String,
    pub avatar_url: String,
    pub pr_count: u32,
    pub issue_count: u32,
    pub commit_count: u32,
    pub total_count: u32,
}

impl EntryResponse {
    fn new(position: usize, tally: UserTally) -> Self {
        Self {
            position,
            username: tally.username,
            avatar_url: tally.avatar_url,
            pr_count: tally.pr_count,
            issue_count: tally.issue_count,
            commit_count: tally.commit_count,
            total_count: tally.total_count,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct LeaderboardResponse {
    pub period: Period,
    pub status: StatusResponse,
    pub message: Option<String>,
    pub window: Option<TimeWindow>,
    pub records: Vec<EntryResponse>,
}

impl From<Snapshot> for LeaderboardResponse {
    fn from(snapshot: Snapshot) -> Self {
        let period = snapshot.period;
        match snapshot.status {
            Status::Loading => Self {
                period,
                status: StatusResponse::Loading,
                message: None,
                window: None,
                records: vec![],
            },
            Status::Errored(message) => Self {
                period,
                status: StatusResponse::Errored,
                message: Some(message),
                window: None,
                records: vec![],
            },
            Status::Ready(view) => Self {
                period,
                status: StatusResponse::Ready,
                message: None,
                window: Some(view.window),
                records: view
                    .entries
                    .into_iter()
                    .enumerate()
                    .map(|(index, tally)| EntryResponse::new(index + 1, tally))
                    .collect(),
            },
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PassResponse {
    pub generation: u64,
    pub period: Period,
}

impl From<PassToken> for PassResponse {
    fn from(token: PassToken) -> Self {
        Self {
            generation: token.generation,
            period: token.period,
        }
    }
}
