use std::collections::HashMap;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{ActivityKind, ActivityRecord, Commit, Identity, Issue, Period, PullRequest, TimeWindow};

pub fn placeholder_avatar(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=374151&color=fff&size=32",
        urlencoding::encode(name)
    )
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserTally {
    pub username: String,
    pub avatar_url: String,
    pub pr_count: u32,
    pub issue_count: u32,
    pub commit_count: u32,
    pub total_count: u32,
}

impl UserTally {
    fn new(username: String) -> Self {
        Self {
            username,
            avatar_url: String::new(),
            pr_count: 0,
            issue_count: 0,
            commit_count: 0,
            total_count: 0,
        }
    }

    fn add(&mut self, kind: ActivityKind) {
        match kind {
            ActivityKind::PullRequest => self.pr_count += 1,
            ActivityKind::Issue => self.issue_count += 1,
            ActivityKind::Commit => self.commit_count += 1,
        }
        self.total_count += 1;
    }
}

/// Tallies keyed by display name.
///
/// Entries stay in first-seen order; ranking relies on that for ties.
#[derive(Default)]
struct TallyBook {
    positions: HashMap<String, usize>,
    tallies: Vec<UserTally>,
}

impl TallyBook {
    fn upsert(&mut self, identity: Identity) -> &mut UserTally {
        let index = match self.positions.get(&identity.name) {
            Some(index) => *index,
            None => {
                let index = self.tallies.len();
                self.positions.insert(identity.name.clone(), index);
                self.tallies.push(UserTally::new(identity.name));
                index
            }
        };

        let tally = &mut self.tallies[index];
        if tally.avatar_url.is_empty() {
            if let Some(avatar_url) = identity.avatar_url {
                tally.avatar_url = avatar_url;
            }
        }
        tally
    }

    fn record_all<R: ActivityRecord>(&mut self, records: &[R], window: &TimeWindow) {
        let in_window = records.iter().filter(|record| {
            record
                .timestamp()
                .is_some_and(|timestamp| window.contains(&timestamp))
        });
        for record in in_window {
            self.upsert(record.identity()).add(R::KIND);
        }
    }

    fn into_ranked(self) -> Vec<UserTally> {
        let mut tallies = self.tallies;
        for tally in tallies.iter_mut().filter(|tally| tally.avatar_url.is_empty()) {
            tally.avatar_url = placeholder_avatar(&tally.username);
        }
        // Stable, so equal totals keep first-seen order.
        tallies.sort_by(|a, b| b.total_count.cmp(&a.total_count));
        tallies
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardView {
    pub period: Period,
    pub window: TimeWindow,
    pub entries: Vec<UserTally>,
}

impl LeaderboardView {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries with their 1-based position.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &UserTally)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, tally)| (index + 1, tally))
    }
}

/// Ranks everyone active in the `period` window around `now`.
///
/// Kinds are tallied pull requests first, then issues, then commits, each in
/// input order. That order decides ties.
pub fn compute_leaderboard<Tz: TimeZone>(
    pull_requests: &[PullRequest],
    issues: &[Issue],
    commits: &[Commit],
    period: Period,
    now: &DateTime<Tz>,
) -> LeaderboardView {
    let window = period.window(now);

    let mut book = TallyBook::default();
    book.record_all(pull_requests, &window);
    book.record_all(issues, &window);
    book.record_all(commits, &window);

    LeaderboardView {
        period,
        window,
        entries: book.into_ranked(),
    }
}
