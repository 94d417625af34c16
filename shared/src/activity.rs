//! Activity records as returned by the repository listing endpoints.
//!
//! Every field is optional so one malformed record never fails the list it
//! arrived in. Timestamps stay raw until [`ActivityRecord::timestamp`] parses
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

pub const UNKNOWN_USER: &str = "Unknown";

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Hash, Clone, Copy, Display)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    #[strum(to_string = "pull requests")]
    PullRequest,
    #[strum(to_string = "issues")]
    Issue,
    #[strum(to_string = "commits")]
    Commit,
}

/// A linked hosting account.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Account {
    pub login: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PullRequest {
    pub number: Option<u64>,
    pub user: Option<Account>,
    pub created_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Issue {
    pub number: Option<u64>,
    pub user: Option<Account>,
    pub created_at: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Commit {
    pub sha: Option<String>,
    /// Account linked to the commit author's email, if any.
    pub author: Option<Account>,
    pub commit: Option<CommitDetails>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CommitDetails {
    pub author: Option<Signature>,
}

/// Git author line embedded in the commit itself.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Signature {
    pub name: Option<String>,
    pub email: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub avatar_url: Option<String>,
}

impl Identity {
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_USER.to_string(),
            avatar_url: None,
        }
    }

    fn from_account(account: Option<&Account>) -> Option<Self> {
        let account = account?;
        let name = non_empty(account.login.as_deref())?;
        Some(Self {
            name: name.to_string(),
            avatar_url: non_empty(account.avatar_url.as_deref()).map(ToString::to_string),
        })
    }
}

/// Something attributable to one author at one instant.
pub trait ActivityRecord {
    const KIND: ActivityKind;

    /// `None` when the timestamp is missing or unparseable.
    fn timestamp(&self) -> Option<DateTime<Utc>>;

    /// Never fails, unattributable records belong to [`UNKNOWN_USER`].
    fn identity(&self) -> Identity;
}

impl ActivityRecord for PullRequest {
    const KIND: ActivityKind = ActivityKind::PullRequest;

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref())
    }

    fn identity(&self) -> Identity {
        Identity::from_account(self.user.as_ref()).unwrap_or_else(Identity::unknown)
    }
}

impl ActivityRecord for Issue {
    const KIND: ActivityKind = ActivityKind::Issue;

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref())
    }

    fn identity(&self) -> Identity {
        Identity::from_account(self.user.as_ref()).unwrap_or_else(Identity::unknown)
    }
}

impl Commit {
    fn signature(&self) -> Option<&Signature> {
        self.commit.as_ref()?.author.as_ref()
    }
}

impl ActivityRecord for Commit {
    const KIND: ActivityKind = ActivityKind::Commit;

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.signature()?.date.as_deref())
    }

    fn identity(&self) -> Identity {
        if let Some(identity) = Identity::from_account(self.author.as_ref()) {
            return identity;
        }

        self.signature()
            .and_then(|signature| non_empty(signature.name.as_deref()))
            .map(|name| Identity {
                name: name.to_string(),
                avatar_url: None,
            })
            .unwrap_or_else(Identity::unknown)
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw?)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
