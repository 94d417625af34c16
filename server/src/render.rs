use num_format::{Locale, ToFormattedString};
use shared::{LeaderboardView, Period};
use tabled::{settings::Style, Table, Tabled};

use crate::board::{Snapshot, Status};

pub fn title(period: Period) -> &'static str {
    match period {
        Period::Daily => "Today's Leaderboard",
        Period::Weekly => "This Week's Leaderboard",
    }
}

pub fn position_badge(position: usize) -> String {
    match position {
        1 => "👑".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("#{n}"),
    }
}

pub fn render(snapshot: &Snapshot) -> String {
    let body = match &snapshot.status {
        Status::Loading => "Loading...".to_string(),
        Status::Errored(message) => message.clone(),
        Status::Ready(view) if view.is_empty() => "No activity in this window yet.".to_string(),
        Status::Ready(view) => table(view),
    };
    format!("{}\n\n{body}\n", title(snapshot.period))
}

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Position")]
    badge: String,
    #[tabled(rename = "User")]
    username: String,
    #[tabled(rename = "PRs")]
    pr_count: String,
    #[tabled(rename = "Issues")]
    issue_count: String,
    #[tabled(rename = "Commits")]
    commit_count: String,
    #[tabled(rename = "Total")]
    total_count: String,
    #[tabled(rename = "Avatar")]
    avatar_url: String,
}

fn table(view: &LeaderboardView) -> String {
    let rows = view.ranked().map(|(position, tally)| Row {
        badge: position_badge(position),
        username: tally.username.clone(),
        pr_count: tally.pr_count.to_formatted_string(&Locale::en),
        issue_count: tally.issue_count.to_formatted_string(&Locale::en),
        commit_count: tally.commit_count.to_formatted_string(&Locale::en),
        total_count: tally.total_count.to_formatted_string(&Locale::en),
        avatar_url: tally.avatar_url.clone(),
    });

    Table::new(rows).with(Style::psql()).to_string()
}

#[cfg(test)]
mod tests {
    use shared::{compute_leaderboard, PullRequest};
    use unicode_width::UnicodeWidthStr;

    use super::*;

    fn snapshot(status: Status) -> Snapshot {
        Snapshot {
            generation: 1,
            period: Period::Daily,
            status,
        }
    }

    fn view(logins: &[&str]) -> LeaderboardView {
        let now = chrono::Utc::now();
        let prs: Vec<PullRequest> = logins
            .iter()
            .map(|login| {
                serde_json::from_value(serde_json::json!({
                    "user": { "login": login, "avatar_url": format!("https://a.example/{login}") },
                    "created_at": now.to_rfc3339(),
                }))
                .unwrap()
            })
            .collect();
        compute_leaderboard(&prs, &[], &[], Period::Daily, &now)
    }

    #[test]
    fn badges() {
        assert_eq!(position_badge(1), "👑");
        assert_eq!(position_badge(2), "🥈");
        assert_eq!(position_badge(3), "🥉");
        assert_eq!(position_badge(4), "#4");
        assert_eq!(position_badge(12), "#12");
    }

    #[test]
    fn loading_errored_and_empty_are_distinct() {
        let loading = render(&snapshot(Status::Loading));
        let errored = render(&snapshot(Status::Errored("Failed".to_string())));
        let empty = render(&snapshot(Status::Ready(view(&[]))));

        assert_eq!(loading, "Today's Leaderboard\n\nLoading...\n");
        assert!(errored.ends_with("Failed\n"));
        assert!(empty.contains("No activity"));
    }

    #[test]
    fn table_rows_follow_ranking() {
        let text = render(&snapshot(Status::Ready(view(&["bob", "alice", "alice", "carol", "dave"]))));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Today's Leaderboard");
        assert!(lines[2].trim_start().starts_with("Position | User "));
        assert!(lines[4].trim_start().starts_with("👑"));
        assert!(lines[4].contains("alice"));
        assert!(lines[5].contains("bob"));
        assert!(lines[6].contains("carol"));
        assert!(lines[7].trim_start().starts_with("#4"));
        assert!(lines[7].contains("https://a.example/dave"));
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn columns_line_up_with_wide_badges() {
        let logins: Vec<String> = (0..12).map(|i| format!("user{i}")).collect();
        let logins: Vec<&str> = logins.iter().map(String::as_str).collect();
        let text = render(&snapshot(Status::Ready(view(&logins))));

        let table: Vec<&str> = text.lines().skip(2).collect();
        assert_eq!(table.len(), 14);
        let header_width = table[0].width();
        for line in &table {
            assert_eq!(line.width(), header_width, "misaligned line: {line:?}");
        }

        let separator = table[0].find(" | ").unwrap();
        for line in table.iter().skip(2) {
            let (badge, _) = line.split_once(" | ").unwrap();
            assert_eq!(badge.width(), table[0][..separator].width());
        }
    }
}
