//! Finding open issues and pull requests that still need a gardener.
//!
//! An item needs gardening when nobody owns it: no `team-*` label, no assignee, not marked `WIP`,
//! and untouched for at least the requested number of days. Pull requests must also have a
//! signed CLA (`cla: yes`) before they are worth routing.

use chrono::DateTime;
use chrono::Utc;

use crate::catalog::Issue;

/// Labels naming the owning team start with this prefix.
pub const TEAM_LABEL_PREFIX: &str = "team-";
pub const WIP_LABEL: &str = "WIP";
pub const CLA_LABEL: &str = "cla: yes";

const TITLE_WIDTH: usize = 48;

impl Issue {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }

    pub fn team_labels(&self) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .map(|l| l.name.as_str())
            .filter(|name| name.starts_with(TEAM_LABEL_PREFIX))
    }

    pub fn has_team_label(&self) -> bool {
        self.team_labels().next().is_some()
    }

    pub fn is_open(&self) -> bool {
        self.state == "open"
    }

    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn work_in_progress(&self) -> bool {
        self.has_label(WIP_LABEL)
    }

    pub fn has_cla(&self) -> bool {
        self.has_label(CLA_LABEL)
    }

    /// Whole days since the last update.
    pub fn days_since_update(&self, now: DateTime<Utc>) -> i64 {
        (now - self.updated_at).num_days()
    }

    pub fn is_stale(&self, now: DateTime<Utc>, stale_for_days: i64) -> bool {
        self.days_since_update(now) >= stale_for_days
    }

    /// Open, unowned, not in progress and stale.
    fn is_unattended(&self, now: DateTime<Utc>, stale_for_days: i64) -> bool {
        self.is_open()
            && !self.has_team_label()
            && self.assignee.is_none()
            && !self.work_in_progress()
            && self.is_stale(now, stale_for_days)
    }
}

/// Issues (not pull requests) that need gardening, in input order.
pub fn issues_to_garden(
    issues: &[Issue],
    now: DateTime<Utc>,
    stale_for_days: i64,
) -> Vec<&Issue> {
    issues
        .iter()
        .filter(|i| !i.is_pull_request() && i.is_unattended(now, stale_for_days))
        .collect()
}

/// Pull requests that need gardening, in input order.
pub fn pull_requests_to_garden(
    issues: &[Issue],
    now: DateTime<Utc>,
    stale_for_days: i64,
) -> Vec<&Issue> {
    issues
        .iter()
        .filter(|i| i.is_pull_request() && i.is_unattended(now, stale_for_days) && i.has_cla())
        .collect()
}

/// One report line: age in days, URL and title.
pub fn format_line(issue: &Issue, now: DateTime<Utc>) -> String {
    let line = format!(
        "{:<4} | {:<47} | {:<50}",
        issue.days_since_update(now),
        issue.html_url,
        truncate(&issue.title, TITLE_WIDTH)
    );
    line.trim_end().to_string()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        format!("{}..", text.chars().take(width).collect::<String>())
    } else {
        text.to_string()
    }
}
