use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use colored::Colorize;

use crate::App;
use crate::catalog::Issue;
use crate::catalog::fetch_open_issues;
use crate::report::format_line;
use crate::report::issues_to_garden;
use crate::report::pull_requests_to_garden;

const SEPARATOR: &str = "---------------------------";

/// Which sections of the gardening report to print, and relative to when.
#[derive(Debug, Clone)]
pub struct GardenOptions {
    pub stale_for_days: i64,
    pub issues: bool,
    pub pull_requests: bool,
    pub now: DateTime<Utc>,
}

impl GardenOptions {
    /// Both sections, nothing filtered by age.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            stale_for_days: 0,
            issues: true,
            pull_requests: true,
            now,
        }
    }
}

impl App {
    /// Report open issues and pull requests of `repo` that nobody has picked up
    pub async fn cmd_garden(
        &self,
        repo: &str,
        options: &GardenOptions,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let open = fetch_open_issues(self.transport.as_ref(), &self.config.api_base, repo)
            .await
            .with_context(|| format!("Failed to fetch open issues of {}", repo))?;

        if options.issues {
            let issues = issues_to_garden(&open, options.now, options.stale_for_days);
            write_section(
                stdout,
                "Open issues not assigned to any team or person",
                &issues,
                options.now,
            )?;
        }

        if options.pull_requests {
            let pulls = pull_requests_to_garden(&open, options.now, options.stale_for_days);
            write_section(
                stdout,
                "Open pull requests not assigned to any team or person",
                &pulls,
                options.now,
            )?;
        }

        Ok(())
    }
}

fn write_section(
    stdout: &mut impl std::io::Write,
    title: &str,
    items: &[&Issue],
    now: DateTime<Utc>,
) -> Result<()> {
    writeln!(stdout, "{}", title.bold())?;
    for item in items {
        writeln!(stdout, "{}", format_line(item, now))?;
    }
    writeln!(stdout, "{} issues", items.len())?;
    writeln!(stdout, "{}", SEPARATOR)?;
    Ok(())
}
