use anyhow::Context;
use anyhow::Result;
use colored::Colorize;

use crate::App;
use crate::catalog::Label;
use crate::catalog::fetch_issue_labels;
use crate::catalog::fetch_labels;

impl App {
    /// List the labels defined in `repo` (`owner/repo`)
    pub async fn cmd_labels(&self, repo: &str, stdout: &mut impl std::io::Write) -> Result<()> {
        let labels = fetch_labels(self.transport.as_ref(), &self.config.api_base, repo)
            .await
            .with_context(|| format!("Failed to fetch labels of {}", repo))?;
        write_labels(stdout, &labels)
    }

    /// List the labels currently on one issue
    pub async fn cmd_show(&self, issue: &str, stdout: &mut impl std::io::Write) -> Result<()> {
        let issue_url = self.issue_url(issue);
        let labels = fetch_issue_labels(self.transport.as_ref(), &issue_url)
            .await
            .with_context(|| format!("Failed to fetch labels of {}", issue_url))?;
        write_labels(stdout, &labels)
    }
}

fn write_labels(stdout: &mut impl std::io::Write, labels: &[Label]) -> Result<()> {
    if labels.is_empty() {
        writeln!(stdout, "{}", "(no labels)".dimmed())?;
        return Ok(());
    }

    let width = labels.iter().map(|l| l.name.chars().count()).max().unwrap_or(0);
    for label in labels {
        let padding = " ".repeat(width - label.name.chars().count());
        let line = format!(
            "{}{}  #{}  {}",
            label.name.bold(),
            padding,
            label.color,
            label.description.as_deref().unwrap_or("").dimmed()
        );
        writeln!(stdout, "{}", line.trim_end())?;
    }
    Ok(())
}
