use anyhow::Result;
use anyhow::bail;
use colored::Colorize;

use crate::App;
use crate::labels::Removal;

impl App {
    pub async fn cmd_remove(
        &self,
        issue: &str,
        label: &str,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let issue_url = self.issue_url(issue);
        let removal = self.labels.remove_label(&issue_url, label);
        self.write_removal(stdout, &issue_url, label, removal).await
    }

    /// Report a removal, waiting for the DELETE when one was sent
    pub(crate) async fn write_removal(
        &self,
        stdout: &mut impl std::io::Write,
        issue_url: &str,
        label: &str,
        removal: Removal,
    ) -> Result<()> {
        let change = format!("-{}", label);
        match removal.finish().await {
            None => {
                writeln!(
                    stdout,
                    "{} {} {} {}",
                    "-".yellow(),
                    issue_url,
                    change,
                    "(logged only, label left on GitHub)".dimmed()
                )?;
            }
            Some(result) => {
                if !self.write_outcome(stdout, issue_url, &change, &result)? {
                    bail!("Failed to remove label {}", label);
                }
            }
        }
        Ok(())
    }
}
