use anyhow::Result;
use anyhow::bail;

use crate::App;

impl App {
    /// Replace `old_label` with `new_label` on one issue.
    ///
    /// The new label is requested first. The old one is then removed according to the configured
    /// remove policy, regardless of whether the add succeeded.
    pub async fn cmd_replace(
        &self,
        issue: &str,
        old_label: &str,
        new_label: &str,
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let issue_url = self.issue_url(issue);
        let replacement = self.labels.replace_label(&issue_url, old_label, new_label);

        let added = replacement.added.await;
        let add_ok = self.write_outcome(stdout, &issue_url, &format!("+{}", new_label), &added)?;
        self.write_removal(stdout, &issue_url, old_label, replacement.removed)
            .await?;

        if !add_ok {
            bail!("Failed to add label {}", new_label);
        }
        Ok(())
    }
}
