use anyhow::Result;
use anyhow::bail;
use futures_util::future::join_all;

use crate::App;

impl App {
    /// Add `label` to every issue in `issues`.
    ///
    /// All requests are issued before any is awaited, so they run concurrently. Each issue gets a
    /// status line; the command fails if any request did.
    pub async fn cmd_add(
        &self,
        label: &str,
        issues: &[String],
        stdout: &mut impl std::io::Write,
    ) -> Result<()> {
        let issue_urls: Vec<String> = issues.iter().map(|issue| self.issue_url(issue)).collect();
        let tasks = issue_urls
            .iter()
            .map(|issue_url| self.labels.add_label(issue_url, label));
        let results = join_all(tasks).await;

        let change = format!("+{}", label);
        let mut failed = 0;
        for (issue_url, result) in issue_urls.iter().zip(results.iter()) {
            if !self.write_outcome(stdout, issue_url, &change, result)? {
                failed += 1;
            }
        }

        if failed > 0 {
            bail!("{} of {} label updates failed", failed, issue_urls.len());
        }
        Ok(())
    }
}
