use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;

use crate::clients::github_curl::HttpTransport;
use crate::config::Config;
use crate::issue::resolve_issue_url;
use crate::labels::LabelResult;
use crate::labels::LabelUpdater;

pub struct App {
    pub config: Config,
    pub transport: Arc<dyn HttpTransport>,
    pub labels: LabelUpdater,
}

impl App {
    pub fn new(config: Config, transport: Arc<dyn HttpTransport>) -> Self {
        let labels =
            LabelUpdater::new(Arc::clone(&transport)).with_remove_policy(config.remove_policy);
        Self {
            config,
            transport,
            labels,
        }
    }

    /// Resolve an issue argument (shorthand, browser URL or API URL) to its API URL
    pub(crate) fn issue_url(&self, issue: &str) -> String {
        resolve_issue_url(&self.config.api_base, issue)
    }
}

/// Shared helper methods for App
impl App {
    /// Write one status line for a finished label request, returning whether it succeeded
    pub(crate) fn write_outcome(
        &self,
        stdout: &mut impl std::io::Write,
        issue_url: &str,
        change: &str,
        result: &LabelResult,
    ) -> Result<bool> {
        match result {
            Ok(_) => {
                writeln!(stdout, "{} {} {}", "✓".green(), issue_url, change)?;
                Ok(true)
            }
            Err(err) => {
                writeln!(stdout, "{} {} {}: {}", "✗".red(), issue_url, change, err)?;
                if err.is_auth() {
                    writeln!(
                        stdout,
                        "  {}",
                        "Run 'garden init' or set GITHUB_TOKEN to authenticate.".dimmed()
                    )?;
                }
                Ok(false)
            }
        }
    }
}
