use std::path::Path;
use std::process::Command;

use anyhow::Context;
use anyhow::Result;

use crate::issue::GITHUB_API_URL_BASE;
use crate::labels::RemovePolicy;

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const TOKEN_KEY: &str = "garden.githubToken";
const API_BASE_KEY: &str = "garden.apiBase";
const REMOVE_KEY: &str = "garden.removeLabels";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub github_token: Option<String>,
    pub api_base: String,
    pub remove_policy: RemovePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            api_base: GITHUB_API_URL_BASE.to_string(),
            remove_policy: RemovePolicy::default(),
        }
    }
}

impl Config {
    /// Load config from git config in the current directory, with `$GITHUB_TOKEN` taking
    /// precedence over the stored token.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_in(Path::new("."))?;
        if let Some(token) = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty()) {
            config.github_token = Some(token);
        }
        Ok(config)
    }

    /// Load config from git config as seen from `dir`. Missing keys fall back to defaults.
    pub fn load_in(dir: &Path) -> Result<Self> {
        let defaults = Self::default();

        let remove_policy = match git_config_get(dir, REMOVE_KEY)? {
            Some(value) => value
                .parse()
                .with_context(|| format!("Invalid value for {}", REMOVE_KEY))?,
            None => defaults.remove_policy,
        };

        Ok(Self {
            github_token: git_config_get(dir, TOKEN_KEY)?,
            api_base: git_config_get(dir, API_BASE_KEY)?.unwrap_or(defaults.api_base),
            remove_policy,
        })
    }

    /// Save config to the repository's .git/config
    pub fn save_in(&self, dir: &Path) -> Result<()> {
        if let Some(token) = &self.github_token {
            git_config_set(dir, TOKEN_KEY, token)?;
        }
        git_config_set(dir, API_BASE_KEY, &self.api_base)?;
        git_config_set(dir, REMOVE_KEY, &self.remove_policy.to_string())?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_in(Path::new("."))
    }

    /// Create a new config with explicit values (useful for tests)
    pub fn new(
        github_token: Option<String>,
        api_base: String,
        remove_policy: RemovePolicy,
    ) -> Self {
        Self {
            github_token,
            api_base,
            remove_policy,
        }
    }

    /// Default config for tests
    pub fn default_for_tests() -> Self {
        Self {
            github_token: Some("test-token".to_string()),
            ..Self::default()
        }
    }
}

/// `git config --get`; `None` when the key is unset or git is unavailable.
fn git_config_get(dir: &Path, key: &str) -> Result<Option<String>> {
    let Ok(output) = Command::new("git")
        .current_dir(dir)
        .args(["config", "--get", key])
        .output()
    else {
        return Ok(None);
    };

    if !output.status.success() {
        return Ok(None);
    }

    let value = String::from_utf8(output.stdout)
        .with_context(|| format!("{} is not valid UTF-8", key))?
        .trim()
        .to_string();
    Ok(Some(value).filter(|v| !v.is_empty()))
}

fn git_config_set(dir: &Path, key: &str, value: &str) -> Result<()> {
    let output = Command::new("git")
        .current_dir(dir)
        .args(["config", key, value])
        .output()
        .context("Failed to execute git command")?;

    if !output.status.success() {
        anyhow::bail!(
            "Failed to save {} to .git/config: {}",
            key,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    Ok(())
}
