use std::path::Path;

use anyhow::Result;
use dialoguer::Input;
use dialoguer::Select;

use crate::config::Config;
use crate::labels::RemovePolicy;

/// Prompt for settings and save them to .git/config
pub fn cmd_init(stdout: &mut impl std::io::Write) -> Result<()> {
    // Stored values only, so $GITHUB_TOKEN is not written to disk
    let current_config = Config::load_in(Path::new(".")).unwrap_or_default();

    writeln!(stdout, "Create a fine-grained personal access token at:")?;
    writeln!(stdout, "https://github.com/settings/personal-access-tokens/new")?;
    writeln!(stdout)?;
    writeln!(stdout, "Required permissions:")?;
    writeln!(stdout, "  - Issues: Read and write")?;
    writeln!(stdout)?;

    let github_token: String = Input::new()
        .with_prompt("GitHub Personal Access Token")
        .default(current_config.github_token.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let api_base: String = Input::new()
        .with_prompt("GitHub API base URL")
        .default(current_config.api_base.clone())
        .interact_text()?;

    let policies = [RemovePolicy::LogOnly, RemovePolicy::Remote];
    let current = policies
        .iter()
        .position(|p| *p == current_config.remove_policy)
        .unwrap_or(0);
    let selected = Select::new()
        .with_prompt("When removing a label")
        .items(&[
            "log only (leave the label on GitHub)",
            "remove it on GitHub",
        ])
        .default(current)
        .interact()?;

    let github_token = Some(github_token).filter(|t| !t.is_empty());
    let new_config = Config::new(github_token, api_base, policies[selected]);
    new_config.save()?;

    writeln!(stdout, "Configuration saved to .git/config")?;

    Ok(())
}
