use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use chrono::Utc;
use clap::Subcommand;
use garden::App;
use garden::Config;
use garden::clients::github_curl::GithubCurlClient;
use garden::commands::garden::GardenOptions;
use garden::commands::init::cmd_init;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "garden")]
#[command(about = "Garden GitHub issues: add, remove and replace labels", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure the token, API base URL and remove policy
    Init,
    #[command(flatten)]
    Remote(RemoteCommand),
}

/// Commands that talk to the GitHub API.
#[derive(Subcommand)]
pub enum RemoteCommand {
    /// Add a label to one or more issues
    Add {
        /// Label to add
        label: String,
        /// Issues as owner/repo#N, a github.com URL or an API URL
        #[arg(required = true)]
        issues: Vec<String>,
    },
    /// Remove a label from an issue (only logged unless garden.removeLabels=remote)
    Remove { issue: String, label: String },
    /// Add NEW and remove OLD on an issue
    Replace {
        issue: String,
        old: String,
        new: String,
    },
    /// List the labels defined in a repository (owner/repo)
    Labels { repo: String },
    /// Show the labels currently on an issue
    Show { issue: String },
    /// List open issues and pull requests that no team or person has picked up
    Garden {
        /// Repository as owner/repo
        repo: String,
        /// Only report issues
        #[arg(short, long)]
        issues: bool,
        /// Only report pull requests
        #[arg(short, long)]
        pull_requests: bool,
        /// Skip items updated less than this many days ago
        #[arg(short, long, default_value_t = 0)]
        stale_for_days: i64,
    },
}

fn setup_logging() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

async fn run(command: RemoteCommand, stdout: &mut impl std::io::Write) -> Result<()> {
    let config = Config::load()?;
    let transport = Arc::new(GithubCurlClient::new(config.github_token.clone()));
    let app = App::new(config, transport);

    match command {
        RemoteCommand::Add { label, issues } => app.cmd_add(&label, &issues, stdout).await,
        RemoteCommand::Remove { issue, label } => app.cmd_remove(&issue, &label, stdout).await,
        RemoteCommand::Replace { issue, old, new } => {
            app.cmd_replace(&issue, &old, &new, stdout).await
        }
        RemoteCommand::Labels { repo } => app.cmd_labels(&repo, stdout).await,
        RemoteCommand::Show { issue } => app.cmd_show(&issue, stdout).await,
        RemoteCommand::Garden {
            repo,
            issues,
            pull_requests,
            stale_for_days,
        } => {
            // Neither flag means both sections
            let both = !issues && !pull_requests;
            let options = GardenOptions {
                stale_for_days,
                issues: issues || both,
                pull_requests: pull_requests || both,
                ..GardenOptions::new(Utc::now())
            };
            app.cmd_garden(&repo, &options, stdout).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cli = Cli::parse();
    let stdout = &mut std::io::stdout();

    match cli.command {
        Commands::Init => cmd_init(stdout)?,
        Commands::Remote(command) => run(command, stdout).await?,
    }

    Ok(())
}
