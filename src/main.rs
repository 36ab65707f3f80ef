use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use topicsync::config::SyncConfig;
use topicsync::gerrit::{DownloadStrategy, ReviewStatus};

mod cmd;

#[derive(Parser)]
#[command(name = "topicsync")]
#[command(version, about = "Sync every change in a Gerrit topic into a multi-repository workspace")]
pub struct Cli {
    /// Verbosity level (repeat for more detail)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Handle a plain git-managed project (reserved, not implemented)
    Git,
    /// Sync a Gerrit topic into a repo-managed workspace
    Repo {
        /// Path to the manifest file (default: $MY_REPO_ROOT_DIR/.repo/manifests/default.xml)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Path to the repo workspace root (default: $MY_REPO_ROOT_DIR)
        #[arg(short = 'r', long)]
        repo_root_dir: Option<PathBuf>,

        /// Gerrit topic grouping the changes to sync
        #[arg(short, long)]
        topic: String,

        /// Gerrit base URL
        #[arg(short, long)]
        gerrit: String,

        /// Print download commands without executing them
        #[arg(long)]
        dry_run: bool,

        /// Strategy used to download each change
        #[arg(short = 'd', long, value_enum)]
        download_strategy: DownloadStrategy,

        /// Review status filter (repeatable)
        #[arg(short, long, value_enum)]
        status: Vec<ReviewStatus>,

        /// Branch filter (repeatable)
        #[arg(short, long)]
        branch: Vec<String>,

        /// Skip changes whose Change-Id already appears in recent local history
        #[arg(short = 'a', long)]
        avoid_re_download: bool,

        /// External fixer script run inside a project after a failed apply
        #[arg(short = 'f', long)]
        merge_fixer: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Git => cmd::cmd_git()?,
        Commands::Repo {
            manifest,
            repo_root_dir,
            topic,
            gerrit,
            dry_run,
            download_strategy,
            status,
            branch,
            avoid_re_download,
            merge_fixer,
        } => {
            let (manifest, repo_root_dir) = SyncConfig::resolve_paths(manifest, repo_root_dir);
            let config = SyncConfig {
                manifest,
                repo_root_dir,
                gerrit,
                topic,
                download_strategy,
                statuses: status,
                branches: branch,
                dry_run,
                avoid_re_download,
                merge_fixer,
                verbose: cli.verbose,
            };
            cmd::cmd_repo(config).await?;
        }
    }

    Ok(())
}
