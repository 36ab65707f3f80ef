//! End-to-end topic sync: validate, query, then apply each change in
//! server-returned order.
//!
//! Processing is strictly sequential — later changes in a topic may depend on
//! earlier ones already being applied to the same working tree, so there is no
//! parallelism and no reordering. An apply failure is recoverable only through
//! the configured merge fixer; a fixer failure aborts the run.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, bail};
use console::style;

use crate::config::SyncConfig;
use crate::errors::SyncError;
use crate::exec;
use crate::gerrit::{ChangeRecord, GerritClient};
use crate::history;
use crate::manifest::ManifestResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyStatus {
    Applied,
    SkippedDuplicate,
    SkippedNoPath,
    Failed,
    /// The apply failed but the merge fixer exited zero. The change is not
    /// complete: the operator still has to finish the cherry-pick.
    FailedAndFixed,
}

impl fmt::Display for ApplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApplyStatus::Applied => "applied",
            ApplyStatus::SkippedDuplicate => "skipped-duplicate",
            ApplyStatus::SkippedNoPath => "skipped-no-path",
            ApplyStatus::Failed => "failed",
            ApplyStatus::FailedAndFixed => "failed-and-fixed",
        };
        f.write_str(label)
    }
}

/// Per-change result, reported in the end-of-run summary and never persisted.
#[derive(Debug)]
pub struct ApplyOutcome {
    pub change_id: String,
    pub status: ApplyStatus,
    pub output: String,
}

pub struct TopicSync {
    config: SyncConfig,
    gerrit: GerritClient,
    resolver: ManifestResolver,
}

impl TopicSync {
    pub fn new(config: SyncConfig) -> Self {
        let gerrit = GerritClient::new(config.gerrit.clone(), config.verbose);
        let resolver =
            ManifestResolver::new(config.manifest.clone(), config.repo_root_dir.clone());
        Self {
            config,
            gerrit,
            resolver,
        }
    }

    /// Run the full pipeline. `Ok` covers runs where individual changes were
    /// skipped or failed-and-fixed; `Err` means the run aborted (or, for a
    /// missing strategy command, that at least one change was unusable).
    pub async fn run(&mut self) -> Result<Vec<ApplyOutcome>> {
        self.config.validate()?;

        println!("Using manifest {}", self.config.manifest.display());
        println!("Using repo root dir {}", self.config.repo_root_dir.display());
        println!("Using gerrit {}", self.config.gerrit);
        println!("Using download strategy {}", self.config.download_strategy);

        let changes = self
            .gerrit
            .query_changes(
                &self.config.topic,
                &self.config.statuses,
                &self.config.branches,
            )
            .await?;

        let mut outcomes = Vec::with_capacity(changes.len());
        for change in &changes {
            outcomes.push(self.apply_change(change).await?);
        }

        self.print_summary(&outcomes);

        let failed = outcomes
            .iter()
            .filter(|o| o.status == ApplyStatus::Failed)
            .count();
        if failed > 0 {
            bail!("{failed} change(s) had no usable download command");
        }
        Ok(outcomes)
    }

    async fn apply_change(&mut self, change: &ChangeRecord) -> Result<ApplyOutcome> {
        let (remote, repository) = change.split_project()?;
        println!(
            "Detected change number {} ID {} project {} repository {}",
            change.number, change.change_id, remote, repository
        );

        let Some(project_path) = self.resolver.resolve(remote, repository)? else {
            println!(
                "No manifest entry for {remote}/{repository}, skipping {}",
                change.change_id
            );
            return Ok(self.outcome(change, ApplyStatus::SkippedNoPath, String::new()));
        };
        println!("Disk path {}", project_path.display());

        let command = match change.download_command(self.config.download_strategy) {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{} {err}", style("Error:").red());
                return Ok(self.outcome(change, ApplyStatus::Failed, err.to_string()));
            }
        };

        if self.config.avoid_re_download
            && history::was_applied(
                &project_path,
                &change.change_id,
                history::DEFAULT_SEARCH_DEPTH,
            )
            .await?
        {
            println!("Skipping {}", change.change_id);
            return Ok(self.outcome(change, ApplyStatus::SkippedDuplicate, String::new()));
        }

        let steps = exec::split_steps(command);
        println!("Commands to be executed {steps:?}");

        if self.config.dry_run {
            println!("Dry run, not executing");
            return Ok(self.outcome(change, ApplyStatus::Applied, "dry run".to_string()));
        }

        let mut captured = String::new();
        for step in &steps {
            match exec::run_shell(step, &project_path).await {
                Ok(stdout) => {
                    if !captured.is_empty() {
                        captured.push('\n');
                    }
                    captured.push_str(&stdout);
                }
                Err(err) => {
                    eprintln!("{} {err}", style("Apply failed:").red());
                    return match self.config.merge_fixer.clone() {
                        Some(fixer) => {
                            self.run_fixer(&fixer, &project_path).await?;
                            Ok(self.outcome(
                                change,
                                ApplyStatus::FailedAndFixed,
                                err.to_string(),
                            ))
                        }
                        None => Err(err.into()),
                    };
                }
            }
        }

        Ok(self.outcome(change, ApplyStatus::Applied, captured))
    }

    /// Copy the fixer into the conflicted checkout, make it executable, run
    /// it with no arguments, and remove the copy regardless of outcome.
    async fn run_fixer(&self, fixer: &Path, project_path: &Path) -> Result<()> {
        let file_name = fixer
            .file_name()
            .context("Merge fixer path has no file name")?;
        let target = project_path.join(file_name);
        std::fs::copy(fixer, &target)
            .with_context(|| format!("Failed to copy merge fixer to {}", target.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&target)?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&target, perms)?;
        }

        println!(
            "Running merge fixer {} in {}",
            fixer.display(),
            project_path.display()
        );
        let result = exec::run_program(&target, project_path).await;
        let _ = std::fs::remove_file(&target);

        match result {
            Ok(_) => {
                println!(
                    "{} conflicts staged; finish the cherry-pick manually",
                    style("Fixed:").yellow()
                );
                Ok(())
            }
            Err(err) => Err(SyncError::FixerFailed {
                detail: err.to_string(),
            }
            .into()),
        }
    }

    fn outcome(&self, change: &ChangeRecord, status: ApplyStatus, output: String) -> ApplyOutcome {
        ApplyOutcome {
            change_id: change.change_id.clone(),
            status,
            output,
        }
    }

    fn print_summary(&self, outcomes: &[ApplyOutcome]) {
        println!("\n{}", style("Topic sync summary").bold());
        if outcomes.is_empty() {
            println!("  no changes matched the query");
            return;
        }
        for outcome in outcomes {
            let status = match outcome.status {
                ApplyStatus::Applied => style(outcome.status.to_string()).green(),
                ApplyStatus::FailedAndFixed => style(outcome.status.to_string()).yellow(),
                ApplyStatus::Failed => style(outcome.status.to_string()).red(),
                _ => style(outcome.status.to_string()).dim(),
            };
            println!("  {} {status}", outcome.change_id);
        }
    }
}
