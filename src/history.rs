//! Bounded duplicate detection over local commit history.
//!
//! A change is considered already applied when its `Change-Id:` trailer shows
//! up in a recent commit message. The scan window is `min(count - 1, depth)`
//! commits from HEAD, so a change applied deeper in history is reported as
//! not-applied — an accepted false negative that keeps the scan cheap.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tokio::process::Command;

pub const DEFAULT_SEARCH_DEPTH: usize = 100;

async fn git_stdout(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .with_context(|| format!("Failed to run git {} in {}", args.join(" "), dir.display()))?;
    if !output.status.success() {
        bail!(
            "git {} failed in {}: {}",
            args.join(" "),
            dir.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Whether `change_id` appears in a `Change-Id:` trailer within the bounded
/// window of recent commits in the repository at `dir`.
pub async fn was_applied(dir: &Path, change_id: &str, max_depth: usize) -> Result<bool> {
    let rev_count: usize = git_stdout(dir, &["rev-list", "HEAD", "--count"])
        .await?
        .parse()
        .context("git rev-list --count returned a non-numeric value")?;

    let needle = format!("Change-Id: {change_id}");
    for depth in 0..rev_count.saturating_sub(1).min(max_depth) {
        let spec = format!("HEAD~{depth}");
        let message = git_stdout(
            dir,
            &["rev-list", "--format=%B", "--max-count", "1", spec.as_str()],
        )
        .await?;
        if message.contains(&needle) {
            println!("Found {change_id} in git log");
            return Ok(true);
        }
    }

    Ok(false)
}
