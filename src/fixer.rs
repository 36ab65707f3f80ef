//! Conflict-marker stripping for an interrupted cherry-pick.
//!
//! When a cherry-pick stops on a two-sided conflict, every conflicted file is
//! rewritten with the marker lines removed — both the "ours" and "theirs"
//! hunks are kept back-to-back — and staged. This is a naive strip, not a
//! merge: it does not deduplicate or choose sides. Continuing the cherry-pick
//! is deliberately left to the operator, because `git cherry-pick --continue`
//! opens an interactive editor.

use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

/// Marker string `git status` prints while a cherry-pick is in progress.
pub const CHERRY_PICKING: &str = "You are currently cherry-picking commit";

const BOTH_ADDED: &str = "both added:";
const BOTH_MODIFIED: &str = "both modified:";

/// Line prefixes inserted by a conflicted merge.
const MARKER_PREFIXES: [&str; 3] = ["<<<<<<< ", "=======", ">>>>>>> "];

/// Remove every conflict-marker line, preserving all other lines in their
/// original relative order. Idempotent: a stripped file has no marker lines
/// left to match.
pub fn strip_conflict_markers(content: &str) -> String {
    let mut result: String = content
        .lines()
        .filter(|line| !MARKER_PREFIXES.iter().any(|prefix| line.starts_with(prefix)))
        .collect::<Vec<_>>()
        .join("\n");
    if content.ends_with('\n') && !result.is_empty() {
        result.push('\n');
    }
    result
}

/// Files named in `git status` output as two-sided conflicts (both added or
/// both modified — conflicts involving a deletion are left alone).
pub fn conflicted_files(status_output: &str) -> Vec<String> {
    status_output
        .lines()
        .filter(|line| line.contains(BOTH_ADDED) || line.contains(BOTH_MODIFIED))
        .filter_map(|line| line.split_once(':'))
        .map(|(_, file)| file.trim().to_string())
        .collect()
}

fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    println!("Running git {}:", args.join(" "));
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .with_context(|| format!("Failed to run git {}", args.join(" ")))?;
    if !output.status.success() {
        bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Fix every two-sided conflict in the working tree at `dir`.
///
/// Succeeds only when a cherry-pick is actually in progress and every
/// conflicted file was rewritten and staged. Finalizing the cherry-pick is
/// not attempted.
pub fn run(dir: &Path) -> Result<()> {
    println!("CWD {}", dir.display());

    let status = run_git(dir, &["status"])?;
    if !status.contains(CHERRY_PICKING) {
        bail!("No cherry-pick in progress in {}", dir.display());
    }
    println!("Detected cherry-picking {}", dir.display());

    for file in conflicted_files(&status) {
        println!("Identified file {file}");
        let path = dir.join(&file);
        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {file}"))?;
        // fs::write truncates, so no leftover bytes survive the rewrite.
        fs::write(&path, strip_conflict_markers(&content))
            .with_context(|| format!("Failed to rewrite {file}"))?;
        run_git(dir, &["add", &file])?;
    }

    Ok(())
}
