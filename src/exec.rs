//! External command execution with audit printing.
//!
//! Every invocation prints the command before running it and its output after,
//! waits synchronously with no timeout (a hung child hangs the run — an
//! accepted limitation), and classifies success strictly by exit code zero.

use std::path::Path;

use tokio::process::Command;

use crate::errors::SyncError;

/// Split a Gerrit download command into its `&&`-separated shell steps,
/// trimming surrounding whitespace and double quotes from each step.
///
/// Beyond the outer trim, each step is handed to the shell intact; splitting
/// on whitespace instead would break commands containing quoted arguments
/// with spaces.
pub fn split_steps(command: &str) -> Vec<String> {
    command
        .split("&&")
        .map(|step| step.trim().trim_matches('"').to_string())
        .filter(|step| !step.is_empty())
        .collect()
}

/// Run one step through `sh -c` in `cwd`, returning its stdout on success.
pub async fn run_shell(step: &str, cwd: &Path) -> Result<String, SyncError> {
    println!("Command to be executed {step}");
    let output = Command::new("sh")
        .arg("-c")
        .arg(step)
        .current_dir(cwd)
        .output()
        .await
        .map_err(|e| SyncError::CommandFailed {
            command: step.to_string(),
            detail: format!("launch failure: {e}"),
        })?;
    classify(step, &output)
}

/// Run a program directly (no shell) in `cwd`, returning its stdout on success.
pub async fn run_program(program: &Path, cwd: &Path) -> Result<String, SyncError> {
    let name = program.display().to_string();
    println!("Command to be executed {name}");
    let output = Command::new(program)
        .current_dir(cwd)
        .output()
        .await
        .map_err(|e| SyncError::CommandFailed {
            command: name.clone(),
            detail: format!("launch failure: {e}"),
        })?;
    classify(&name, &output)
}

fn classify(command: &str, output: &std::process::Output) -> Result<String, SyncError> {
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if output.status.success() {
        println!("Executed:\n{stdout}");
        Ok(stdout)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !stderr.is_empty() {
            eprintln!("{stderr}");
        }
        Err(SyncError::CommandFailed {
            command: command.to_string(),
            detail: format!("{}: {stderr}", output.status),
        })
    }
}
