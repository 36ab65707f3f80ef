use anyhow::Result;

/// Reserved subcommand for plain git-managed projects. Currently a no-op.
pub fn cmd_git() -> Result<()> {
    println!("The git subcommand is not implemented yet; use `repo` for repo-managed workspaces.");
    Ok(())
}
