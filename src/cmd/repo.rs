use anyhow::Result;

use topicsync::config::SyncConfig;
use topicsync::sync::TopicSync;

/// Sync every change in the configured topic into the repo workspace.
pub async fn cmd_repo(config: SyncConfig) -> Result<()> {
    let mut sync = TopicSync::new(config);
    sync.run().await?;
    Ok(())
}
