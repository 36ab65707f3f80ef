//! Typed error taxonomy for the sync pipeline.
//!
//! Each variant carries an explicit continue/abort policy decided by the
//! orchestrator:
//! - configuration errors abort before any change is processed
//! - a missing download-strategy command fails that change but not the run
//! - execution failures are recoverable only through the merge fixer
//! - fixer failures always abort

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Manifest {0} does not exist")]
    ManifestMissing(PathBuf),

    #[error("Repo root dir {0} does not exist")]
    RootDirMissing(PathBuf),

    #[error("Merge fixer {0} does not exist")]
    FixerMissing(PathBuf),

    #[error("Failed to read manifest {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Gerrit query failed: {0}")]
    Query(#[from] reqwest::Error),

    #[error("Failed to parse Gerrit response: {0}")]
    Response(#[from] serde_json::Error),

    #[error("Change {change_id} project {project:?} is not a remote/repository pair")]
    ProjectIdentity { project: String, change_id: String },

    #[error("Can't get command for {strategy} download strategy (change {change_id})")]
    StrategyMissing { strategy: String, change_id: String },

    #[error("Command `{command}` failed: {detail}")]
    CommandFailed { command: String, detail: String },

    #[error("Merge fixer failed: {detail}")]
    FixerFailed { detail: String },
}
