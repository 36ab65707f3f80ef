//! Runtime configuration for a `repo` sync run.

use std::path::PathBuf;

use crate::errors::SyncError;
use crate::gerrit::{DownloadStrategy, ReviewStatus};

/// Environment variable supplying default manifest and workspace-root paths.
pub const ROOT_DIR_ENV: &str = "MY_REPO_ROOT_DIR";

/// Manifest location inside a repo-managed workspace root.
const DEFAULT_MANIFEST: &str = ".repo/manifests/default.xml";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub manifest: PathBuf,
    pub repo_root_dir: PathBuf,
    pub gerrit: String,
    pub topic: String,
    pub download_strategy: DownloadStrategy,
    pub statuses: Vec<ReviewStatus>,
    pub branches: Vec<String>,
    pub dry_run: bool,
    pub avoid_re_download: bool,
    pub merge_fixer: Option<PathBuf>,
    pub verbose: u8,
}

impl SyncConfig {
    /// Fill unset manifest/root paths from `MY_REPO_ROOT_DIR`.
    pub fn resolve_paths(
        manifest: Option<PathBuf>,
        root_dir: Option<PathBuf>,
    ) -> (PathBuf, PathBuf) {
        let env_root = std::env::var_os(ROOT_DIR_ENV).map(PathBuf::from);
        Self::paths_from(manifest, root_dir, env_root)
    }

    fn paths_from(
        manifest: Option<PathBuf>,
        root_dir: Option<PathBuf>,
        env_root: Option<PathBuf>,
    ) -> (PathBuf, PathBuf) {
        let env_root = env_root.unwrap_or_default();
        let manifest = manifest.unwrap_or_else(|| env_root.join(DEFAULT_MANIFEST));
        let root_dir = root_dir.unwrap_or(env_root);
        (manifest, root_dir)
    }

    /// Check every configured path before any change is processed. A failure
    /// here aborts the run up front.
    pub fn validate(&self) -> Result<(), SyncError> {
        if !self.manifest.exists() {
            return Err(SyncError::ManifestMissing(self.manifest.clone()));
        }
        if !self.repo_root_dir.exists() {
            return Err(SyncError::RootDirMissing(self.repo_root_dir.clone()));
        }
        if let Some(fixer) = &self.merge_fixer
            && !fixer.exists()
        {
            return Err(SyncError::FixerMissing(fixer.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn base_config(manifest: PathBuf, root: PathBuf) -> SyncConfig {
        SyncConfig {
            manifest,
            repo_root_dir: root,
            gerrit: "https://review.example.com".to_string(),
            topic: "my-topic".to_string(),
            download_strategy: DownloadStrategy::Pull,
            statuses: vec![],
            branches: vec![],
            dry_run: false,
            avoid_re_download: false,
            merge_fixer: None,
            verbose: 0,
        }
    }

    #[test]
    fn paths_default_from_env_root() {
        let (manifest, root) = SyncConfig::paths_from(None, None, Some(PathBuf::from("/ws")));
        assert_eq!(manifest, PathBuf::from("/ws/.repo/manifests/default.xml"));
        assert_eq!(root, PathBuf::from("/ws"));
    }

    #[test]
    fn explicit_paths_override_env() {
        let (manifest, root) = SyncConfig::paths_from(
            Some(PathBuf::from("/custom/manifest.xml")),
            Some(PathBuf::from("/custom/root")),
            Some(PathBuf::from("/ws")),
        );
        assert_eq!(manifest, PathBuf::from("/custom/manifest.xml"));
        assert_eq!(root, PathBuf::from("/custom/root"));
    }

    #[test]
    fn unset_env_yields_relative_defaults() {
        let (manifest, root) = SyncConfig::paths_from(None, None, None);
        assert_eq!(manifest, PathBuf::from(".repo/manifests/default.xml"));
        assert_eq!(root, PathBuf::from(""));
    }

    #[test]
    fn validate_rejects_missing_manifest() {
        let dir = tempdir().unwrap();
        let config = base_config(dir.path().join("absent.xml"), dir.path().to_path_buf());
        assert!(matches!(
            config.validate(),
            Err(SyncError::ManifestMissing(_))
        ));
    }

    #[test]
    fn validate_rejects_missing_root_dir() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("default.xml");
        fs::write(&manifest, "<manifest/>").unwrap();
        let config = base_config(manifest, dir.path().join("no-such-root"));
        assert!(matches!(
            config.validate(),
            Err(SyncError::RootDirMissing(_))
        ));
    }

    #[test]
    fn validate_rejects_missing_fixer() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("default.xml");
        fs::write(&manifest, "<manifest/>").unwrap();
        let mut config = base_config(manifest, dir.path().to_path_buf());
        config.merge_fixer = Some(dir.path().join("fixer.sh"));
        assert!(matches!(config.validate(), Err(SyncError::FixerMissing(_))));
    }

    #[test]
    fn validate_accepts_existing_paths() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("default.xml");
        fs::write(&manifest, "<manifest/>").unwrap();
        let fixer = dir.path().join("fixer.sh");
        fs::write(&fixer, "#!/bin/sh\nexit 0\n").unwrap();
        let mut config = base_config(manifest, dir.path().to_path_buf());
        config.merge_fixer = Some(fixer);
        assert!(config.validate().is_ok());
    }
}
