//! Resolves a change's (remote, repository) identity to an on-disk checkout
//! path via the repo manifest.
//!
//! The manifest is an XML document whose top-level `<project remote=... path=...>`
//! elements enumerate every sub-repository in the workspace. Lookups are
//! cached for the lifetime of the resolver (one run); a cache miss re-reads
//! the document.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use console::style;

use crate::errors::SyncError;

pub struct ManifestResolver {
    manifest_path: PathBuf,
    root_dir: PathBuf,
    cache: HashMap<(String, String), Option<PathBuf>>,
}

impl ManifestResolver {
    pub fn new(manifest_path: PathBuf, root_dir: PathBuf) -> Self {
        Self {
            manifest_path,
            root_dir,
            cache: HashMap::new(),
        }
    }

    /// Resolve a remote/repository pair to `root_dir/<manifest path>`.
    ///
    /// A record matches when its `remote` attribute equals `remote` and the
    /// final segment of its `path` attribute equals `repository`. The first
    /// match in document order wins and is cached for the rest of the run;
    /// further matches only trigger an ambiguity warning. `Ok(None)` means no
    /// record matched (the caller skips that change); a missing or malformed
    /// manifest is a hard error.
    pub fn resolve(
        &mut self,
        remote: &str,
        repository: &str,
    ) -> Result<Option<PathBuf>, SyncError> {
        let key = (remote.to_string(), repository.to_string());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }

        let text = fs::read_to_string(&self.manifest_path).map_err(|source| {
            SyncError::ManifestRead {
                path: self.manifest_path.clone(),
                source,
            }
        })?;
        let doc = roxmltree::Document::parse(&text).map_err(|source| SyncError::ManifestParse {
            path: self.manifest_path.clone(),
            source,
        })?;

        let mut found: Option<PathBuf> = None;
        for project in doc
            .root_element()
            .children()
            .filter(|node| node.has_tag_name("project"))
        {
            let (Some(record_remote), Some(record_path)) =
                (project.attribute("remote"), project.attribute("path"))
            else {
                continue;
            };
            if record_remote != remote || record_path.rsplit('/').next() != Some(repository) {
                continue;
            }
            if found.is_some() {
                eprintln!(
                    "{} manifest has multiple projects matching {remote}/{repository}; \
                     keeping the first and ignoring path {record_path}",
                    style("Warning:").yellow()
                );
            } else {
                found = Some(self.root_dir.join(record_path));
            }
        }

        self.cache.insert(key, found.clone());
        Ok(found)
    }
}
