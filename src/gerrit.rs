//! Review query client for the Gerrit `changes/` endpoint.
//!
//! Builds the search query from topic/status/branch filters, sends a GET with
//! `CURRENT_REVISION` and `DOWNLOAD_COMMANDS` output options, strips Gerrit's
//! XSSI guard prefix, and maps the JSON array into [`ChangeRecord`]s.

use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;

use crate::errors::SyncError;

/// Gerrit prefixes every JSON response with `)]}'` plus a newline so the body
/// is not valid JSON until the first five bytes are removed.
pub const MAGIC_PREFIX_LEN: usize = 5;

/// How a change's content is pulled into the local working tree. The variant
/// names map to the command keys Gerrit emits under
/// `revisions.<rev>.fetch."anonymous http".commands`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DownloadStrategy {
    Pull,
    CherryPick,
    Branch,
    Checkout,
}

impl DownloadStrategy {
    /// The key under which Gerrit stores this strategy's command.
    pub fn command_key(self) -> &'static str {
        match self {
            DownloadStrategy::Pull => "Pull",
            DownloadStrategy::CherryPick => "Cherry Pick",
            DownloadStrategy::Branch => "Branch",
            DownloadStrategy::Checkout => "Checkout",
        }
    }
}

impl std::fmt::Display for DownloadStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command_key())
    }
}

/// Review status filter accepted by the `status:` search operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReviewStatus {
    Open,
    Merged,
    Abandoned,
}

impl ReviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::Open => "open",
            ReviewStatus::Merged => "merged",
            ReviewStatus::Abandoned => "abandoned",
        }
    }
}

/// One change returned by a topic query, reduced to the fields the sync
/// pipeline needs.
#[derive(Debug, Clone)]
pub struct ChangeRecord {
    /// Remote/repository pair as reported by Gerrit, e.g. `wrs/meta-demo`.
    pub project: String,
    pub change_id: String,
    pub number: u64,
    /// Download commands keyed by strategy name ("Pull", "Cherry Pick", ...).
    pub fetch_commands: HashMap<String, String>,
}

impl ChangeRecord {
    /// Split the project identity into its remote and repository parts.
    pub fn split_project(&self) -> Result<(&str, &str), SyncError> {
        let parts: Vec<&str> = self.project.split('/').collect();
        match parts.as_slice() {
            [remote, repository] if !remote.is_empty() && !repository.is_empty() => {
                Ok((remote, repository))
            }
            _ => Err(SyncError::ProjectIdentity {
                project: self.project.clone(),
                change_id: self.change_id.clone(),
            }),
        }
    }

    /// The download command for the configured strategy, or `StrategyMissing`
    /// when the record carries no entry for it (the record is unusable).
    pub fn download_command(&self, strategy: DownloadStrategy) -> Result<&str, SyncError> {
        self.fetch_commands
            .get(strategy.command_key())
            .map(String::as_str)
            .ok_or_else(|| SyncError::StrategyMissing {
                strategy: strategy.command_key().to_string(),
                change_id: self.change_id.clone(),
            })
    }
}

// Subset of the Gerrit ChangeInfo entity we care about.
#[derive(Debug, Deserialize)]
struct GerritChange {
    project: String,
    change_id: String,
    #[serde(rename = "_number", default)]
    number: u64,
    #[serde(default)]
    revisions: HashMap<String, GerritRevision>,
}

#[derive(Debug, Deserialize)]
struct GerritRevision {
    #[serde(default)]
    fetch: HashMap<String, GerritFetch>,
}

#[derive(Debug, Deserialize)]
struct GerritFetch {
    #[serde(default)]
    commands: HashMap<String, String>,
}

/// Build a single query clause for one search field.
///
/// Zero values contribute nothing, one value contributes `field:"v"`, and
/// several contribute a parenthesized OR-group.
pub fn field_clause(field: &str, values: &[&str]) -> String {
    match values {
        [] => String::new(),
        [value] => format!("{field}:\"{value}\""),
        [first, rest @ ..] => {
            let mut clause = format!("({field}:\"{first}\"");
            for value in rest {
                clause.push_str(&format!(" OR {field}:\"{value}\""));
            }
            clause.push(')');
            clause
        }
    }
}

/// Assemble the full search query: topic, then status, then branch clauses,
/// joined by single spaces.
pub fn build_query(topic: &str, statuses: &[ReviewStatus], branches: &[String]) -> String {
    let status_values: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
    let branch_values: Vec<&str> = branches.iter().map(String::as_str).collect();
    [
        field_clause("topic", &[topic]),
        field_clause("status", &status_values),
        field_clause("branch", &branch_values),
    ]
    .into_iter()
    .filter(|clause| !clause.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Remove the fixed-length magic header from a response body.
pub fn strip_magic_prefix(body: &str) -> &str {
    body.get(MAGIC_PREFIX_LEN..).unwrap_or("")
}

/// Parse a raw response body (magic prefix included) into change records.
pub fn parse_changes(body: &str) -> Result<Vec<ChangeRecord>, SyncError> {
    let changes: Vec<GerritChange> = serde_json::from_str(strip_magic_prefix(body))?;
    Ok(changes
        .into_iter()
        .map(|change| {
            // Only the current revision is requested, so take whichever
            // revision key the server returned.
            let fetch_commands = change
                .revisions
                .into_values()
                .next()
                .and_then(|mut rev| rev.fetch.remove("anonymous http"))
                .map(|fetch| fetch.commands)
                .unwrap_or_default();
            ChangeRecord {
                project: change.project,
                change_id: change.change_id,
                number: change.number,
                fetch_commands,
            }
        })
        .collect())
}

/// HTTP client for one Gerrit server.
pub struct GerritClient {
    base_url: String,
    client: reqwest::Client,
    verbose: u8,
}

impl GerritClient {
    pub fn new(base_url: impl Into<String>, verbose: u8) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::new(),
            verbose,
        }
    }

    /// Query all changes matching the topic and optional status/branch
    /// filters, in server-returned order.
    pub async fn query_changes(
        &self,
        topic: &str,
        statuses: &[ReviewStatus],
        branches: &[String],
    ) -> Result<Vec<ChangeRecord>> {
        let url = format!("{}/changes/", self.base_url);
        let query = build_query(topic, statuses, branches);

        if self.verbose >= 1 {
            println!("Query {url}");
            println!("Query for topic {topic}");
        }
        println!("Query string {query}");

        let body = self
            .client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("o", "CURRENT_REVISION"),
                ("o", "DOWNLOAD_COMMANDS"),
            ])
            .send()
            .await
            .map_err(SyncError::Query)?
            .error_for_status()
            .map_err(SyncError::Query)?
            .text()
            .await
            .map_err(SyncError::Query)?;

        let changes = parse_changes(&body).context("Gerrit returned a malformed change list")?;

        if self.verbose >= 5 {
            println!("{changes:#?}");
        }

        Ok(changes)
    }
}
