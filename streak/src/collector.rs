use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::api::{Client, IssueKind, Repo, Result, SearchQuery};
use crate::ledger::{ActivityKind, ActivityLedger, ActivityLedgerBuilder, LookbackWindow};

/// Outcome of collecting one activity kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub kind: ActivityKind,
    /// Entries that made it into the ledger.
    pub recorded: usize,
    pub repos_processed: usize,
    pub repos_skipped: usize,
    /// Unexpected per repository failures. The repository was skipped.
    pub warnings: Vec<String>,
    /// Set when the whole category could not be fetched.
    pub failure: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Collection {
    pub ledger: ActivityLedger,
    pub summaries: Vec<CategorySummary>,
}

#[derive(Debug, Default)]
struct CategoryScan {
    timestamps: Vec<DateTime<Utc>>,
    repos_processed: usize,
    repos_skipped: usize,
    warnings: Vec<String>,
}

impl CategoryScan {
    fn from_timestamps(timestamps: Vec<DateTime<Utc>>) -> Self {
        CategoryScan {
            timestamps,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum RepoScan {
    Commits,
    Releases,
}

pub struct ActivityCollector<CLIENT>
where
    CLIENT: Client,
{
    client: Arc<CLIENT>,
}

impl<CLIENT> ActivityCollector<CLIENT>
where
    CLIENT: 'static + Client,
{
    pub fn new(client: CLIENT) -> Self {
        ActivityCollector {
            client: Arc::new(client),
        }
    }

    /// Builds the ledger of `user` activity inside `window`.
    ///
    /// Categories are fetched one after another. A failing category ends up empty, with the reason in its summary,
    /// and never prevents collection of the remaining ones.
    pub async fn collect(&self, user: &str, window: &LookbackWindow) -> Collection {
        info!("Fetching activity of {} for the last {} days", user, window.days());
        let mut ledger = ActivityLedger::builder(window.clone());
        let mut summaries = Vec::new();
        for kind in ActivityKind::iter() {
            let scan = self.category(kind, user, window).await;
            summaries.push(Self::record(&mut ledger, kind, scan));
        }
        Collection {
            ledger: ledger.build(),
            summaries,
        }
    }

    async fn category(&self, kind: ActivityKind, user: &str, window: &LookbackWindow) -> Result<CategoryScan> {
        debug!("Fetching {} activity", kind);
        match kind {
            ActivityKind::Commit => self.scan_repos(RepoScan::Commits, user, window).await,
            ActivityKind::RepoCreated => self.repo_creations(user).await,
            ActivityKind::IssueCreated => self.issue_creations(IssueKind::Issue, user, window).await,
            ActivityKind::PullRequestCreated => self.issue_creations(IssueKind::PullRequest, user, window).await,
            ActivityKind::ReleaseCreated => self.scan_repos(RepoScan::Releases, user, window).await,
        }
    }

    fn record(ledger: &mut ActivityLedgerBuilder, kind: ActivityKind, scan: Result<CategoryScan>) -> CategorySummary {
        match scan {
            Ok(scan) => {
                let recorded = scan
                    .timestamps
                    .into_iter()
                    .filter(|timestamp| ledger.record_timestamp(*timestamp, kind))
                    .count();
                info!(
                    "Found {} {} entries ({} repositories processed, {} skipped)",
                    recorded, kind, scan.repos_processed, scan.repos_skipped
                );
                CategorySummary {
                    kind,
                    recorded,
                    repos_processed: scan.repos_processed,
                    repos_skipped: scan.repos_skipped,
                    warnings: scan.warnings,
                    failure: None,
                }
            }
            Err(err) => {
                error!("Failed to fetch {} activity: {}", kind, err);
                CategorySummary {
                    kind,
                    recorded: 0,
                    repos_processed: 0,
                    repos_skipped: 0,
                    warnings: Vec::new(),
                    failure: Some(err.to_string()),
                }
            }
        }
    }

    async fn repo_creations(&self, user: &str) -> Result<CategoryScan> {
        let timestamps = self
            .client
            .user_repos(user)
            .await?
            .into_iter()
            .filter(|repo| !repo.fork)
            .map(|repo| repo.created_at)
            .collect();
        Ok(CategoryScan::from_timestamps(timestamps))
    }

    async fn issue_creations(&self, kind: IssueKind, user: &str, window: &LookbackWindow) -> Result<CategoryScan> {
        let query = SearchQuery::new(user.to_string(), kind, window.start_date());
        let pull_requests = kind == IssueKind::PullRequest;
        let timestamps = self
            .client
            .search_issues(&query)
            .await?
            .into_iter()
            .filter(|issue| issue.pull_request == pull_requests)
            .map(|issue| issue.created_at)
            .collect();
        Ok(CategoryScan::from_timestamps(timestamps))
    }

    /// Only a failure of the repository listing fails the category. Each repository is isolated from the others.
    async fn scan_repos(&self, scan_kind: RepoScan, user: &str, window: &LookbackWindow) -> Result<CategoryScan> {
        let repos = self.client.user_repos(user).await?;
        let mut scan = CategoryScan::default();
        for repo in repos {
            if !repo.is_scannable() {
                debug!("Skipping fork or empty repository {}", repo.name);
                scan.repos_skipped += 1;
                continue;
            }
            match self.repo_timestamps(scan_kind, &repo, user, window).await {
                Ok(timestamps) => {
                    scan.timestamps.extend(timestamps);
                    scan.repos_processed += 1;
                }
                Err(err) if err.is_skippable() => {
                    debug!("Skipping repository {}: {}", repo.name, err);
                    scan.repos_skipped += 1;
                }
                Err(err) => {
                    warn!("Could not access {}: {}", repo.name, err);
                    scan.warnings.push(format!("Could not access {}: {}", repo.name, err));
                    scan.repos_skipped += 1;
                }
            }
        }
        Ok(scan)
    }

    async fn repo_timestamps(
        &self,
        scan_kind: RepoScan,
        repo: &Repo,
        user: &str,
        window: &LookbackWindow,
    ) -> Result<Vec<DateTime<Utc>>> {
        match scan_kind {
            RepoScan::Commits => Ok(self
                .client
                .repo_commits(repo, user, window.start(), window.end())
                .await?
                .into_iter()
                .map(|commit| commit.authored_at)
                .collect()),
            RepoScan::Releases => Ok(self
                .client
                .repo_releases(repo)
                .await?
                .into_iter()
                .map(|release| release.created_at)
                .collect()),
        }
    }
}
