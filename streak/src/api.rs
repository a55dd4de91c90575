use std::fmt::Display;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use derive_more::Constructor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Repository is empty: {0}")]
    EmptyRepository(String),
    #[error("Unexpected status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Missing or empty repositories are expected while scanning and are skipped without a warning.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::EmptyRepository(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct Repo {
    pub name: String,
    pub owner: String,
    pub fork: bool,
    /// Size in kilobytes as reported by the API. Zero for repositories without any pushed content.
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

impl Repo {
    /// Forks and empty repositories are not scanned for commits and releases.
    pub fn is_scannable(&self) -> bool {
        !self.fork && self.size > 0
    }
}

#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct Commit {
    pub authored_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct Release {
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct Issue {
    pub created_at: DateTime<Utc>,
    pub pull_request: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Issue,
    PullRequest,
}

/// Issue search restricted to one author and a creation date lower bound.
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct SearchQuery {
    pub author: String,
    pub kind: IssueKind,
    pub created_since: NaiveDate,
}

impl Display for SearchQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            IssueKind::Issue => "issue",
            IssueKind::PullRequest => "pr",
        };
        write!(
            f,
            "author:{} type:{} created:>={}",
            self.author,
            kind,
            self.created_since.format("%Y-%m-%d")
        )
    }
}

#[async_trait]
pub trait Client: Send + Sync {
    /// Login of the user owning the credentials.
    async fn authenticated_user(&self) -> Result<String>;

    /// All repositories owned by `user`.
    async fn user_repos(&self, user: &str) -> Result<Vec<Repo>>;

    async fn repo_commits(
        &self,
        repo: &Repo,
        author: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Commit>>;

    async fn repo_releases(&self, repo: &Repo) -> Result<Vec<Release>>;

    async fn search_issues(&self, query: &SearchQuery) -> Result<Vec<Issue>>;
}

#[test]
fn search_query_format_test() {
    let since = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
    let query = SearchQuery::new("alice".to_string(), IssueKind::PullRequest, since);
    assert_eq!(query.to_string(), "author:alice type:pr created:>=2024-01-05");
}

#[test]
fn repo_scannable_test() {
    let created_at = Utc::now();
    assert!(Repo::new("a".into(), "o".into(), false, 10, created_at).is_scannable());
    assert!(!Repo::new("a".into(), "o".into(), true, 10, created_at).is_scannable());
    assert!(!Repo::new("a".into(), "o".into(), false, 0, created_at).is_scannable());
}

#[test]
fn skippable_error_test() {
    assert!(Error::NotFound("gone".into()).is_skippable());
    assert!(Error::EmptyRepository("Git Repository is empty.".into()).is_skippable());
    assert!(!Error::Status {
        status: 500,
        message: "boom".into()
    }
    .is_skippable());
}
