use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct User {
    pub login: String,
}

#[derive(Deserialize, Debug)]
pub struct Repo {
    pub name: String,
    pub owner: RepoOwner,
    pub fork: bool,
    #[serde(default)]
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug)]
pub struct RepoOwner {
    pub login: String,
}

impl From<Repo> for streak::api::Repo {
    fn from(repo: Repo) -> Self {
        streak::api::Repo::new(repo.name, repo.owner.login, repo.fork, repo.size, repo.created_at)
    }
}

#[derive(Deserialize, Debug)]
pub struct Commit {
    pub commit: CommitDetail,
}

#[derive(Deserialize, Debug)]
pub struct CommitDetail {
    pub author: Option<GitSignature>,
}

#[derive(Deserialize, Debug)]
pub struct GitSignature {
    pub date: DateTime<Utc>,
}

impl Commit {
    pub fn into_api(self) -> Option<streak::api::Commit> {
        self.commit.author.map(|author| streak::api::Commit::new(author.date))
    }
}

#[derive(Deserialize, Debug)]
pub struct Release {
    pub created_at: DateTime<Utc>,
}

impl From<Release> for streak::api::Release {
    fn from(release: Release) -> Self {
        streak::api::Release::new(release.created_at)
    }
}

#[derive(Deserialize, Debug)]
pub struct SearchIssues {
    pub items: Vec<Issue>,
}

#[derive(Deserialize, Debug)]
pub struct Issue {
    pub created_at: DateTime<Utc>,
    /// Present only on pull requests.
    pub pull_request: Option<serde::de::IgnoredAny>,
}

impl From<Issue> for streak::api::Issue {
    fn from(issue: Issue) -> Self {
        streak::api::Issue::new(issue.created_at, issue.pull_request.is_some())
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}
