mod builder;
mod payload;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use reqwest::Client;
use reqwest::Response;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use streak::api::{Commit, Error, Issue, Release, Repo, Result, SearchQuery};

pub use builder::{GithubClientBuilder, GITHUB_URL};

const MAX_PAGE: u32 = 100;
const FIRST_PAGE_NUMBER: u32 = 1;
/// Search API serves at most 1000 results.
const MAX_SEARCH_PAGES: u32 = 10;

pub struct GithubClient {
    client: Client,
    github_url: String,
}

impl GithubClient {
    /// Follows pages until one comes back shorter than `MAX_PAGE` or `max_pages` have been read.
    async fn get_all<T, P, F>(
        &self,
        path: &str,
        query: &[(&str, String)],
        max_pages: Option<u32>,
        items: F,
    ) -> Result<Vec<T>>
    where
        P: DeserializeOwned,
        F: Fn(P) -> Vec<T>,
    {
        let request_url = format!("{}{}", self.github_url, path);
        let mut all = Vec::new();
        let mut page = FIRST_PAGE_NUMBER;
        loop {
            debug!("GET {} page {}", path, page);
            let response = self
                .client
                .get(&request_url)
                .query(query)
                .query(&[("per_page", MAX_PAGE), ("page", page)])
                .send()
                .await?;
            let page_items = items(read_response::<P>(response).await?);
            let last = (page_items.len() as u32) < MAX_PAGE;
            all.extend(page_items);
            if last || max_pages.map_or(false, |max| page >= max) {
                return Ok(all);
            }
            page += 1;
        }
    }
}

pub(crate) async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let message = response
        .json::<payload::ErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_default();
    Err(match status {
        StatusCode::NOT_FOUND => Error::NotFound(message),
        StatusCode::CONFLICT => Error::EmptyRepository(message),
        status => Error::Status {
            status: status.as_u16(),
            message,
        },
    })
}

fn timestamp(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl streak::api::Client for GithubClient {
    async fn authenticated_user(&self) -> Result<String> {
        let response = self.client.get(format!("{}/user", self.github_url)).send().await?;
        let user = read_response::<payload::User>(response).await?;
        Ok(user.login)
    }

    async fn user_repos(&self, user: &str) -> Result<Vec<Repo>> {
        let path = format!("/users/{}/repos", user);
        let repos = self
            .get_all(&path, &[("type", "owner".to_string())], None, |page: Vec<payload::Repo>| page)
            .await?;
        Ok(repos.into_iter().map(Repo::from).collect())
    }

    async fn repo_commits(
        &self,
        repo: &Repo,
        author: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Commit>> {
        let path = format!("/repos/{}/{}/commits", repo.owner, repo.name);
        let query = [
            ("author", author.to_string()),
            ("since", timestamp(since)),
            ("until", timestamp(until)),
        ];
        let commits = self
            .get_all(&path, &query, None, |page: Vec<payload::Commit>| page)
            .await?;
        Ok(commits.into_iter().filter_map(payload::Commit::into_api).collect())
    }

    async fn repo_releases(&self, repo: &Repo) -> Result<Vec<Release>> {
        let path = format!("/repos/{}/{}/releases", repo.owner, repo.name);
        let releases = self
            .get_all(&path, &[], None, |page: Vec<payload::Release>| page)
            .await?;
        Ok(releases.into_iter().map(Release::from).collect())
    }

    async fn search_issues(&self, query: &SearchQuery) -> Result<Vec<Issue>> {
        let issues = self
            .get_all(
                "/search/issues",
                &[("q", query.to_string())],
                Some(MAX_SEARCH_PAGES),
                |page: payload::SearchIssues| page.items,
            )
            .await?;
        Ok(issues.into_iter().map(Issue::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::GithubClientBuilder;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;
    use streak::api::{Client, Error, IssueKind, Repo, SearchQuery};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> crate::GithubClient {
        GithubClientBuilder::default()
            .try_with_github_url(server.uri())
            .unwrap()
            .try_with_token(secrecy::SecretString::new("secret".to_string()))
            .unwrap()
            .build()
            .unwrap()
    }

    fn repo(name: &str) -> Repo {
        Repo::new(
            name.to_string(),
            "alice".to_string(),
            false,
            1,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn repo_json(index: u32) -> serde_json::Value {
        json!({
            "name": format!("repo_{}", index),
            "owner": { "login": "alice" },
            "fork": index % 2 == 1,
            "size": index,
            "created_at": "2024-01-02T03:04:05Z"
        })
    }

    #[tokio::test]
    async fn authenticated_user_test() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("Authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "login": "alice" })))
            .mount(&server)
            .await;

        assert_eq!(client(&server).authenticated_user().await.unwrap(), "alice");
    }

    #[tokio::test]
    async fn user_repos_pagination_test() {
        let server = MockServer::start().await;
        let first = (0..100).map(repo_json).collect::<Vec<_>>();
        let second = (100..103).map(repo_json).collect::<Vec<_>>();
        Mock::given(method("GET"))
            .and(path("/users/alice/repos"))
            .and(query_param("type", "owner"))
            .and(query_param("per_page", "100"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(first))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/alice/repos"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(second))
            .mount(&server)
            .await;

        let repos = client(&server).user_repos("alice").await.unwrap();
        assert_eq!(repos.len(), 103);
        assert_eq!(repos[102].name, "repo_102");
        assert!(repos[1].fork);
        assert_eq!(repos[0].size, 0);
        assert_eq!(repos[0].created_at, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    }

    #[tokio::test]
    async fn commits_query_and_offset_test() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/tool/commits"))
            .and(query_param("author", "alice"))
            .and(query_param("since", "2024-01-01T00:00:00Z"))
            .and(query_param("until", "2024-02-01T00:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "commit": { "author": { "date": "2024-01-10T23:30:00-05:00" } } },
                { "commit": { "author": null } }
            ])))
            .mount(&server)
            .await;

        let commits = client(&server)
            .repo_commits(
                &repo("tool"),
                "alice",
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(
            commits[0].authored_at.date_naive(),
            NaiveDate::from_ymd_opt(2024, 1, 11).unwrap()
        );
    }

    #[tokio::test]
    async fn empty_repository_is_typed_test() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/empty/commits"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "message": "Git Repository is empty." })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/empty/releases"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/broken/releases"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client(&server);
        let now = Utc::now();
        match client.repo_commits(&repo("empty"), "alice", now, now).await {
            Err(Error::EmptyRepository(message)) => assert_eq!(message, "Git Repository is empty."),
            other => panic!("Unexpected result: {:?}", other),
        }
        assert!(matches!(
            client.repo_releases(&repo("empty")).await,
            Err(Error::NotFound(_))
        ));
        match client.repo_releases(&repo("broken")).await {
            Err(err @ Error::Status { status: 500, .. }) => assert!(!err.is_skippable()),
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn search_issues_test() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param("q", "author:alice type:pr created:>=2024-01-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 2,
                "incomplete_results": false,
                "items": [
                    { "created_at": "2024-01-03T10:00:00Z", "pull_request": { "url": "https://example.com" } },
                    { "created_at": "2024-01-04T10:00:00Z" }
                ]
            })))
            .mount(&server)
            .await;

        let query = SearchQuery::new(
            "alice".to_string(),
            IssueKind::PullRequest,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let issues = client(&server).search_issues(&query).await.unwrap();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].pull_request);
        assert!(!issues[1].pull_request);
    }

    #[tokio::test]
    async fn search_issues_stops_at_result_cap_test() {
        let server = MockServer::start().await;
        let items = (0..100)
            .map(|_| json!({ "created_at": "2024-01-03T10:00:00Z" }))
            .collect::<Vec<_>>();
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 5000,
                "incomplete_results": false,
                "items": items
            })))
            .mount(&server)
            .await;

        let query = SearchQuery::new(
            "alice".to_string(),
            IssueKind::Issue,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        let issues = client(&server).search_issues(&query).await.unwrap();
        assert_eq!(issues.len(), 1000);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 10);
        let pages = requests
            .iter()
            .filter_map(|request| {
                request
                    .url
                    .query_pairs()
                    .find(|(key, _)| key == "page")
                    .map(|(_, page)| page.to_string())
            })
            .collect::<Vec<_>>();
        assert_eq!(pages, (1..=10).map(|page| page.to_string()).collect::<Vec<_>>());
    }
}
