use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use gh_streak_app::{track_streaks, AppError, Args, Format, KindCount};
use serde_json::{json, Value};
use streak::{ActivityKind, StreakResult};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "secret";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

fn args(server: &MockServer, token: Option<&str>, username: Option<&str>) -> Args {
    Args {
        token: token.map(|token| secrecy::SecretString::new(token.to_string())),
        username: username.map(str::to_string),
        days: 30,
        api_url: server.uri(),
        format: Format::Text,
    }
}

fn repo(name: &str, fork: bool, size: u64, created_at: &str) -> Value {
    json!({
        "name": name,
        "owner": { "login": "alice" },
        "fork": fork,
        "size": size,
        "created_at": created_at
    })
}

fn commit(date: &str) -> Value {
    json!({ "commit": { "author": { "name": "alice", "date": date } } })
}

async fn mock_json(server: &MockServer, url_path: &str, status: u16, body: Value) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .and(header("Accept", "application/vnd.github.v3+json"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

async fn mock_search(server: &MockServer, kind: &str, items: Value) {
    Mock::given(method("GET"))
        .and(path("/search/issues"))
        .and(query_param(
            "q",
            format!("author:alice type:{} created:>=2024-02-14", kind),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 1,
            "incomplete_results": false,
            "items": items
        })))
        .mount(server)
        .await;
}

async fn mock_activity(server: &MockServer) {
    mock_json(server, "/user", 200, json!({ "login": "alice" })).await;
    mock_json(
        server,
        "/users/alice/repos",
        200,
        json!([
            repo("tool", false, 120, "2023-01-01T00:00:00Z"),
            repo("empty", false, 5, "2024-02-20T09:00:00Z"),
            repo("upstream", true, 300, "2024-03-02T09:00:00Z"),
            repo("fresh", false, 0, "2024-03-10T09:00:00Z")
        ]),
    )
    .await;
    mock_json(
        server,
        "/repos/alice/tool/commits",
        200,
        json!([
            commit("2024-03-15T08:00:00Z"),
            commit("2024-03-14T22:00:00Z"),
            commit("2024-03-13T10:00:00Z"),
            commit("2024-03-13T11:00:00Z"),
            commit("2024-03-01T11:00:00Z")
        ]),
    )
    .await;
    mock_json(
        server,
        "/repos/alice/empty/commits",
        409,
        json!({ "message": "Git Repository is empty." }),
    )
    .await;
    mock_json(
        server,
        "/repos/alice/tool/releases",
        200,
        json!([
            { "tag_name": "v1.0.0", "created_at": "2024-03-01T12:00:00Z" },
            { "tag_name": "v0.1.0", "created_at": "2023-06-01T12:00:00Z" }
        ]),
    )
    .await;
    mock_json(server, "/repos/alice/empty/releases", 404, json!({ "message": "Not Found" })).await;
    mock_search(
        server,
        "issue",
        json!([
            { "created_at": "2024-03-05T10:00:00Z" },
            { "created_at": "2024-03-06T10:00:00Z", "pull_request": { "url": "https://example.com/pr/1" } }
        ]),
    )
    .await;
    mock_search(
        server,
        "pr",
        json!([{ "created_at": "2024-03-05T16:00:00Z", "pull_request": { "url": "https://example.com/pr/2" } }]),
    )
    .await;
}

#[tokio::test]
async fn happy_path() {
    let server = MockServer::start().await;
    mock_activity(&server).await;

    let report = track_streaks(args(&server, Some(TOKEN), None), now()).await.unwrap();

    assert_eq!(report.user, "alice");
    assert_eq!(report.today, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
    assert_eq!(report.streak, StreakResult::new(3, 1, None));
    assert_eq!(report.active_days, 7);
    assert_eq!(
        report.breakdown,
        vec![
            KindCount::new(ActivityKind::Commit, 5),
            KindCount::new(ActivityKind::RepoCreated, 2),
            KindCount::new(ActivityKind::IssueCreated, 1),
            KindCount::new(ActivityKind::PullRequestCreated, 1),
            KindCount::new(ActivityKind::ReleaseCreated, 1),
        ]
    );
    assert!(report.categories.iter().all(|category| category.failure.is_none()));
    assert!(report.categories.iter().all(|category| category.warnings.is_empty()));

    let commits = &report.categories[0];
    assert_eq!(commits.kind, ActivityKind::Commit);
    assert_eq!((commits.repos_processed, commits.repos_skipped), (1, 3));

    let text = report.to_string();
    assert!(text.contains("3 days and counting!"));
    assert!(text.contains("Today (2024-03-15): commit"));
}

#[tokio::test]
async fn explicit_username_skips_authentication() {
    let server = MockServer::start().await;
    mock_activity(&server).await;

    let report = track_streaks(args(&server, Some(TOKEN), Some("alice")), now())
        .await
        .unwrap();
    assert_eq!(report.user, "alice");

    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|request| request.url.path() != "/user"));
}

#[tokio::test]
async fn missing_token_fails_before_any_request() {
    let server = MockServer::start().await;
    mock_activity(&server).await;

    let result = track_streaks(args(&server, None, Some("alice")), now()).await;
    assert!(matches!(result, Err(AppError::MissingToken)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn repository_listing_failure_keeps_search_results() {
    let server = MockServer::start().await;
    mock_json(&server, "/users/alice/repos", 500, json!({ "message": "Server Error" })).await;
    mock_search(&server, "issue", json!([{ "created_at": "2024-03-14T10:00:00Z" }])).await;
    mock_search(
        &server,
        "pr",
        json!([{ "created_at": "2024-03-15T10:00:00Z", "pull_request": {} }]),
    )
    .await;

    let report = track_streaks(args(&server, Some(TOKEN), Some("alice")), now())
        .await
        .unwrap();

    assert_eq!(report.streak, StreakResult::new(2, 0, None));
    let failed = report
        .categories
        .iter()
        .filter(|category| category.failure.is_some())
        .map(|category| category.kind)
        .collect::<Vec<_>>();
    assert_eq!(
        failed,
        vec![ActivityKind::Commit, ActivityKind::RepoCreated, ActivityKind::ReleaseCreated]
    );
    assert!(report.to_string().contains("Error fetching commits"));
}

#[tokio::test]
async fn json_report() {
    let server = MockServer::start().await;
    mock_activity(&server).await;

    let report = track_streaks(args(&server, Some(TOKEN), None), now()).await.unwrap();
    let rendered = gh_streak_app::render(&report, Format::Json).unwrap();
    let value: Value = serde_json::from_str(&rendered).unwrap();

    assert_eq!(value["streak"]["current_streak"], 3);
    assert_eq!(value["streak"]["days_since_last_activity"], Value::Null);
    assert_eq!(value["today"], "2024-03-15");
    assert_eq!(value["breakdown"][0]["kind"], "commit");
}
