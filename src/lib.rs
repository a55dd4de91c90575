mod args;
mod report;

use chrono::{DateTime, Utc};
use github_client::GithubClientBuilder;
use log::info;
use streak::api::Client;
use streak::collector::ActivityCollector;
use streak::{calculate_streaks, LookbackWindow};
use thiserror::Error;

pub use args::{Args, Format};
pub use report::{KindCount, RecentDay, StreakReport};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("GitHub token is required. Set GITHUB_TOKEN environment variable or pass it with --token.")]
    MissingToken,
    #[error(transparent)]
    Api(#[from] streak::api::Error),
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Collects activity of the configured user and computes its streaks as of `now`.
pub async fn track_streaks(args: Args, now: DateTime<Utc>) -> Result<StreakReport> {
    let token = args.token.ok_or(AppError::MissingToken)?;
    let client = GithubClientBuilder::default()
        .try_with_github_url(&args.api_url)?
        .try_with_token(token)?
        .build()?;

    let user = match args.username {
        Some(user) => user,
        None => client.authenticated_user().await?,
    };
    info!("Tracking streaks of {}", user);

    let window = LookbackWindow::new(now, args.days);
    let collection = ActivityCollector::new(client).collect(&user, &window).await;
    let streak = calculate_streaks(collection.ledger.dates(), window.end_date());

    Ok(StreakReport::new(user, &window, collection, streak))
}

pub fn render(report: &StreakReport, format: Format) -> Result<String> {
    match format {
        Format::Text => Ok(report.to_string()),
        Format::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}
