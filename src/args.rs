use clap::Parser;
use github_client::GITHUB_URL;
use secrecy::SecretString;
use std::{fmt::Display, str::FromStr};
use streak::LookbackWindow;
use strum_macros::EnumString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// GitHub personal access token
    #[clap(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<SecretString>,

    /// GitHub username. Defaults to the owner of the token
    #[clap(short, long, env = "GITHUB_USERNAME", parse(try_from_str=non_empty))]
    pub username: Option<String>,

    /// Number of days to look back
    #[clap(short, long, env = "GITHUB_STREAK_DAYS", default_value_t = LookbackWindow::DEFAULT_DAYS, parse(try_from_str=days_in_range))]
    pub days: u32,

    /// Repository API URL
    #[clap(long, env = "GITHUB_API_URL", default_value = GITHUB_URL)]
    pub api_url: String,

    /// Report format: text or json
    #[clap(short, long, default_value = "text")]
    pub format: Format,
}

fn non_empty(value: &str) -> clap::Result<String, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("username must not be empty.".to_string());
    }
    Ok(value.to_string())
}

fn days_in_range(value: &str) -> clap::Result<u32, String> {
    number_in_range(value, 1, 3650, "days".to_string())
}

fn number_in_range<T>(value: &str, min: T, max: T, name: String) -> clap::Result<T, String>
where
    T: FromStr + PartialOrd + Display,
    <T as FromStr>::Err: Display,
{
    value.parse::<T>().map_err(|err| format!("{}", err)).and_then(|value| {
        if value < min || value > max {
            return Err(format!("{} is not in range {} .. {}.", name, min, max));
        }
        Ok(value)
    })
}

#[test]
fn days_in_range_test() {
    assert_eq!(days_in_range("30"), Ok(30));
    assert!(days_in_range("0").is_err());
    assert!(days_in_range("3651").is_err());
    assert!(days_in_range("week").is_err());
}

#[test]
fn parse_args_test() {
    let args = Args::try_parse_from(["gh_streak", "--token", "abc", "-u", "alice", "-d", "30", "-f", "json"]).unwrap();
    assert_eq!(args.username.as_deref(), Some("alice"));
    assert_eq!(args.days, 30);
    assert_eq!(args.format, Format::Json);
    assert!(args.token.is_some());
}

#[test]
fn defaults_test() {
    let args = Args::try_parse_from(["gh_streak"]).unwrap();
    if std::env::var_os("GITHUB_STREAK_DAYS").is_none() {
        assert_eq!(args.days, LookbackWindow::DEFAULT_DAYS);
    }
    if std::env::var_os("GITHUB_API_URL").is_none() {
        assert_eq!(args.api_url, GITHUB_URL);
    }
    assert_eq!(args.format, Format::Text);
}

#[test]
fn empty_username_test() {
    assert!(Args::try_parse_from(["gh_streak", "--username", " "]).is_err());
}
