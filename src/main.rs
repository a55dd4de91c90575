use chrono::Utc;
use clap::Parser;
use gh_streak_app::{AppError, Args};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();
    let args = Args::parse();
    let format = args.format;

    let output = gh_streak_app::track_streaks(args, Utc::now())
        .await
        .and_then(|report| gh_streak_app::render(&report, format));

    match output {
        Ok(output) => println!("{}", output.trim_end()),
        Err(err @ AppError::MissingToken) => {
            eprintln!("Error: {}", err);
            eprintln!();
            eprintln!("To get started:");
            eprintln!("1. Create a GitHub personal access token at https://github.com/settings/tokens");
            eprintln!("2. Export it: export GITHUB_TOKEN=your_token_here");
            eprintln!("3. Or pass it directly: gh_streak --token your_token_here");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("Unexpected error: {}", err);
            std::process::exit(1);
        }
    }
}
