// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use cdn_move::{
    config::{load_env_file, Config, ENVIRONMENT_VAR},
    core::request::{FailureKind, MoveRequest, MoveResult},
    error::Error,
    Mover,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "cdn-move",
    about = "Move an object from a cache-fronted bucket to another bucket"
)]
struct Cli {
    /// JSON file holding the request, e.g. `{"key": "photos/shark.jpg"}`
    #[arg(long, default_value = "./request.json")]
    request: PathBuf,

    /// JSON file the result is written to
    #[arg(long, default_value = "./response.json")]
    response: PathBuf,

    /// Variables file read before the configuration, outside production
    #[arg(long, default_value = "./.env")]
    env_file: PathBuf,
}

async fn read_request(path: &Path) -> Result<MoveRequest, Error> {
    let raw = tokio::fs::read_to_string(path).await?;
    info!("Request: {}", raw);

    serde_json::from_str(&raw).map_err(|err| Error::InvalidRequest(err.to_string()))
}

async fn run(cli: &Cli) -> MoveResult {
    let request = match read_request(&cli.request).await {
        Ok(request) => request,
        Err(err) => return MoveResult::failed(FailureKind::InvalidRequest, &err),
    };

    let environment = std::env::var(ENVIRONMENT_VAR).ok();
    if let Err(err) = load_env_file(&cli.env_file, environment.as_deref()) {
        return MoveResult::failed(FailureKind::Configuration, &err);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => return MoveResult::failed(FailureKind::Configuration, &err),
    };

    Mover::from_config(&config)
        .await
        .move_object(&request)
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::from_default_env().add_directive("cdn_move=info".parse()?);
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result = run(&cli).await;

    let data = serde_json::to_string_pretty(&result)?;
    info!("Response: {}", data);
    tokio::fs::write(&cli.response, data).await?;

    info!("Task complete.");

    Ok(())
}
