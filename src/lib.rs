pub mod commands;
pub mod config;
pub mod db;
pub mod models;
pub mod progression;
pub mod store;

#[cfg(test)]
pub mod test_utils;

pub use models::{
  ExercisePerformance, ProgressionAction, ProgressionConfiguration, ProgressionResult,
  ProgressionState, TemplateContext,
};
pub use progression::calculate_progression;

use commands::progression::{parse_session_request, record_session};
use config::AppConfig;
use db::AppState;
use tracing_subscriber::EnvFilter;

/// Record one session read as JSON from stdin and print the result as JSON
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = AppConfig::from_env()?;

  // stdout carries the result; logs go to stderr
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let input = std::io::read_to_string(std::io::stdin())?;
  let request = parse_session_request(&input)?;

  let runtime = tokio::runtime::Runtime::new()?;
  let result = runtime.block_on(async {
    let pool = db::initialize_db(&config).await?;
    let state = AppState { db: pool };
    let result = record_session(&state, request).await;
    state.db.close().await;
    result.map_err(|e| -> Box<dyn std::error::Error> { Box::new(e) })
  })?;

  println!("{}", serde_json::to_string_pretty(&result)?);
  Ok(())
}
