//! querywrap demo - Composition Root
//! Wires the SQLite adapter into the user pipelines and runs every scenario.

mod output;
mod scenarios;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use querywrap_core::application::constants::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY};
use querywrap_core::application::{QueryCache, RetryPolicy, UserQueries};
use querywrap_infra_sqlite::{
    run_migrations, seed_sample_users, DatabaseConfig, SqliteConnectionProvider,
    DEFAULT_DATABASE_URL,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "querywrap-demo")]
#[command(
    about = "Runs logged, transactional, cached and retried queries against SQLite",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// SQLite database URL (`~` is expanded)
    #[arg(long, env = "QUERYWRAP_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Attempts made by the retry stage
    #[arg(long, env = "QUERYWRAP_RETRY_ATTEMPTS", default_value_t = DEFAULT_RETRY_ATTEMPTS)]
    retry_attempts: u32,

    /// Fixed delay between retry attempts
    #[arg(
        long,
        env = "QUERYWRAP_RETRY_DELAY_MS",
        default_value_t = DEFAULT_RETRY_DELAY.as_millis() as u64
    )]
    retry_delay_ms: u64,

    /// Print result rows as JSON instead of tables
    #[arg(long)]
    json: bool,
}

fn init_logging() -> Result<()> {
    let log_format =
        std::env::var("QUERYWRAP_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("querywrap=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Logging
    init_logging()?;
    info!("querywrap demo v{} starting...", VERSION);

    // 2. Database
    let database_url = shellexpand::tilde(&cli.database_url).into_owned();
    info!(database_url = %database_url, "Initializing database...");

    let provider = Arc::new(
        SqliteConnectionProvider::new(&DatabaseConfig::new(database_url))
            .context("Invalid database URL")?,
    );
    run_migrations(&provider)
        .await
        .context("Migration failed")?;
    seed_sample_users(&provider)
        .await
        .context("Seeding sample users failed")?;

    // 3. Pipelines (DI wiring)
    let retry_policy = RetryPolicy::new(
        cli.retry_attempts,
        Duration::from_millis(cli.retry_delay_ms),
    )
    .context("Invalid retry configuration")?;
    let cache = Arc::new(QueryCache::new());
    let queries = UserQueries::new(provider, cache.clone(), retry_policy);

    // 4. Scenarios
    let printer = output::Printer::new(cli.json);
    scenarios::run_all(&queries, &printer).await?;

    info!(cached_queries = cache.len().await, "Demo complete");
    Ok(())
}
