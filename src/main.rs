//! Opsdeck Server — back-office session identity platform.
//!
//! Main entry point that wires all crates together and starts the server.

use tracing_subscriber::EnvFilter;

use opsdeck_core::config::AppConfig;
use opsdeck_core::error::AppError;
use opsdeck_database::DatabasePool;

#[tokio::main]
async fn main() {
    let env = std::env::var("OPSDECK_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging from configuration.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}

/// Connect, migrate, serve.
async fn run(config: AppConfig) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    opsdeck_database::migration::run_migrations(pool.pool()).await?;

    opsdeck_api::run_server(config, pool.into_pool()).await
}
