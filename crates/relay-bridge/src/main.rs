//! Relay entry point
//!
//! Run with:
//! ```bash
//! DISCORD_TOKEN=... cargo run -p relay-bridge
//! ```
//!
//! Configuration is loaded from `config/config.json` (or `RELAY_CONFIG`)
//! and environment variables.

use relay_common::{try_init_tracing_with_config, AppConfig, AppError, Environment, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing before the config is parsed so config errors are logged
    let tracing_config =
        TracingConfig::for_environment(Environment::from_env()).with_log_dir_from_env();
    let log_guard = match try_init_tracing_with_config(tracing_config.clone()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize tracing: {e}");
            // Fall back to console output only
            try_init_tracing_with_config(tracing_config.with_log_dir(None)).ok()
        }
    };

    let result = run().await;
    if let Err(e) = &result {
        error!(error = %e, "Relay failed");
    }

    // exit() skips destructors; flush the log files first
    drop(log_guard);
    if let Err(e) = result {
        std::process::exit(e.exit_code());
    }
}

async fn run() -> Result<(), AppError> {
    info!("Starting world relay...");

    let config = AppConfig::load().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        world = %config.world.name,
        address = %config.world.address(),
        channels = config.relay.channels.len(),
        health_port = config.health.port,
        "Configuration loaded"
    );

    relay_bridge::run(config).await
}
