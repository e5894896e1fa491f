//! # Estimate Bot Service
//!
//! Binary entry point for the issue estimate reminder bot.
//!
//! This executable:
//! - Loads `.env`, configuration files and environment overrides
//! - Initializes structured logging
//! - Wires the GitHub App client into the webhook pipeline
//! - Starts the HTTP server from estimate-bot-api
//!
//! Exit codes: 1 when the listener cannot bind, 2 when the server fails,
//! 3 for configuration errors.

mod settings;
mod wiring;

use estimate_bot_api::{start_server, LoggingConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "estimate_bot_service={level},estimate_bot_api={level},\
    estimate_bot_core={level},estimate_bot_github={level},tower_http=debug";

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();

    let loaded = settings::load();
    init_logging(loaded.as_ref().map(|c| &c.logging).ok());

    if let Ok(path) = &dotenv {
        info!(path = %path.display(), "Loaded environment from .env");
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Starting estimate bot");

    let service_config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration; aborting");
            std::process::exit(3);
        }
    };

    if let Err(e) = service_config.validate() {
        error!(error = %e, "Service configuration is invalid; aborting");
        std::process::exit(3);
    }

    let pipeline = match wiring::build_pipeline(&service_config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            error!(error = %e, "Failed to build webhook pipeline; aborting");
            std::process::exit(3);
        }
    };

    if let Err(e) = start_server(service_config, pipeline).await {
        error!(error = %e, "HTTP server stopped with an error");
        std::process::exit(e.exit_code());
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `logging.level`.
fn init_logging(logging: Option<&LoggingConfig>) {
    let level = logging.map(|l| l.level.as_str()).unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_FILTER.replace("{level}", level).into());

    let json = logging.is_some_and(|l| l.json_format);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
