//! Configuration loading.
//!
//! Sources, later ones overriding earlier ones:
//!  1. `/etc/estimate-bot/service.yaml`
//!  2. `./config/service.yaml`
//!  3. The file named by `ESTIMATE_BOT_CONFIG_FILE` (must exist when set)
//!  4. `ESTIMATE_BOT__<SECTION>__<KEY>` environment variables
//!  5. The short variables `PORT`, `WEBHOOK_SECRET`, `APP_ID`,
//!     `PRIVATE_KEY_PATH` and `PRIVATE_KEY`

use estimate_bot_api::ServiceConfig;
use tracing::info;

/// Environment variable naming an explicit config file
pub const CONFIG_FILE_ENV: &str = "ESTIMATE_BOT_CONFIG_FILE";

/// Prefix for structured environment overrides
pub const ENV_PREFIX: &str = "ESTIMATE_BOT";

/// Files probed in order; missing files are skipped.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["/etc/estimate-bot/service", "config/service"];

/// Short environment variables and the config keys they set.
pub const SHORT_ENV_VARS: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("WEBHOOK_SECRET", "webhooks.secret"),
    ("APP_ID", "github.app_id"),
    ("PRIVATE_KEY_PATH", "github.private_key_path"),
    ("PRIVATE_KEY", "github.private_key"),
];

/// Load the service configuration from the default locations.
pub fn load() -> Result<ServiceConfig, config::ConfigError> {
    load_from(DEFAULT_CONFIG_FILES)
}

/// Load the service configuration, probing `files` before the environment.
///
/// # Errors
///
/// Fails when the explicit config file is missing, a file is malformed, or a
/// value cannot be coerced to its field type.
pub fn load_from(files: &[&str]) -> Result<ServiceConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    for file in files {
        builder = builder.add_source(
            config::File::with_name(file)
                .required(false)
                .format(config::FileFormat::Yaml),
        );
    }

    if let Some(explicit_path) = non_empty_env(CONFIG_FILE_ENV) {
        info!(path = %explicit_path, "Loading configuration from explicit path");
        builder = builder.add_source(
            config::File::with_name(&explicit_path)
                .required(true)
                .format(config::FileFormat::Yaml),
        );
    }

    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

    for (variable, key) in SHORT_ENV_VARS {
        builder = builder.set_override_option(*key, non_empty_env(variable))?;
    }

    builder.build()?.try_deserialize()
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
