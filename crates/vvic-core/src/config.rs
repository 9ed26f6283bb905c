use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration from any key-value lookup.
///
/// The lookup stands in for wherever the deployment keeps its settings; the
/// process environment in production, a `HashMap` in tests.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let vvic_app_id = require("VVIC_APP_ID")?;
    let vvic_app_secret = require("VVIC_APP_SECRET")?;
    let ids_url = require("VVIC_IDS_URL")?;

    let env = parse_environment(&or_default("VVIC_ENV", "development"))?;
    let log_level = or_default("VVIC_LOG_LEVEL", "info");

    let vvic_endpoint = or_default(
        "VVIC_ENDPOINT",
        "https://api.vvic.com/api/item/detail/v1",
    );
    let vvic_lang = or_default("VVIC_LANG", "en");
    let failure_log_path = PathBuf::from(or_default("VVIC_FAILURE_LOG", "log.txt"));
    let index_queue = or_default("VVIC_INDEX_QUEUE", "goods-to-es-normal");
    let default_region = parse_as::<i32>(
        "VVIC_DEFAULT_REGION",
        &or_default("VVIC_DEFAULT_REGION", "1"),
    )?;

    let db_max_connections = parse_as::<u32>(
        "VVIC_DB_MAX_CONNECTIONS",
        &or_default("VVIC_DB_MAX_CONNECTIONS", "5"),
    )?;
    let db_min_connections = parse_as::<u32>(
        "VVIC_DB_MIN_CONNECTIONS",
        &or_default("VVIC_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs = parse_as::<u64>(
        "VVIC_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("VVIC_DB_ACQUIRE_TIMEOUT_SECS", "15"),
    )?;

    let http_timeout_secs = parse_as::<u64>(
        "VVIC_HTTP_TIMEOUT_SECS",
        &or_default("VVIC_HTTP_TIMEOUT_SECS", "30"),
    )?;
    let queue_connect_timeout_secs = parse_as::<u64>(
        "VVIC_QUEUE_CONNECT_TIMEOUT_SECS",
        &or_default("VVIC_QUEUE_CONNECT_TIMEOUT_SECS", "10"),
    )?;
    let worker_poll_interval_ms = parse_as::<u64>(
        "VVIC_WORKER_POLL_INTERVAL_MS",
        &or_default("VVIC_WORKER_POLL_INTERVAL_MS", "2000"),
    )?;
    let notify_max_retries = parse_as::<u32>(
        "VVIC_NOTIFY_MAX_RETRIES",
        &or_default("VVIC_NOTIFY_MAX_RETRIES", "3"),
    )?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        vvic_app_id,
        vvic_app_secret,
        vvic_endpoint,
        vvic_lang,
        failure_log_path,
        ids_url,
        index_queue,
        default_region,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        queue_connect_timeout_secs,
        worker_poll_interval_ms,
        notify_max_retries,
    })
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "VVIC_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
