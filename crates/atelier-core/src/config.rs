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

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let shop_domain = require("ATELIER_SHOP_DOMAIN")?;
    let admin_token = require("ATELIER_ADMIN_TOKEN")?;

    let env = parse_environment(&or_default("ATELIER_ENV", "development"))?;
    let api_version = or_default("ATELIER_API_VERSION", "2024-10");
    let metaobject_type = or_default("ATELIER_METAOBJECT_TYPE", "custom_product");
    let log_level = or_default("ATELIER_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("ATELIER_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("ATELIER_USER_AGENT", "atelier/0.1 (catalog)");

    let media_poll_attempts = parse_u32("ATELIER_MEDIA_POLL_ATTEMPTS", "30")?;
    if media_poll_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ATELIER_MEDIA_POLL_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let media_poll_interval_ms = parse_u64("ATELIER_MEDIA_POLL_INTERVAL_MS", "1000")?;

    Ok(AppConfig {
        env,
        shop_domain,
        admin_token,
        api_version,
        metaobject_type,
        log_level,
        request_timeout_secs,
        user_agent,
        media_poll_attempts,
        media_poll_interval_ms,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ATELIER_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
