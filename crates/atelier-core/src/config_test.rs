use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("ATELIER_SHOP_DOMAIN", "atelier-demo.myshopify.com");
    m.insert("ATELIER_ADMIN_TOKEN", "shpat_test");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "ATELIER_ENV"));
}

#[test]
fn build_app_config_fails_without_shop_domain() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "ATELIER_SHOP_DOMAIN"),
        "expected MissingEnvVar(ATELIER_SHOP_DOMAIN), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_token_as_missing() {
    let mut map = full_env();
    map.insert("ATELIER_ADMIN_TOKEN", "  ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "ATELIER_ADMIN_TOKEN"),
        "expected MissingEnvVar(ATELIER_ADMIN_TOKEN), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.shop_domain, "atelier-demo.myshopify.com");
    assert_eq!(cfg.api_version, "2024-10");
    assert_eq!(cfg.metaobject_type, "custom_product");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "atelier/0.1 (catalog)");
    assert_eq!(cfg.media_poll_attempts, 30);
    assert_eq!(cfg.media_poll_interval_ms, 1000);
}

#[test]
fn build_app_config_applies_overrides() {
    let mut map = full_env();
    map.insert("ATELIER_ENV", "production");
    map.insert("ATELIER_METAOBJECT_TYPE", "lookbook_item");
    map.insert("ATELIER_MEDIA_POLL_ATTEMPTS", "5");
    map.insert("ATELIER_MEDIA_POLL_INTERVAL_MS", "250");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.metaobject_type, "lookbook_item");
    assert_eq!(cfg.media_poll_attempts, 5);
    assert_eq!(cfg.media_poll_interval_ms, 250);
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = full_env();
    map.insert("ATELIER_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ATELIER_REQUEST_TIMEOUT_SECS"
        ),
        "expected InvalidEnvVar(ATELIER_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_poll_attempts() {
    let mut map = full_env();
    map.insert("ATELIER_MEDIA_POLL_ATTEMPTS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(
            result,
            Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ATELIER_MEDIA_POLL_ATTEMPTS"
        ),
        "expected InvalidEnvVar(ATELIER_MEDIA_POLL_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn debug_output_redacts_admin_token() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("shpat_test"));
    assert!(rendered.contains("[redacted]"));
}
