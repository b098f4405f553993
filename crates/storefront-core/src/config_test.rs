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

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("STOREFRONT_API_BASE_URL", "https://shop.example.com/wp-json/wc/v3");
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
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "STOREFRONT_ENV"));
}

#[test]
fn build_app_config_fails_without_base_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STOREFRONT_API_BASE_URL"),
        "expected MissingEnvVar(STOREFRONT_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_blank_base_url() {
    let mut map = full_env();
    map.insert("STOREFRONT_API_BASE_URL", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_rejects_non_http_base_url() {
    let mut map = full_env();
    map.insert("STOREFRONT_API_BASE_URL", "ftp://shop.example.com");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREFRONT_API_BASE_URL"),
        "expected InvalidEnvVar(STOREFRONT_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    assert_eq!(cfg.env, Environment::Development);
    assert!(cfg.credentials.is_none());
    assert_eq!(cfg.credential_placement, CredentialPlacement::Header);
    assert_eq!(cfg.totals_source, TotalsSource::Headers);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 15);
    assert_eq!(cfg.user_agent, "storefront/0.1 (catalog-browser)");
    assert_eq!(cfg.default_per_page, 12);
    assert_eq!(cfg.rate_limit_per_minute, 120);
}

#[test]
fn build_app_config_reads_credential_pair() {
    let mut map = full_env();
    map.insert("STOREFRONT_CONSUMER_KEY", "ck_test");
    map.insert("STOREFRONT_CONSUMER_SECRET", "cs_test");
    map.insert("STOREFRONT_CREDENTIAL_PLACEMENT", "query");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    let creds = cfg.credentials.expect("credentials present");
    assert_eq!(creds.consumer_key, "ck_test");
    assert_eq!(creds.consumer_secret, "cs_test");
    assert_eq!(cfg.credential_placement, CredentialPlacement::Query);
}

#[test]
fn build_app_config_rejects_key_without_secret() {
    let mut map = full_env();
    map.insert("STOREFRONT_CONSUMER_KEY", "ck_test");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STOREFRONT_CONSUMER_SECRET"),
        "expected MissingEnvVar(STOREFRONT_CONSUMER_SECRET), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_secret_without_key() {
    let mut map = full_env();
    map.insert("STOREFRONT_CONSUMER_SECRET", "cs_test");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "STOREFRONT_CONSUMER_KEY"),
        "expected MissingEnvVar(STOREFRONT_CONSUMER_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_unknown_credential_placement() {
    let mut map = full_env();
    map.insert("STOREFRONT_CREDENTIAL_PLACEMENT", "cookie");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREFRONT_CREDENTIAL_PLACEMENT")
    );
}

#[test]
fn build_app_config_reads_body_totals_source() {
    let mut map = full_env();
    map.insert("STOREFRONT_TOTALS_SOURCE", "body");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    assert_eq!(cfg.totals_source, TotalsSource::Body);
}

#[test]
fn build_app_config_rejects_unknown_totals_source() {
    let mut map = full_env();
    map.insert("STOREFRONT_TOTALS_SOURCE", "footer");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREFRONT_TOTALS_SOURCE")
    );
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("STOREFRONT_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREFRONT_BIND_ADDR"),
        "expected InvalidEnvVar(STOREFRONT_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_timeout_override() {
    let mut map = full_env();
    map.insert("STOREFRONT_REQUEST_TIMEOUT_SECS", "60");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    assert_eq!(cfg.request_timeout_secs, 60);
}

#[test]
fn build_app_config_rejects_zero_timeout() {
    let mut map = full_env();
    map.insert("STOREFRONT_REQUEST_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREFRONT_REQUEST_TIMEOUT_SECS")
    );
}

#[test]
fn build_app_config_rejects_non_numeric_per_page() {
    let mut map = full_env();
    map.insert("STOREFRONT_DEFAULT_PER_PAGE", "many");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREFRONT_DEFAULT_PER_PAGE")
    );
}

#[test]
fn build_app_config_rejects_zero_per_page() {
    let mut map = full_env();
    map.insert("STOREFRONT_DEFAULT_PER_PAGE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "STOREFRONT_DEFAULT_PER_PAGE")
    );
}

#[test]
fn debug_output_redacts_credentials() {
    let mut map = full_env();
    map.insert("STOREFRONT_CONSUMER_KEY", "ck_very_secret");
    map.insert("STOREFRONT_CONSUMER_SECRET", "cs_very_secret");
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("ck_very_secret"));
    assert!(!rendered.contains("cs_very_secret"));
    assert!(rendered.contains("[redacted]"));
}
