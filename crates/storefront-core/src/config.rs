use crate::app_config::{AppConfig, CredentialPlacement, Credentials, Environment, TotalsSource};
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
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let api_base_url = require("STOREFRONT_API_BASE_URL")?;
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(invalid(
            "STOREFRONT_API_BASE_URL",
            format!("expected an http(s) URL, got \"{api_base_url}\""),
        ));
    }

    let env = parse_environment(&or_default("STOREFRONT_ENV", "development"))?;

    let credentials = parse_credentials(
        lookup("STOREFRONT_CONSUMER_KEY").ok(),
        lookup("STOREFRONT_CONSUMER_SECRET").ok(),
    )?;
    let credential_placement =
        parse_credential_placement(&or_default("STOREFRONT_CREDENTIAL_PLACEMENT", "header"))?;
    let totals_source = parse_totals_source(&or_default("STOREFRONT_TOTALS_SOURCE", "headers"))?;

    let bind_addr = or_default("STOREFRONT_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("STOREFRONT_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("STOREFRONT_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("STOREFRONT_REQUEST_TIMEOUT_SECS", "15")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "STOREFRONT_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let user_agent = or_default("STOREFRONT_USER_AGENT", "storefront/0.1 (catalog-browser)");
    let default_per_page = parse_u32("STOREFRONT_DEFAULT_PER_PAGE", "12")?;
    if default_per_page == 0 {
        return Err(invalid(
            "STOREFRONT_DEFAULT_PER_PAGE",
            "must be greater than zero".to_string(),
        ));
    }
    let rate_limit_per_minute = parse_usize("STOREFRONT_RATE_LIMIT_PER_MINUTE", "120")?;

    Ok(AppConfig {
        env,
        api_base_url,
        credentials,
        credential_placement,
        totals_source,
        bind_addr,
        log_level,
        request_timeout_secs,
        user_agent,
        default_per_page,
        rate_limit_per_minute,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREFRONT_ENV".to_string(),
            reason: format!("expected development, test or production, got \"{other}\""),
        }),
    }
}

/// Both halves of the pair must be set together; a lone key or secret is a
/// deployment mistake, not an anonymous client.
fn parse_credentials(
    key: Option<String>,
    secret: Option<String>,
) -> Result<Option<Credentials>, ConfigError> {
    let key = key.filter(|k| !k.trim().is_empty());
    let secret = secret.filter(|s| !s.trim().is_empty());
    match (key, secret) {
        (Some(consumer_key), Some(consumer_secret)) => Ok(Some(Credentials {
            consumer_key,
            consumer_secret,
        })),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingEnvVar(
            "STOREFRONT_CONSUMER_SECRET".to_string(),
        )),
        (None, Some(_)) => Err(ConfigError::MissingEnvVar(
            "STOREFRONT_CONSUMER_KEY".to_string(),
        )),
    }
}

fn parse_credential_placement(s: &str) -> Result<CredentialPlacement, ConfigError> {
    match s {
        "header" => Ok(CredentialPlacement::Header),
        "query" => Ok(CredentialPlacement::Query),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREFRONT_CREDENTIAL_PLACEMENT".to_string(),
            reason: format!("expected header or query, got \"{other}\""),
        }),
    }
}

fn parse_totals_source(s: &str) -> Result<TotalsSource, ConfigError> {
    match s {
        "headers" => Ok(TotalsSource::Headers),
        "body" => Ok(TotalsSource::Body),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREFRONT_TOTALS_SOURCE".to_string(),
            reason: format!("expected headers or body, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
