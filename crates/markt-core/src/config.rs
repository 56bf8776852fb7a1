use crate::app_config::AppConfig;
use crate::calendar::ReferenceYearWindow;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
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
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so only malformed values fail.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

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

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(raw)
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("\"{raw}\" is not an http(s) URL"),
            })
        }
    };

    let log_level = or_default("MARKT_LOG_LEVEL", "info");
    let calendar_url = parse_url("MARKT_CALENDAR_URL", "https://donevents.nl/marktkalender/")?;
    let urls_path = PathBuf::from(or_default("MARKT_URLS_PATH", "./data/market_urls.json"));
    let mappings_path = PathBuf::from(or_default(
        "MARKT_MAPPINGS_PATH",
        "./config/address_mappings.json",
    ));
    let output_path = PathBuf::from(or_default(
        "MARKT_OUTPUT_PATH",
        "./data/markets_detailed.json",
    ));
    let geocoder_url = parse_url(
        "MARKT_GEOCODER_URL",
        "https://nominatim.openstreetmap.org",
    )?;
    let user_agent = or_default("MARKT_USER_AGENT", "markt/0.1 (flea-market-calendar)");

    let request_timeout_secs = parse_u64("MARKT_REQUEST_TIMEOUT_SECS", "15")?;
    let geocode_timeout_secs = parse_u64("MARKT_GEOCODE_TIMEOUT_SECS", "10")?;
    let inter_request_delay_ms = parse_u64("MARKT_INTER_REQUEST_DELAY_MS", "1000")?;
    let geocode_delay_ms = parse_u64("MARKT_GEOCODE_DELAY_MS", "1000")?;
    let max_retries = parse_u32("MARKT_MAX_RETRIES", "2")?;
    let retry_backoff_base_secs = parse_u64("MARKT_RETRY_BACKOFF_BASE_SECS", "1")?;

    let reference_year = or_default("MARKT_REFERENCE_YEAR", "2025");
    let reference_years = reference_year
        .parse::<i32>()
        .map_err(|e| e.to_string())
        .and_then(|year| {
            if (2000..=2100).contains(&year) {
                Ok(ReferenceYearWindow::new(year))
            } else {
                Err(format!("{year} is outside 2000..=2100"))
            }
        })
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "MARKT_REFERENCE_YEAR".to_string(),
            reason,
        })?;

    Ok(AppConfig {
        log_level,
        calendar_url,
        urls_path,
        mappings_path,
        output_path,
        geocoder_url,
        user_agent,
        request_timeout_secs,
        geocode_timeout_secs,
        inter_request_delay_ms,
        geocode_delay_ms,
        max_retries,
        retry_backoff_base_secs,
        reference_years,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
