use crate::app_config::{AppConfig, Environment, ServiceBounds};
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
/// Decoupled from the real process environment so parsing and validation can
/// be tested against a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_meters = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        let value = raw.parse::<f64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })?;
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a non-negative distance in meters, got {raw}"),
            });
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("CLINICMAP_ENV", "development"))?;
    let log_level = or_default("CLINICMAP_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("CLINICMAP_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CLINICMAP_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CLINICMAP_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let geocoder_base_url = or_default(
        "CLINICMAP_GEOCODER_BASE_URL",
        "https://nominatim.openstreetmap.org",
    );
    // Production traffic must identify its operator to the provider.
    let geocoder_user_agent = if env == Environment::Production {
        require("CLINICMAP_GEOCODER_USER_AGENT")?
    } else {
        or_default(
            "CLINICMAP_GEOCODER_USER_AGENT",
            "clinicmap/0.1 (location-validation)",
        )
    };
    let geocoder_country = or_default("CLINICMAP_GEOCODER_COUNTRY", "USA");
    let geocoder_country_codes = or_default("CLINICMAP_GEOCODER_COUNTRY_CODES", "us");
    let geocoder_timeout_secs = parse_u64("CLINICMAP_GEOCODER_TIMEOUT_SECS", "30")?;
    let geocoder_min_interval_ms = parse_u64("CLINICMAP_GEOCODER_MIN_INTERVAL_MS", "1100")?;
    let geocoder_max_retries = parse_u32("CLINICMAP_GEOCODER_MAX_RETRIES", "2")?;
    let geocoder_retry_backoff_base_ms =
        parse_u64("CLINICMAP_GEOCODER_RETRY_BACKOFF_BASE_MS", "1000")?;

    let precision_threshold_m = parse_meters("CLINICMAP_PRECISION_THRESHOLD_M", "10")?;
    let correction_cutoff_m = parse_meters("CLINICMAP_CORRECTION_CUTOFF_M", "100")?;
    if correction_cutoff_m < precision_threshold_m {
        return Err(ConfigError::InvalidEnvVar {
            var: "CLINICMAP_CORRECTION_CUTOFF_M".to_string(),
            reason: format!(
                "correction cutoff ({correction_cutoff_m}m) must not be below the precision threshold ({precision_threshold_m}m)"
            ),
        });
    }

    let confidence_threshold = parse_confidence(&or_default("CLINICMAP_CONFIDENCE_THRESHOLD", "90"))?;

    let service_bounds = or_default("CLINICMAP_BOUNDS", "24,49,-125,-66")
        .parse::<ServiceBounds>()
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "CLINICMAP_BOUNDS".to_string(),
            reason,
        })?;

    let batch_size = parse_usize("CLINICMAP_BATCH_SIZE", "5")?;
    if batch_size == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CLINICMAP_BATCH_SIZE".to_string(),
            reason: "batch size must be at least 1".to_string(),
        });
    }

    let geocode_cache_ttl_secs = parse_u64("CLINICMAP_GEOCODE_CACHE_TTL_SECS", "86400")?;
    let geocode_cache_max_entries = parse_usize("CLINICMAP_GEOCODE_CACHE_MAX_ENTRIES", "10000")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        geocoder_base_url,
        geocoder_user_agent,
        geocoder_country,
        geocoder_country_codes,
        geocoder_timeout_secs,
        geocoder_min_interval_ms,
        geocoder_max_retries,
        geocoder_retry_backoff_base_ms,
        precision_threshold_m,
        correction_cutoff_m,
        confidence_threshold,
        service_bounds,
        batch_size,
        geocode_cache_ttl_secs,
        geocode_cache_max_entries,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CLINICMAP_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_confidence(raw: &str) -> Result<u8, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "CLINICMAP_CONFIDENCE_THRESHOLD".to_string(),
        reason,
    };
    let value = raw.parse::<u8>().map_err(|e| invalid(e.to_string()))?;
    if value > 100 {
        return Err(invalid(format!("expected 0..=100, got {value}")));
    }
    Ok(value)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
