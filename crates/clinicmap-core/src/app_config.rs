use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::location::Coordinates;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Rectangular lat/lng region that clinic coordinates are expected to fall in.
///
/// Inclusive on all four edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl ServiceBounds {
    /// Continental US: lat 24..=49, lng -125..=-66.
    #[must_use]
    pub const fn continental_us() -> Self {
        Self {
            min_lat: 24.0,
            max_lat: 49.0,
            min_lng: -125.0,
            max_lng: -66.0,
        }
    }

    #[must_use]
    pub fn contains(&self, point: Coordinates) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude)
            && (self.min_lng..=self.max_lng).contains(&point.longitude)
    }
}

impl Default for ServiceBounds {
    fn default() -> Self {
        Self::continental_us()
    }
}

impl FromStr for ServiceBounds {
    type Err = String;

    /// Parses `min_lat,max_lat,min_lng,max_lng`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{p}': {e}")))
            .collect::<Result<Vec<_>, _>>()?;

        let &[min_lat, max_lat, min_lng, max_lng] = parts.as_slice() else {
            return Err(format!(
                "expected 4 comma-separated values (min_lat,max_lat,min_lng,max_lng), got {}",
                parts.len()
            ));
        };

        if !(min_lat < max_lat && min_lng < max_lng) {
            return Err(format!(
                "bounds are inverted or empty: lat {min_lat}..{max_lat}, lng {min_lng}..{max_lng}"
            ));
        }

        Ok(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub geocoder_base_url: String,
    pub geocoder_user_agent: String,
    pub geocoder_country: String,
    pub geocoder_country_codes: String,
    pub geocoder_timeout_secs: u64,
    pub geocoder_min_interval_ms: u64,
    pub geocoder_max_retries: u32,
    pub geocoder_retry_backoff_base_ms: u64,
    pub precision_threshold_m: f64,
    pub correction_cutoff_m: f64,
    pub confidence_threshold: u8,
    pub service_bounds: ServiceBounds,
    pub batch_size: usize,
    pub geocode_cache_ttl_secs: u64,
    pub geocode_cache_max_entries: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("geocoder_user_agent", &self.geocoder_user_agent)
            .field("geocoder_country", &self.geocoder_country)
            .field("geocoder_country_codes", &self.geocoder_country_codes)
            .field("geocoder_timeout_secs", &self.geocoder_timeout_secs)
            .field("geocoder_min_interval_ms", &self.geocoder_min_interval_ms)
            .field("geocoder_max_retries", &self.geocoder_max_retries)
            .field(
                "geocoder_retry_backoff_base_ms",
                &self.geocoder_retry_backoff_base_ms,
            )
            .field("precision_threshold_m", &self.precision_threshold_m)
            .field("correction_cutoff_m", &self.correction_cutoff_m)
            .field("confidence_threshold", &self.confidence_threshold)
            .field("service_bounds", &self.service_bounds)
            .field("batch_size", &self.batch_size)
            .field("geocode_cache_ttl_secs", &self.geocode_cache_ttl_secs)
            .field("geocode_cache_max_entries", &self.geocode_cache_max_entries)
            .finish()
    }
}
