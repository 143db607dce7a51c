//! HTTP client for Nominatim-style `search` and `reverse` endpoints.

use std::sync::Arc;
use std::time::Duration;

use clinicmap_core::{AppConfig, Coordinates};
use reqwest::{Client, StatusCode, Url};

use crate::error::GeocodeError;
use crate::rate_limit::RateLimiter;
use crate::retry::retry_with_backoff;
use crate::types::{GeocodeResult, NominatimPlace};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Connection and query settings for [`NominatimClient`].
#[derive(Debug, Clone)]
pub struct GeocoderSettings {
    pub base_url: String,
    /// Identifying client signature; most public providers require a
    /// descriptive agent with contact details.
    pub user_agent: String,
    /// Appended as the last component of every forward query.
    pub country: String,
    /// Provider-side `countrycodes` filter. Empty disables the filter.
    pub country_codes: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl GeocoderSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.geocoder_base_url.clone(),
            user_agent: config.geocoder_user_agent.clone(),
            country: config.geocoder_country.clone(),
            country_codes: config.geocoder_country_codes.clone(),
            timeout_secs: config.geocoder_timeout_secs,
            max_retries: config.geocoder_max_retries,
            retry_backoff_base_ms: config.geocoder_retry_backoff_base_ms,
        }
    }
}

impl Default for GeocoderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: "clinicmap/0.1 (location-validation)".to_string(),
            country: "USA".to_string(),
            country_codes: "us".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            retry_backoff_base_ms: 1_000,
        }
    }
}

/// Client for a Nominatim-compatible geocoding provider.
///
/// Every outbound request first waits on the shared [`RateLimiter`], so one
/// limiter passed to several clients still enforces a single global pace.
pub struct NominatimClient {
    client: Client,
    search_url: Url,
    reverse_url: Url,
    country: String,
    country_codes: String,
    limiter: Arc<RateLimiter>,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl NominatimClient {
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `settings.base_url` does not parse.
    pub fn new(settings: &GeocoderSettings, limiter: Arc<RateLimiter>) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .build()?;

        // Ensure exactly one trailing slash so `join` appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", settings.base_url.trim_end_matches('/'));
        let invalid = |reason: String| GeocodeError::InvalidBaseUrl {
            base_url: settings.base_url.clone(),
            reason,
        };
        let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
        let search_url = base.join("search").map_err(|e| invalid(e.to_string()))?;
        let reverse_url = base.join("reverse").map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            search_url,
            reverse_url,
            country: settings.country.clone(),
            country_codes: settings.country_codes.clone(),
            limiter,
            max_retries: settings.max_retries,
            retry_backoff_base_ms: settings.retry_backoff_base_ms,
        })
    }

    /// Builds a client and its own limiter from application config.
    ///
    /// # Errors
    ///
    /// See [`NominatimClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, GeocodeError> {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(
            config.geocoder_min_interval_ms,
        )));
        Self::new(&GeocoderSettings::from_app_config(config), limiter)
    }

    /// `"{address}, {city}, {state}, {country}"`, skipping an empty country.
    #[must_use]
    pub fn forward_query(&self, address: &str, city: &str, state: &str) -> String {
        let mut parts = vec![address.trim(), city.trim(), state.trim()];
        if !self.country.trim().is_empty() {
            parts.push(self.country.trim());
        }
        parts.join(", ")
    }

    /// Resolves an address to its highest-relevance match.
    ///
    /// Returns `Ok(None)` when the provider finds nothing.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Http`] on network failure or timeout after retries.
    /// - [`GeocodeError::RateLimited`] / [`GeocodeError::UnexpectedStatus`] for
    ///   non-2xx responses (429 and 5xx after retries).
    /// - [`GeocodeError::Deserialize`] / [`GeocodeError::InvalidResponse`] if
    ///   the body is not a usable result array.
    pub async fn try_forward(
        &self,
        address: &str,
        city: &str,
        state: &str,
    ) -> Result<Option<GeocodeResult>, GeocodeError> {
        let query = self.forward_query(address, city, state);
        let url = self.build_search_url(&query);
        let body = self.request_json(&url).await?;

        let places: Vec<NominatimPlace> =
            serde_json::from_value(body).map_err(|e| GeocodeError::Deserialize {
                context: format!("search(q={query})"),
                source: e,
            })?;

        places
            .into_iter()
            .next()
            .map(GeocodeResult::try_from)
            .transpose()
    }

    /// Resolves coordinates to the provider's nearest address.
    ///
    /// Returns `Ok(None)` when the provider answers with an `error` object
    /// (e.g. "Unable to geocode" for open ocean) or `null`.
    ///
    /// # Errors
    ///
    /// Same as [`NominatimClient::try_forward`].
    pub async fn try_reverse(
        &self,
        point: Coordinates,
    ) -> Result<Option<GeocodeResult>, GeocodeError> {
        let url = self.build_reverse_url(point);
        let body = self.request_json(&url).await?;

        if body.is_null() || body.get("error").is_some() {
            return Ok(None);
        }

        let place: NominatimPlace =
            serde_json::from_value(body).map_err(|e| GeocodeError::Deserialize {
                context: format!("reverse(lat={}, lon={})", point.latitude, point.longitude),
                source: e,
            })?;

        GeocodeResult::try_from(place).map(Some)
    }

    fn build_search_url(&self, query: &str) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("format", "json");
            pairs.append_pair("q", query);
            pairs.append_pair("limit", "1");
            pairs.append_pair("addressdetails", "1");
            if !self.country_codes.is_empty() {
                pairs.append_pair("countrycodes", &self.country_codes);
            }
        }
        url
    }

    fn build_reverse_url(&self, point: Coordinates) -> Url {
        let mut url = self.reverse_url.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &point.latitude.to_string())
            .append_pair("lon", &point.longitude.to_string())
            .append_pair("addressdetails", "1");
        url
    }

    /// Paces, sends a GET, maps non-2xx statuses to typed errors and parses
    /// the body as JSON, retrying transient failures.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, GeocodeError> {
        retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || async move {
            self.limiter.acquire().await;

            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after_secs = response
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(1);
                return Err(GeocodeError::RateLimited { retry_after_secs });
            }

            if !status.is_success() {
                return Err(GeocodeError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }

            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: url.to_string(),
                source: e,
            })
        })
        .await
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
