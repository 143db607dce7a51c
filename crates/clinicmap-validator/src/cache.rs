//! Memoising [`Geocoder`] wrapper backed by a shared [`TtlCache`].

use std::sync::Arc;

use async_trait::async_trait;
use clinicmap_core::{Coordinates, TtlCache};
use clinicmap_geocoder::{GeocodeResult, Geocoder};

/// Reverse lookups are keyed at six decimal places, roughly 11 cm.
const COORDINATE_SCALE: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GeocodeKey {
    /// Lower-cased, whitespace-collapsed `address|city|state`.
    Forward(String),
    /// Micro-degrees.
    Reverse(i64, i64),
}

impl GeocodeKey {
    #[must_use]
    pub fn forward(address: &str, city: &str, state: &str) -> Self {
        let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        Self::Forward(format!(
            "{}|{}|{}",
            normalize(address),
            normalize(city),
            normalize(state)
        ))
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn reverse(point: Coordinates) -> Self {
        Self::Reverse(
            (point.latitude * COORDINATE_SCALE).round() as i64,
            (point.longitude * COORDINATE_SCALE).round() as i64,
        )
    }
}

pub type GeocodeCache = TtlCache<GeocodeKey, GeocodeResult>;

/// Serves repeat lookups from `cache` and forwards misses to `inner`.
///
/// Only successful lookups are stored, so a provider outage is retried on
/// the next call rather than remembered.
pub struct CachingGeocoder<G> {
    inner: G,
    cache: Arc<GeocodeCache>,
}

impl<G> CachingGeocoder<G> {
    #[must_use]
    pub fn new(inner: G, cache: Arc<GeocodeCache>) -> Self {
        Self { inner, cache }
    }

    #[must_use]
    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachingGeocoder<G> {
    async fn forward_geocode(
        &self,
        address: &str,
        city: &str,
        state: &str,
    ) -> Option<GeocodeResult> {
        let key = GeocodeKey::forward(address, city, state);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(?key, "geocode cache hit");
            return Some(hit);
        }
        let result = self.inner.forward_geocode(address, city, state).await?;
        self.cache.insert(key, result.clone());
        Some(result)
    }

    async fn reverse_geocode(&self, point: Coordinates) -> Option<GeocodeResult> {
        let key = GeocodeKey::reverse(point);
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!(?key, "geocode cache hit");
            return Some(hit);
        }
        let result = self.inner.reverse_geocode(point).await?;
        self.cache.insert(key, result.clone());
        Some(result)
    }
}
