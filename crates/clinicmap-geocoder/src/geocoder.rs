use async_trait::async_trait;
use clinicmap_core::Coordinates;

use crate::client::NominatimClient;
use crate::types::GeocodeResult;

/// Forward and reverse geocoding as consumed by the location validator.
///
/// Implementations never fail: transport errors, timeouts, malformed bodies
/// and empty result sets all come back as `None`.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn forward_geocode(&self, address: &str, city: &str, state: &str)
        -> Option<GeocodeResult>;

    async fn reverse_geocode(&self, point: Coordinates) -> Option<GeocodeResult>;
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn forward_geocode(
        &self,
        address: &str,
        city: &str,
        state: &str,
    ) -> Option<GeocodeResult> {
        match self.try_forward(address, city, state).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    query = %self.forward_query(address, city, state),
                    error = %err,
                    "forward geocoding failed"
                );
                None
            }
        }
    }

    async fn reverse_geocode(&self, point: Coordinates) -> Option<GeocodeResult> {
        match self.try_reverse(point).await {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    lat = point.latitude,
                    lng = point.longitude,
                    error = %err,
                    "reverse geocoding failed"
                );
                None
            }
        }
    }
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for std::sync::Arc<G> {
    async fn forward_geocode(
        &self,
        address: &str,
        city: &str,
        state: &str,
    ) -> Option<GeocodeResult> {
        (**self).forward_geocode(address, city, state).await
    }

    async fn reverse_geocode(&self, point: Coordinates) -> Option<GeocodeResult> {
        (**self).reverse_geocode(point).await
    }
}
