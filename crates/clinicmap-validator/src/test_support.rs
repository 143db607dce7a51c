//! In-memory geocoder and record builders for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use clinicmap_core::{Coordinates, LocationRecord};
use clinicmap_geocoder::{GeocodeResult, Geocoder};

type DelayFn = Box<dyn Fn(Coordinates) -> Duration + Send + Sync>;

/// Returns canned results and counts calls. Optional per-call delay lets
/// tests control completion order and observe peak concurrency.
#[derive(Default)]
pub(crate) struct StubGeocoder {
    pub forward: Option<GeocodeResult>,
    pub reverse: Option<GeocodeResult>,
    pub panic_on_reverse: bool,
    pub reverse_delay: Option<DelayFn>,
    pub forward_calls: AtomicUsize,
    pub reverse_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl StubGeocoder {
    /// A provider that finds nothing in either direction.
    pub fn outage() -> Self {
        Self::default()
    }

    /// Reverse geocodes to `reverse_text`; forward geocodes to `forward_at`.
    pub fn answering(reverse_text: &str, forward_at: Coordinates, provider_confidence: f64) -> Self {
        Self {
            reverse: Some(geocode(forward_at, reverse_text, provider_confidence)),
            forward: Some(geocode(forward_at, reverse_text, provider_confidence)),
            ..Self::default()
        }
    }

    pub fn forward_calls(&self) -> usize {
        self.forward_calls.load(Ordering::SeqCst)
    }

    pub fn reverse_calls(&self) -> usize {
        self.reverse_calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn forward_geocode(
        &self,
        _address: &str,
        _city: &str,
        _state: &str,
    ) -> Option<GeocodeResult> {
        self.forward_calls.fetch_add(1, Ordering::SeqCst);
        self.forward.clone()
    }

    async fn reverse_geocode(&self, point: Coordinates) -> Option<GeocodeResult> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        assert!(!self.panic_on_reverse, "provider client crashed");

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = &self.reverse_delay {
            tokio::time::sleep(delay(point)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.reverse.clone()
    }
}

pub(crate) fn geocode(at: Coordinates, text: &str, confidence: f64) -> GeocodeResult {
    GeocodeResult {
        coordinates: at,
        matched_address: text.to_string(),
        provider_confidence: confidence,
    }
}

pub(crate) fn record(id: &str, lat: Option<f64>, lng: Option<f64>) -> LocationRecord {
    LocationRecord {
        id: id.to_string(),
        name: format!("Clinic {id}"),
        address: Some("100 Main St".to_string()),
        city: Some("Miami".to_string()),
        state: Some("FL".to_string()),
        latitude: lat,
        longitude: lng,
    }
}

pub(crate) const MIAMI: Coordinates = Coordinates::new(25.7617, -80.1918);
pub(crate) const SEATTLE: Coordinates = Coordinates::new(47.6062, -122.3321);
pub(crate) const MIAMI_TEXT: &str =
    "100, Main Street, Miami, Miami-Dade County, Florida, 33101, United States";
pub(crate) const SEATTLE_TEXT: &str =
    "Pike Street, Seattle, King County, Washington, 98101, United States";
