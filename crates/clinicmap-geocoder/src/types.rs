//! Provider response shapes and the normalized geocode result.

use clinicmap_core::Coordinates;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GeocodeError;

/// Provider confidence assumed when the response carries no usable
/// `importance` value.
pub const DEFAULT_PROVIDER_CONFIDENCE: f64 = 50.0;

/// One place from a Nominatim `search` array or a `reverse` object.
///
/// Nominatim encodes `lat`/`lon` as strings; numbers are accepted too so
/// other compatible providers parse.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    #[serde(deserialize_with = "f64_from_str_or_number")]
    pub lat: f64,
    #[serde(deserialize_with = "f64_from_str_or_number")]
    pub lon: f64,
    #[serde(default)]
    pub display_name: String,
    /// Relevance in `0.0..=1.0`.
    #[serde(default)]
    pub importance: Option<f64>,
}

/// Outcome of a single successful geocode call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub coordinates: Coordinates,
    /// Provider's formatted address for the match.
    pub matched_address: String,
    /// Provider self-confidence in `0.0..=100.0`.
    pub provider_confidence: f64,
}

impl TryFrom<NominatimPlace> for GeocodeResult {
    type Error = GeocodeError;

    fn try_from(place: NominatimPlace) -> Result<Self, Self::Error> {
        let coordinates = Coordinates::new(place.lat, place.lon);
        if !coordinates.is_geographic() {
            return Err(GeocodeError::InvalidResponse(format!(
                "coordinates out of range: lat={}, lon={}",
                place.lat, place.lon
            )));
        }

        Ok(Self {
            coordinates,
            matched_address: place.display_name,
            provider_confidence: provider_confidence(place.importance),
        })
    }
}

/// `importance × 100`, clamped to `0..=100`. Missing, zero or non-finite
/// importance falls back to [`DEFAULT_PROVIDER_CONFIDENCE`].
#[must_use]
pub fn provider_confidence(importance: Option<f64>) -> f64 {
    match importance {
        Some(i) if i.is_finite() && i != 0.0 => (i * 100.0).clamp(0.0, 100.0),
        _ => DEFAULT_PROVIDER_CONFIDENCE,
    }
}

fn f64_from_str_or_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}
