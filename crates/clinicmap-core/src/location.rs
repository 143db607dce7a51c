//! Clinic location records as read from the record store.

use serde::{Deserialize, Serialize};

/// A finite WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Both components are finite and within the geographic domain
    /// (lat -90..=90, lng -180..=180).
    #[must_use]
    pub fn is_geographic(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A clinic record under validation.
///
/// Locality fields are free text exactly as submitted; `state` may be a full
/// name or a postal abbreviation in any casing. Coordinates may be absent or
/// non-finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationRecord {
    /// The record's coordinates, if both are present and finite.
    ///
    /// Out-of-region values are still returned; range checks against the
    /// service area happen in the validator.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(Coordinates::new(lat, lng))
            }
            _ => None,
        }
    }

    /// `address`, `city` and `state`, when all three are non-blank.
    #[must_use]
    pub fn full_address(&self) -> Option<(&str, &str, &str)> {
        fn non_blank(field: &Option<String>) -> Option<&str> {
            field
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
        }

        Some((
            non_blank(&self.address)?,
            non_blank(&self.city)?,
            non_blank(&self.state)?,
        ))
    }
}
