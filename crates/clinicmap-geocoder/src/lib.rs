//! Forward and reverse geocoding against a Nominatim-compatible provider.
//!
//! [`NominatimClient`] exposes fallible `try_*` calls for callers that care
//! about the failure cause. The [`Geocoder`] trait is the contract the
//! validator consumes: provider failures collapse to `None` (no evidence),
//! never to an error.

pub mod client;
pub mod error;
mod geocoder;
pub mod rate_limit;
mod retry;
pub mod types;

pub use client::{GeocoderSettings, NominatimClient};
pub use error::GeocodeError;
pub use geocoder::Geocoder;
pub use rate_limit::RateLimiter;
pub use types::{GeocodeResult, NominatimPlace};
