use clinicmap_core::{AppConfig, Coordinates, LocationRecord, ServiceBounds};
use serde::{Deserialize, Serialize};

pub const NO_ADDRESS_PROVIDED: &str = "No address provided";

/// Thresholds that decide when a record needs correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum distance for a forward geocode to count as corroboration.
    pub precision_threshold_m: f64,
    /// Distance beyond which a record is flagged for correction.
    pub correction_cutoff_m: f64,
    /// Minimum final confidence for a record to pass.
    pub confidence_threshold: u8,
    /// Plausible service region; coordinates outside always need correction.
    pub bounds: ServiceBounds,
}

impl ValidationConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            precision_threshold_m: config.precision_threshold_m,
            correction_cutoff_m: config.correction_cutoff_m,
            confidence_threshold: config.confidence_threshold,
            bounds: config.service_bounds,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            precision_threshold_m: 10.0,
            correction_cutoff_m: 100.0,
            confidence_threshold: 90,
            bounds: ServiceBounds::continental_us(),
        }
    }
}

/// Sanity of a record's stored coordinates, decided before any geocoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateStatus {
    Valid,
    Missing,
    OutOfBounds,
}

/// Verdict for a single [`LocationRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub record_id: String,
    pub name: String,
    /// Street address as stored, or [`NO_ADDRESS_PROVIDED`].
    pub address: String,
    pub state: Option<String>,
    pub provided_latitude: Option<f64>,
    pub provided_longitude: Option<f64>,
    pub coordinate_status: CoordinateStatus,
    /// Forward-geocoded position of the record's address.
    pub validated_coordinates: Option<Coordinates>,
    pub distance_error_m: Option<f64>,
    pub confidence_score: u8,
    pub issues: Vec<String>,
    pub correction_needed: bool,
    pub reverse_geocoding_match: bool,
    pub forward_geocoding_match: bool,
}

impl ValidationResult {
    /// An unscored result echoing the record's identity and inputs.
    #[must_use]
    pub fn pending(record: &LocationRecord) -> Self {
        let address = record
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(NO_ADDRESS_PROVIDED)
            .to_string();

        Self {
            record_id: record.id.clone(),
            name: record.name.clone(),
            address,
            state: record.state.clone(),
            provided_latitude: record.latitude,
            provided_longitude: record.longitude,
            coordinate_status: CoordinateStatus::Valid,
            validated_coordinates: None,
            distance_error_m: None,
            confidence_score: 0,
            issues: Vec::new(),
            correction_needed: false,
            reverse_geocoding_match: false,
            forward_geocoding_match: false,
        }
    }

    /// Stored coordinates are absent or outside the service region.
    #[must_use]
    pub fn is_unlocatable(&self) -> bool {
        self.coordinate_status != CoordinateStatus::Valid
    }
}
