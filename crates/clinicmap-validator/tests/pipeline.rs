//! End-to-end run over a mixed collection: validate, report, plan.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clinicmap_core::{Coordinates, LocationRecord, StateTable, TtlCache};
use clinicmap_geocoder::{GeocodeResult, Geocoder};
use clinicmap_validator::{
    generate_report, plan_corrections, precision_breakdown, state_analysis, CachingGeocoder,
    CorrectionAction, CorrectionPolicy, LocationValidator, ValidationConfig,
};

/// Knows a handful of cities; everything else is a miss.
struct CityGazetteer {
    places: HashMap<&'static str, (Coordinates, &'static str)>,
}

impl CityGazetteer {
    fn new() -> Self {
        let places = HashMap::from([
            (
                "austin",
                (
                    Coordinates::new(30.2672, -97.7431),
                    "Congress Avenue, Austin, Travis County, Texas, 78701, United States",
                ),
            ),
            (
                "denver",
                (
                    Coordinates::new(39.7392, -104.9903),
                    "Civic Center, Denver, Colorado, 80202, United States",
                ),
            ),
        ]);
        Self { places }
    }

    fn nearest(&self, point: Coordinates) -> Option<&(Coordinates, &'static str)> {
        self.places.values().find(|(at, _)| {
            (at.latitude - point.latitude).abs() < 0.01 && (at.longitude - point.longitude).abs() < 0.01
        })
    }
}

#[async_trait]
impl Geocoder for CityGazetteer {
    async fn forward_geocode(&self, _address: &str, city: &str, _state: &str) -> Option<GeocodeResult> {
        let (at, text) = self.places.get(city.to_lowercase().as_str())?;
        Some(GeocodeResult {
            coordinates: *at,
            matched_address: (*text).to_string(),
            provider_confidence: 60.0,
        })
    }

    async fn reverse_geocode(&self, point: Coordinates) -> Option<GeocodeResult> {
        let (at, text) = self.nearest(point)?;
        Some(GeocodeResult {
            coordinates: *at,
            matched_address: (*text).to_string(),
            provider_confidence: 60.0,
        })
    }
}

fn clinic(id: &str, city: &str, state: &str, at: Option<(f64, f64)>) -> LocationRecord {
    LocationRecord {
        id: id.to_string(),
        name: format!("{city} Speech Center"),
        address: Some("1 Main St".to_string()),
        city: Some(city.to_string()),
        state: Some(state.to_string()),
        latitude: at.map(|(lat, _)| lat),
        longitude: at.map(|(_, lng)| lng),
    }
}

#[tokio::test]
async fn mixed_collection_produces_complete_report_and_plan() {
    let records = vec![
        clinic("ok-austin", "Austin", "TX", Some((30.2672, -97.7431))),
        // Stored a few hundred meters off.
        clinic("drift-denver", "Denver", "Colorado", Some((39.7420, -104.9903))),
        clinic("lost", "Boise", "ID", None),
        clinic("ocean", "Austin", "TX", Some((10.0, -150.0))),
    ];

    let cache = Arc::new(TtlCache::new(Duration::from_secs(300), 64));
    let geocoder = CachingGeocoder::new(CityGazetteer::new(), cache);
    let config = ValidationConfig::default();
    let validator = LocationValidator::new(geocoder, config);

    let results = validator.validate_all(&records, 3).await;
    assert_eq!(results.len(), records.len());

    let ok = &results[0];
    assert!(!ok.correction_needed, "{:?}", ok.issues);
    assert_eq!(ok.confidence_score, 100);

    let drift = &results[1];
    assert!(drift.correction_needed);
    assert!(drift.distance_error_m.is_some_and(|d| d > 100.0));

    let report = generate_report(&results, &config);
    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.needs_correction, 3);
    assert_eq!(report.issues.len(), 3);
    assert!(report
        .issues
        .windows(2)
        .all(|w| w[0].confidence_score <= w[1].confidence_score));

    let breakdown = precision_breakdown(&results, &config);
    assert_eq!(breakdown.ultra_high, 1);

    let by_state = state_analysis(&results, &config, &StateTable::us());
    assert!(by_state.iter().any(|s| s.state == "CO" && s.total == 1));

    let plan = plan_corrections(
        &report,
        CorrectionPolicy {
            delete_unlocatable: true,
        },
    );
    assert_eq!(plan.len(), 3);
    let by_id: HashMap<&str, &CorrectionAction> = plan.iter().map(|a| (a.record_id(), a)).collect();
    assert!(matches!(by_id["drift-denver"], CorrectionAction::Relocate { .. }));
    assert!(matches!(by_id["lost"], CorrectionAction::Delete { .. }));
    // The ocean record still has an address that geocodes, so it is moved
    // back to Austin rather than deleted.
    assert!(matches!(by_id["ocean"], CorrectionAction::Relocate { .. }));
}
