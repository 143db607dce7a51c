//! Per-record location validation.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use clinicmap_core::{Coordinates, LocationRecord};
use clinicmap_geocoder::Geocoder;
use futures::FutureExt;

use crate::distance::distance_meters;
use crate::locality::LocalityMatcher;
use crate::types::{CoordinateStatus, ValidationConfig, ValidationResult};

/// Confidence awarded when reverse geocoding confirms both city and state.
pub const REVERSE_MATCH_POINTS: f64 = 50.0;
/// Confidence awarded when the forward geocode lands within the precision threshold.
pub const FORWARD_MATCH_POINTS: f64 = 40.0;
/// Provider confidence above this value is added as a bonus.
pub const PROVIDER_CONFIDENCE_BASELINE: f64 = 50.0;

/// Validates clinic coordinates by corroborating them against a geocoder.
///
/// Confidence is a sum of independent evidence: a reverse geocode that names
/// the claimed locality, a forward geocode of the address that lands within
/// the precision threshold, and the provider's own confidence above 50.
pub struct LocationValidator<G> {
    geocoder: G,
    matcher: LocalityMatcher,
    config: ValidationConfig,
}

impl<G: Geocoder> LocationValidator<G> {
    #[must_use]
    pub fn new(geocoder: G, config: ValidationConfig) -> Self {
        Self {
            geocoder,
            matcher: LocalityMatcher::default(),
            config,
        }
    }

    #[must_use]
    pub fn with_matcher(mut self, matcher: LocalityMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    #[must_use]
    pub fn matcher(&self) -> &LocalityMatcher {
        &self.matcher
    }

    /// Produces a verdict for `record`. Never fails and never panics: geocoder
    /// outages and panics inside the geocoder become issues on the result.
    ///
    /// Records without usable coordinates return immediately with no
    /// geocoder calls.
    pub async fn validate(&self, record: &LocationRecord) -> ValidationResult {
        let mut result = ValidationResult::pending(record);

        let Some(point) = record.coordinates() else {
            result.coordinate_status = CoordinateStatus::Missing;
            result.issues.push("Invalid or missing coordinates".to_string());
            result.correction_needed = true;
            tracing::debug!(record_id = %record.id, "missing coordinates, skipping geocoding");
            return result;
        };

        if !self.config.bounds.contains(point) {
            result.coordinate_status = CoordinateStatus::OutOfBounds;
            result
                .issues
                .push("Coordinates outside service region bounds".to_string());
            result.correction_needed = true;
        }

        let mut score = 0.0_f64;
        let outcome = AssertUnwindSafe(self.corroborate(record, point, &mut result, &mut score))
            .catch_unwind()
            .await;

        result.confidence_score = clamp_confidence(score);

        match outcome {
            Ok(()) => {
                if result.confidence_score < self.config.confidence_threshold {
                    result.correction_needed = true;
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(record_id = %record.id, error = %message, "validation aborted");
                result.issues.push(format!("Validation error: {message}"));
                result.correction_needed = true;
            }
        }

        tracing::debug!(
            record_id = %result.record_id,
            confidence = result.confidence_score,
            correction_needed = result.correction_needed,
            issues = result.issues.len(),
            "record validated"
        );

        result
    }

    async fn corroborate(
        &self,
        record: &LocationRecord,
        point: Coordinates,
        result: &mut ValidationResult,
        score: &mut f64,
    ) {
        match self.geocoder.reverse_geocode(point).await {
            Some(reverse) => {
                let locality = self.matcher.match_locality(
                    record.city.as_deref(),
                    record.state.as_deref(),
                    &reverse.matched_address,
                );
                result.reverse_geocoding_match = locality.is_match();
                result.issues.extend(locality.issues);
                if result.reverse_geocoding_match {
                    *score += REVERSE_MATCH_POINTS;
                }
            }
            None => {
                result
                    .issues
                    .push("Reverse geocoding failed - coordinates may be invalid".to_string());
                result.correction_needed = true;
            }
        }

        let Some((address, city, state)) = record.full_address() else {
            result
                .issues
                .push("Insufficient address data for forward geocoding validation".to_string());
            return;
        };

        let Some(forward) = self.geocoder.forward_geocode(address, city, state).await else {
            result
                .issues
                .push("Forward geocoding failed - address may be invalid".to_string());
            return;
        };

        let distance = distance_meters(point, forward.coordinates);
        result.validated_coordinates = Some(forward.coordinates);
        result.distance_error_m = Some(distance);

        if distance <= self.config.precision_threshold_m {
            result.forward_geocoding_match = true;
            *score += FORWARD_MATCH_POINTS;
        } else {
            result.issues.push(format!(
                "Location precision error: {distance:.0}m from expected coordinates"
            ));
            if distance > self.config.correction_cutoff_m {
                result.correction_needed = true;
            }
        }

        *score += (forward.provider_confidence - PROVIDER_CONFIDENCE_BASELINE).max(0.0);
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_confidence(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u8
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "Unknown error".to_string())
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
