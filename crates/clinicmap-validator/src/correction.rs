//! Turns a validation report into explicit corrective actions.
//!
//! Planning is pure; applying the plan is the caller's job through the
//! record store's write interface.

use serde::{Deserialize, Serialize};

use crate::report::ValidationReport;
use crate::types::ValidationResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionPolicy {
    /// Delete records whose stored coordinates are missing or out of region
    /// and whose address could not be geocoded, instead of queuing a review.
    pub delete_unlocatable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CorrectionAction {
    /// Move the record to its forward-geocoded position.
    Relocate {
        record_id: String,
        latitude: f64,
        longitude: f64,
        /// Distance moved, when the old position was usable.
        distance_m: Option<f64>,
    },
    Delete {
        record_id: String,
        reason: String,
    },
    /// Needs an operator decision.
    Review {
        record_id: String,
        reason: String,
    },
}

impl CorrectionAction {
    #[must_use]
    pub fn record_id(&self) -> &str {
        match self {
            Self::Relocate { record_id, .. }
            | Self::Delete { record_id, .. }
            | Self::Review { record_id, .. } => record_id,
        }
    }
}

/// One action per result in `report.issues`, in the report's order.
#[must_use]
pub fn plan_corrections(report: &ValidationReport, policy: CorrectionPolicy) -> Vec<CorrectionAction> {
    report
        .issues
        .iter()
        .filter(|r| r.correction_needed)
        .map(|r| plan_one(r, policy))
        .collect()
}

fn plan_one(result: &ValidationResult, policy: CorrectionPolicy) -> CorrectionAction {
    let record_id = result.record_id.clone();

    // A stored point already within the precision threshold has nowhere
    // better to go; it was flagged for locality or confidence.
    if let Some(target) = result.validated_coordinates.filter(|_| !result.forward_geocoding_match) {
        return CorrectionAction::Relocate {
            record_id,
            latitude: target.latitude,
            longitude: target.longitude,
            distance_m: result.distance_error_m,
        };
    }

    let reason = if result.issues.is_empty() {
        format!("confidence {} below threshold", result.confidence_score)
    } else {
        result.issues.join("; ")
    };

    if result.is_unlocatable() && policy.delete_unlocatable {
        CorrectionAction::Delete { record_id, reason }
    } else {
        CorrectionAction::Review { record_id, reason }
    }
}
