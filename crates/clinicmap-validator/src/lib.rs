//! Location validation for clinic records.
//!
//! [`LocationValidator`] corroborates each record's stored coordinates with
//! a reverse geocode of the point and a forward geocode of the address,
//! scores the agreement, and decides whether the record needs correction.
//! [`generate_report`] summarizes a run and [`plan_corrections`] turns the
//! report into explicit store writes. Nothing in this crate writes to the
//! record store.

mod batch;
pub mod cache;
pub mod correction;
pub mod distance;
pub mod locality;
pub mod report;
pub mod types;
mod validator;

#[cfg(test)]
mod test_support;

pub use cache::{CachingGeocoder, GeocodeCache, GeocodeKey};
pub use correction::{plan_corrections, CorrectionAction, CorrectionPolicy};
pub use distance::distance_meters;
pub use locality::{LocalityMatch, LocalityMatcher};
pub use report::{
    generate_report, precision_breakdown, state_analysis, PrecisionBreakdown, ReportSummary,
    StateAnalysis, ValidationReport,
};
pub use types::{CoordinateStatus, ValidationConfig, ValidationResult, NO_ADDRESS_PROVIDED};
pub use validator::LocationValidator;
