//! Aggregates per-record verdicts into an operator-facing report.

use std::collections::HashMap;

use clinicmap_core::StateTable;
use serde::{Deserialize, Serialize};

use crate::types::{ValidationConfig, ValidationResult};

/// Upper edge of the "high" precision tier.
pub const HIGH_PRECISION_CEILING_M: f64 = 50.0;

/// Share of results that must be within the precision threshold before the
/// re-geocoding recommendation is dropped.
const HIGH_PRECISION_TARGET_PCT: usize = 95;

const UNKNOWN_STATE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    /// Results that need no correction.
    pub validated: usize,
    pub needs_correction: usize,
    /// Mean confidence, rounded half up. Zero for an empty run.
    pub average_confidence: u8,
    /// Results whose distance error exceeds the precision threshold.
    pub precision_issues: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub summary: ReportSummary,
    /// Every result needing correction, least confident first.
    pub issues: Vec<ValidationResult>,
    pub recommendations: Vec<String>,
}

/// Builds the summary, the triage list and recommendations for a run.
#[must_use]
pub fn generate_report(results: &[ValidationResult], config: &ValidationConfig) -> ValidationReport {
    let threshold = config.precision_threshold_m;

    let mut issues: Vec<ValidationResult> =
        results.iter().filter(|r| r.correction_needed).cloned().collect();
    issues.sort_by_key(|r| r.confidence_score);

    let precision_issues = results
        .iter()
        .filter(|r| r.distance_error_m.is_some_and(|d| d > threshold))
        .count();
    let high_precision = results
        .iter()
        .filter(|r| r.distance_error_m.is_some_and(|d| d <= threshold))
        .count();

    let mut recommendations = Vec::new();
    if !issues.is_empty() {
        recommendations.push(format!(
            "{} locations require immediate correction",
            issues.len()
        ));
    }
    if precision_issues > 0 {
        recommendations.push(format!(
            "{precision_issues} locations have precision errors >{threshold}m"
        ));
    }
    if high_precision * 100 < results.len() * HIGH_PRECISION_TARGET_PCT {
        recommendations.push("Consider re-geocoding locations with low precision scores".to_string());
    }

    let summary = ReportSummary {
        total: results.len(),
        validated: results.len() - issues.len(),
        needs_correction: issues.len(),
        average_confidence: average_confidence(results),
        precision_issues,
    };

    ValidationReport {
        summary,
        issues,
        recommendations,
    }
}

/// Results bucketed by distance error. Results without a forward geocode
/// are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecisionBreakdown {
    /// Within the precision threshold.
    pub ultra_high: usize,
    /// Above the threshold, at most [`HIGH_PRECISION_CEILING_M`].
    pub high: usize,
    pub low: usize,
}

#[must_use]
pub fn precision_breakdown(results: &[ValidationResult], config: &ValidationConfig) -> PrecisionBreakdown {
    let mut breakdown = PrecisionBreakdown::default();
    for distance in results.iter().filter_map(|r| r.distance_error_m) {
        if distance <= config.precision_threshold_m {
            breakdown.ultra_high += 1;
        } else if distance <= HIGH_PRECISION_CEILING_M {
            breakdown.high += 1;
        } else {
            breakdown.low += 1;
        }
    }
    breakdown
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAnalysis {
    /// Postal abbreviation when known, otherwise the stored text or `"Unknown"`.
    pub state: String,
    pub total: usize,
    pub high_precision: usize,
    /// Percentage of `total` within the precision threshold.
    pub precision_rate: f64,
    pub average_confidence: u8,
}

/// Per-state precision statistics, best precision rate first.
///
/// `"FL"` and `"Florida"` are grouped together through `states`.
#[must_use]
pub fn state_analysis(
    results: &[ValidationResult],
    config: &ValidationConfig,
    states: &StateTable,
) -> Vec<StateAnalysis> {
    let mut groups: HashMap<String, Vec<&ValidationResult>> = HashMap::new();
    for result in results {
        let key = result
            .state
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| UNKNOWN_STATE.to_string(), |s| states.canonical(s));
        groups.entry(key).or_default().push(result);
    }

    let mut analysis: Vec<StateAnalysis> = groups
        .into_iter()
        .map(|(state, members)| {
            let high_precision = members
                .iter()
                .filter(|r| {
                    r.distance_error_m
                        .is_some_and(|d| d <= config.precision_threshold_m)
                })
                .count();
            #[allow(clippy::cast_precision_loss)]
            let precision_rate = high_precision as f64 / members.len() as f64 * 100.0;
            StateAnalysis {
                total: members.len(),
                high_precision,
                precision_rate,
                average_confidence: average_confidence(members.iter().copied()),
                state,
            }
        })
        .collect();

    analysis.sort_by(|a, b| {
        b.precision_rate
            .total_cmp(&a.precision_rate)
            .then_with(|| b.total.cmp(&a.total))
            .then_with(|| a.state.cmp(&b.state))
    });
    analysis
}

fn average_confidence<'a, I>(results: I) -> u8
where
    I: IntoIterator<Item = &'a ValidationResult>,
{
    let (sum, count) = results
        .into_iter()
        .fold((0usize, 0usize), |(sum, count), r| {
            (sum + usize::from(r.confidence_score), count + 1)
        });
    if count == 0 {
        return 0;
    }
    u8::try_from((sum + count / 2) / count).unwrap_or(u8::MAX)
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
