//! JSON export of a validation run.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clinicmap_validator::{
    PrecisionBreakdown, ReportSummary, StateAnalysis, ValidationConfig, ValidationReport,
    ValidationResult,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything an operator or the `correct` command needs from one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ValidationExport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    /// Thresholds the run was scored with.
    pub config: ValidationConfig,
    pub summary: ReportSummary,
    pub precision: PrecisionBreakdown,
    pub state_analysis: Vec<StateAnalysis>,
    pub recommendations: Vec<String>,
    /// Correction candidates, least confident first.
    pub issues: Vec<ValidationResult>,
    pub results: Vec<ValidationResult>,
}

impl ValidationExport {
    /// The report portion, as consumed by correction planning.
    pub(crate) fn report(&self) -> ValidationReport {
        ValidationReport {
            summary: self.summary.clone(),
            issues: self.issues.clone(),
            recommendations: self.recommendations.clone(),
        }
    }
}

/// `validation-report-2026-10-16T14-03-22-123Z.json`
pub(crate) fn default_report_path(generated_at: DateTime<Utc>) -> PathBuf {
    PathBuf::from(format!(
        "validation-report-{}.json",
        generated_at.format("%Y-%m-%dT%H-%M-%S-%3fZ")
    ))
}

pub(crate) fn write_export(path: &Path, export: &ValidationExport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(export).context("failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report to {}", path.display()))
}

pub(crate) fn read_export(path: &Path) -> anyhow::Result<ValidationExport> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read report {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a validation report", path.display()))
}
