//! Applies a saved validation report to the record store.
//!
//! Relocations and deletions go through the store's explicit write
//! operations; review items are only listed. A record that disappeared since
//! the report was written is skipped with a warning.

use std::path::Path;

use clinicmap_db::DbError;
use clinicmap_validator::{plan_corrections, CorrectionAction, CorrectionPolicy};

use crate::export::read_export;
use crate::output::describe_action;

/// Prints the correction plan for `report_path` without touching the database.
///
/// # Errors
///
/// Returns an error if the report cannot be read.
pub(crate) fn run_correct_dry_run(report_path: &Path, policy: CorrectionPolicy) -> anyhow::Result<()> {
    let export = read_export(report_path)?;
    let plan = plan_corrections(&export.report(), policy);

    println!(
        "dry-run: {} action(s) planned from run {}:",
        plan.len(),
        export.run_id
    );
    for action in &plan {
        println!("  {}", describe_action(action));
    }
    Ok(())
}

/// Plans and applies corrections from `report_path`.
///
/// # Errors
///
/// Returns an error if the report cannot be read or a write fails for any
/// reason other than the record no longer existing.
pub(crate) async fn run_correct(
    pool: &sqlx::PgPool,
    report_path: &Path,
    policy: CorrectionPolicy,
) -> anyhow::Result<()> {
    let export = read_export(report_path)?;
    let plan = plan_corrections(&export.report(), policy);

    let mut relocated = 0usize;
    let mut deleted = 0usize;
    let mut review = 0usize;
    let mut missing = 0usize;

    for action in &plan {
        let outcome = match action {
            CorrectionAction::Relocate {
                record_id,
                latitude,
                longitude,
                ..
            } => {
                clinicmap_db::update_clinic_coordinates(pool, record_id, *latitude, *longitude)
                    .await
            }
            CorrectionAction::Delete { record_id, .. } => {
                clinicmap_db::delete_clinic(pool, record_id).await
            }
            CorrectionAction::Review { .. } => Ok(()),
        };

        match outcome {
            Ok(()) => {
                match action {
                    CorrectionAction::Relocate { .. } => relocated += 1,
                    CorrectionAction::Delete { .. } => deleted += 1,
                    CorrectionAction::Review { .. } => review += 1,
                }
                println!("  {}", describe_action(action));
            }
            Err(DbError::NotFound(id)) => {
                missing += 1;
                tracing::warn!(record_id = %id, "record no longer exists, skipping");
            }
            Err(err) => return Err(err.into()),
        }
    }

    println!(
        "Corrections applied: {relocated} relocated, {deleted} deleted, {review} left for review, {missing} skipped"
    );
    Ok(())
}
