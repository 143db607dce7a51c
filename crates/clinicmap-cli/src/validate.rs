//! Validation command handlers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clinicmap_core::{AppConfig, LocationRecord, StateTable, TtlCache};
use clinicmap_geocoder::NominatimClient;
use clinicmap_validator::{
    generate_report, precision_breakdown, state_analysis, CachingGeocoder, LocationValidator,
    ValidationConfig,
};

use crate::export::{default_report_path, write_export, ValidationExport};
use crate::output;

pub(crate) struct ValidateAllOptions {
    pub batch_size: usize,
    pub limit: Option<i64>,
    pub state: Option<String>,
    pub output: Option<PathBuf>,
}

type Validator = LocationValidator<CachingGeocoder<NominatimClient>>;

/// Builds the process-wide geocoder stack: one rate-limited client behind
/// one cache.
fn build_validator(config: &AppConfig) -> anyhow::Result<Validator> {
    let client =
        NominatimClient::from_app_config(config).context("failed to build geocoding client")?;
    let cache = Arc::new(TtlCache::new(
        Duration::from_secs(config.geocode_cache_ttl_secs),
        config.geocode_cache_max_entries,
    ));
    Ok(LocationValidator::new(
        CachingGeocoder::new(client, cache),
        ValidationConfig::from_app_config(config),
    ))
}

/// Loads the target clinics. A known state matches rows stored under either
/// its full name or its abbreviation.
async fn load_records(
    pool: &sqlx::PgPool,
    state: Option<&str>,
    limit: Option<i64>,
    states: &StateTable,
) -> anyhow::Result<Vec<LocationRecord>> {
    let rows = match state {
        Some(state) => {
            let forms = states.resolve(state).map_or_else(
                || vec![state.to_string()],
                |(name, abbreviation)| vec![name.to_string(), abbreviation.to_string()],
            );
            clinicmap_db::list_clinics_by_state(pool, &forms, limit).await?
        }
        None => clinicmap_db::list_clinics(pool, limit).await?,
    };
    Ok(rows.into_iter().map(LocationRecord::from).collect())
}

/// Validates the selected clinics, prints the report and writes the JSON export.
///
/// # Errors
///
/// Returns an error if the clinics cannot be loaded or the report cannot be
/// written. Per-record geocoding failures end up in the report instead.
pub(crate) async fn run_validate_all(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    options: ValidateAllOptions,
) -> anyhow::Result<()> {
    let states = StateTable::us();
    let records = load_records(pool, options.state.as_deref(), options.limit, &states)
        .await
        .context("failed to load clinics")?;

    if records.is_empty() {
        println!("No clinics matched; nothing to validate.");
        return Ok(());
    }

    println!(
        "Validating {} clinic locations in batches of {}...",
        records.len(),
        options.batch_size.max(1)
    );

    let validator = build_validator(config)?;
    let results = validator.validate_all(&records, options.batch_size).await;

    let validation_config = *validator.config();
    let report = generate_report(&results, &validation_config);
    let precision = precision_breakdown(&results, &validation_config);
    let by_state = state_analysis(&results, &validation_config, &states);

    output::print_summary(&report, validation_config.precision_threshold_m);
    output::print_precision(&precision, validation_config.precision_threshold_m);
    output::print_top_issues(&report);
    output::print_state_analysis(&by_state);
    output::print_recommendations(&report);

    let generated_at = chrono::Utc::now();
    let path = options
        .output
        .unwrap_or_else(|| default_report_path(generated_at));
    let export = ValidationExport {
        run_id: uuid::Uuid::new_v4(),
        generated_at,
        config: validation_config,
        summary: report.summary.clone(),
        precision,
        state_analysis: by_state,
        recommendations: report.recommendations.clone(),
        issues: report.issues.clone(),
        results,
    };
    write_export(&path, &export)?;

    tracing::info!(run_id = %export.run_id, path = %path.display(), "validation report written");
    println!();
    println!("Full report saved to: {}", path.display());

    if report.summary.needs_correction > 0 {
        println!(
            "{} locations need correction; review and apply with `clinicmap-cli correct --report {}`",
            report.summary.needs_correction,
            path.display()
        );
    }

    Ok(())
}

/// Validates one clinic and prints its verdict.
///
/// # Errors
///
/// Returns an error if the clinic does not exist or cannot be loaded.
pub(crate) async fn run_validate_one(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    id: &str,
) -> anyhow::Result<()> {
    let row = clinicmap_db::get_clinic_by_id(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("clinic '{id}' not found"))?;
    let record = LocationRecord::from(row);

    let validator = build_validator(config)?;
    let result = validator.validate(&record).await;

    let verdict = if result.correction_needed {
        "NEEDS CORRECTION"
    } else {
        "OK"
    };
    println!("{} [{verdict}]", result.name);
    output::print_result_details(&result);
    if let Some(validated) = result.validated_coordinates {
        println!(
            "   geocoded:   {:.6}, {:.6}",
            validated.latitude, validated.longitude
        );
    }
    println!(
        "   reverse match: {}  forward match: {}",
        result.reverse_geocoding_match, result.forward_geocoding_match
    );

    Ok(())
}
