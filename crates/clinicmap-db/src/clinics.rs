//! Database operations for the `clinics` table.

use chrono::{DateTime, Utc};
use clinicmap_core::LocationRecord;
use sqlx::PgPool;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `clinics` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClinicRow {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub coordinates_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClinicRow> for LocationRecord {
    fn from(row: ClinicRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            latitude: row.latitude,
            longitude: row.longitude,
        }
    }
}

const CLINIC_COLUMNS: &str = "id, name, address, city, state, zip_code, latitude, longitude, \
                              coordinates_updated_at, created_at, updated_at";

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Returns non-deleted clinics ordered by state, city and name, up to `limit`
/// rows when given.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_clinics(pool: &PgPool, limit: Option<i64>) -> Result<Vec<ClinicRow>, DbError> {
    let rows = sqlx::query_as::<_, ClinicRow>(&format!(
        "SELECT {CLINIC_COLUMNS} \
         FROM clinics \
         WHERE deleted_at IS NULL \
         ORDER BY state, city, name, id \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns non-deleted clinics whose `state` matches any of `state_forms`,
/// compared case-insensitively. Pass both the full name and the postal
/// abbreviation to catch rows stored either way.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_clinics_by_state(
    pool: &PgPool,
    state_forms: &[String],
    limit: Option<i64>,
) -> Result<Vec<ClinicRow>, DbError> {
    let upper: Vec<String> = state_forms
        .iter()
        .map(|s| s.trim().to_uppercase())
        .collect();

    let rows = sqlx::query_as::<_, ClinicRow>(&format!(
        "SELECT {CLINIC_COLUMNS} \
         FROM clinics \
         WHERE deleted_at IS NULL AND UPPER(TRIM(state)) = ANY($1) \
         ORDER BY city, name, id \
         LIMIT $2"
    ))
    .bind(&upper)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single non-deleted clinic by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_clinic_by_id(pool: &PgPool, id: &str) -> Result<Option<ClinicRow>, DbError> {
    let row = sqlx::query_as::<_, ClinicRow>(&format!(
        "SELECT {CLINIC_COLUMNS} FROM clinics WHERE id = $1 AND deleted_at IS NULL"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

// ---------------------------------------------------------------------------
// Corrective writes
// ---------------------------------------------------------------------------

/// Moves a clinic to new coordinates and stamps `coordinates_updated_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no live clinic has `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn update_clinic_coordinates(
    pool: &PgPool,
    id: &str,
    latitude: f64,
    longitude: f64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE clinics \
         SET latitude = $2, longitude = $3, coordinates_updated_at = NOW(), updated_at = NOW() \
         WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .bind(latitude)
    .bind(longitude)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(id.to_string()));
    }
    Ok(())
}

/// Soft-deletes a clinic by setting `deleted_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no live clinic has `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn delete_clinic(pool: &PgPool, id: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE clinics SET deleted_at = NOW(), updated_at = NOW() \
         WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(id.to_string()));
    }
    Ok(())
}
