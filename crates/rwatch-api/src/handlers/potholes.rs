//! Pothole ingestion and query handlers.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use rwatch_models::PotholeRecord;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Success envelope for report ingestion.
#[derive(Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: PotholeRecord,
}

/// Envelope for the full record listing.
#[derive(Serialize)]
pub struct ListResponse {
    pub status: &'static str,
    pub data: Vec<PotholeRecord>,
    pub count: usize,
}

/// Envelope for the clear-all operation. Individual image deletion
/// failures are reported distinctly without failing the request.
#[derive(Serialize)]
pub struct ClearResponse {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_deletions: Vec<String>,
}

/// Parsed multipart report form.
struct ReportForm {
    latitude: f64,
    longitude: f64,
    severity: String,
    image: Vec<u8>,
}

/// Ingest one report: `POST /pothole`.
pub async fn receive_pothole(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<IngestResponse>> {
    let form = parse_report_form(multipart).await?;

    let record = match state
        .store
        .ingest(form.latitude, form.longitude, &form.severity, &form.image)
        .await
    {
        Ok(record) => record,
        Err(e) => {
            metrics::record_ingest_failure();
            return Err(e.into());
        }
    };

    metrics::record_ingest(&record.severity);
    info!(
        id = %record.id,
        latitude = record.latitude,
        longitude = record.longitude,
        severity = %record.severity,
        "Pothole received"
    );

    Ok(Json(IngestResponse {
        status: "success",
        message: "Pothole data saved successfully",
        data: record,
    }))
}

/// List every record in insertion order: `GET /potholes`.
pub async fn list_potholes(State(state): State<AppState>) -> ApiResult<Json<ListResponse>> {
    let records = state.store.list_all().await?;
    let count = records.len();
    Ok(Json(ListResponse {
        status: "success",
        data: records,
        count,
    }))
}

/// Clear the store and delete all images: `DELETE /potholes`.
pub async fn clear_potholes(State(state): State<AppState>) -> ApiResult<Json<ClearResponse>> {
    let outcome = state.store.clear_all().await?;
    metrics::record_store_clear();

    if !outcome.failures.is_empty() {
        warn!(
            failures = outcome.failures.len(),
            "Some images could not be deleted during clear"
        );
    }

    Ok(Json(ClearResponse {
        status: "success",
        message: "All potholes cleared",
        failed_deletions: outcome.failures,
    }))
}

/// Extract and validate the multipart report fields.
async fn parse_report_form(mut multipart: Multipart) -> ApiResult<ReportForm> {
    let mut latitude = None;
    let mut longitude = None;
    let mut severity = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "latitude" => latitude = Some(text_field(field, "latitude").await?.parse().map_err(
                |_| ApiError::bad_request("latitude must be a number"),
            )?),
            "longitude" => longitude = Some(text_field(field, "longitude").await?.parse().map_err(
                |_| ApiError::bad_request("longitude must be a number"),
            )?),
            "severity" => severity = Some(text_field(field, "severity").await?),
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read image: {e}")))?;
                image = Some(bytes.to_vec());
            }
            // Unknown fields are ignored, matching the original backend
            _ => {}
        }
    }

    Ok(ReportForm {
        latitude: latitude.ok_or_else(|| ApiError::bad_request("missing field: latitude"))?,
        longitude: longitude.ok_or_else(|| ApiError::bad_request("missing field: longitude"))?,
        severity: severity.ok_or_else(|| ApiError::bad_request("missing field: severity"))?,
        image: image.ok_or_else(|| ApiError::bad_request("missing field: image"))?,
    })
}

async fn text_field(field: axum::extract::multipart::Field<'_>, name: &str) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("failed to read {name}: {e}")))
}
