//! Scan ingestion and session read endpoints
//!
//! The ingestion pipeline for each scan is strictly sequential:
//! validate -> reduce -> normalize -> store -> notify. Notification only
//! follows a confirmed durable write, and a notification failure never
//! downgrades the response below success.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

use boothtrack_common::events::BoothEvent;
use boothtrack_common::reduce;
use boothtrack_common::scan::{NewSession, Session};
use boothtrack_common::time::NormalizationError;
use boothtrack_common::validate::{self, ValidationFailure};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub id: String,
    pub message: String,
}

/// POST /api/scans
///
/// Ingest one proximity scan and derive its dwell-time session.
pub async fn ingest_scan(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<IngestResponse>), IngestError> {
    let Json(payload) =
        payload.map_err(|rejection| IngestError::MalformedPayload(rejection.body_text()))?;

    let record = validate::validate(&payload)?;

    let user_retention = reduce::retention(&record.rssi_values);

    let in_time = state.normalizer.normalize(&record.in_time)?;
    let out_time = state.normalizer.normalize(&record.out_time)?;

    let session = NewSession {
        booth_id: record.booth_id.unwrap_or(state.default_booth_id),
        device_id: record.device_id,
        rssi_values: record.rssi_values,
        user_retention,
        in_time,
        out_time,
        average_distance: record.average_distance,
        timestamp: state.normalizer.now(),
    };

    // Write-then-notify runs on its own task: a caller disconnect must not
    // cancel an in-flight write, and a completed write always notifies.
    let store = state.store.clone();
    let events = state.events.clone();
    let handle = tokio::spawn(async move {
        let id = store.insert(&session).await?;

        info!(
            "Stored session {} for device {} at booth {}",
            id, session.device_id, session.booth_id
        );

        // The write is already durable; a quiet channel must not fail the
        // request
        events.emit_lossy(BoothEvent::DataUpdated {
            timestamp: chrono::Utc::now(),
        });

        Ok::<_, boothtrack_common::Error>(id)
    });

    let id = match handle.await {
        Ok(Ok(id)) => id,
        Ok(Err(e)) => {
            error!("Failed to store session: {}", e);
            return Err(IngestError::Store(e.to_string()));
        }
        Err(e) => {
            error!("Ingestion task failed: {}", e);
            return Err(IngestError::Store(e.to_string()));
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(IngestResponse {
            id,
            message: "stored".to_string(),
        }),
    ))
}

/// GET /api/scans
///
/// All stored sessions, ids rendered as strings. Independent of the
/// notification path.
pub async fn list_scans(State(state): State<AppState>) -> Result<Json<Vec<Session>>, IngestError> {
    let sessions = state.store.list_all().await.map_err(|e| {
        error!("Failed to fetch sessions: {}", e);
        IngestError::Store(e.to_string())
    })?;

    Ok(Json(sessions))
}

/// Ingestion API errors
#[derive(Debug)]
pub enum IngestError {
    /// Body is not parseable JSON
    MalformedPayload(String),
    /// Schema violation; field-level detail retained
    Validation(ValidationFailure),
    /// Bad time encoding
    Normalization(NormalizationError),
    /// Durability or connectivity failure in the store
    Store(String),
}

impl From<ValidationFailure> for IngestError {
    fn from(failure: ValidationFailure) -> Self {
        IngestError::Validation(failure)
    }
}

impl From<NormalizationError> for IngestError {
    fn from(err: NormalizationError) -> Self {
        IngestError::Normalization(err)
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        match self {
            IngestError::MalformedPayload(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "request body must be JSON",
                    "details": details,
                })),
            )
                .into_response(),
            IngestError::Validation(failure) => {
                (StatusCode::BAD_REQUEST, Json(json!(failure.fields))).into_response()
            }
            IngestError::Normalization(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response(),
            IngestError::Store(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "failed to store session",
                    "details": details,
                })),
            )
                .into_response(),
        }
    }
}
