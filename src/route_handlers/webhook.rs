use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{error, info};

use crate::extract::{self, ExtractError};
use crate::state::AppState;
use crate::stream_service;

pub async fn handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> impl axum::response::IntoResponse {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            error!("Failed to parse webhook body: {}", err);
            return error_response();
        }
    };

    match handle_webhook(&state, &payload).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "message": "Data received successfully!" })),
        ),
        Err(err) => {
            error!("Error processing webhook: {}", err);
            error_response()
        }
    }
}

fn error_response() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Failed to decode data." })),
    )
}

/// Runs the ingestion pipeline for one payload: raw store, extraction,
/// then fan-out to the structured table, object storage and (for
/// geofence events) the stream. Only extraction failures abort the
/// request; each sink failure is logged and swallowed, so the caller
/// cannot tell "persisted everywhere" from "accepted but dropped by a
/// sink".
async fn handle_webhook(state: &AppState, payload: &Value) -> Result<(), ExtractError> {
    // capture the raw payload first so invalid events are still auditable
    if let Err(err) = state.db.insert_raw_event(payload).await {
        error!("Failed to store raw event: {}", err);
    }

    let record = extract::extract_location(payload)?;

    if let Err(err) = state.db.insert_location(&record).await {
        error!("Failed to store location record: {}", err);
    }

    if let Err(err) = state.object_store.put_location(&record).await {
        error!("Failed to push location record to object storage: {}", err);
    }

    if stream_service::is_geofence_event(&record) {
        info!("Geofence event, publishing to stream: {:?}", record);
        if let Err(err) = state.stream.put_location(&record).await {
            error!("Failed to push location record to stream: {}", err);
        }
    }

    Ok(())
}
