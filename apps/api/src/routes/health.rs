use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version, storage backend and the number
/// of rewrite/export requests currently in flight.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let in_flight = state
        .requests
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .in_flight();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-api",
        "storage": state.config.storage_backend.kind(),
        "inFlightRequests": in_flight,
    }))
}
