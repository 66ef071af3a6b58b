use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Handler for `GET /healthz`.
pub async fn healthz() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

/// Handler for `GET /readyz`. Stores are in-memory, so ready as soon as the listener is up.
pub async fn readyz() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ready" })
}
